// 🧮 Cost Calculator - Projection + baseline comparison
//
// Pure functions only. Rounding happens exactly once, on the summed total,
// with f64::round (half away from zero, i.e. half-up for positive totals).

use crate::dataset::InstitutionRecord;
use crate::error::{CostError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_YEARS: u32 = 4;
pub const DEFAULT_RATE: f64 = 0.035;

/// Longest horizon `project` accepts
pub const MAX_YEARS: u32 = 100;

// ============================================================================
// PROJECTION
// ============================================================================

/// Inflation assumptions for the multi-year projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    pub years: u32,
    pub rate: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        ProjectionParams {
            years: DEFAULT_YEARS,
            rate: DEFAULT_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub institution: String,
    pub annual_cost: f64,
    pub four_year_total: f64,
}

/// Cumulative cost over `years` years, year 0 uninflated, each later year
/// compounded at `rate`. The total is rounded to whole dollars.
pub fn project(annual_cost: f64, years: u32, rate: f64) -> Result<f64> {
    if !annual_cost.is_finite() || annual_cost < 0.0 {
        return Err(CostError::invalid(format!(
            "annual cost must be a non-negative amount, got {}",
            annual_cost
        )));
    }
    if !(1..=MAX_YEARS).contains(&years) {
        return Err(CostError::invalid(format!(
            "years must be between 1 and {}, got {}",
            MAX_YEARS, years
        )));
    }
    if !rate.is_finite() || rate < 0.0 {
        return Err(CostError::invalid(format!(
            "inflation rate must be non-negative, got {}",
            rate
        )));
    }

    let growth = 1.0 + rate;
    let total: f64 = (0..years)
        .map(|i| annual_cost * growth.powi(i as i32))
        .sum();

    Ok(total.round())
}

pub fn project_record(
    record: &InstitutionRecord,
    params: &ProjectionParams,
) -> Result<ProjectionResult> {
    Ok(ProjectionResult {
        institution: record.name.clone(),
        annual_cost: record.annual_cost,
        four_year_total: project(record.annual_cost, params.years, params.rate)?,
    })
}

// ============================================================================
// COMPARISON
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub institution: String,
    pub metric_value: f64,
    pub difference_from_baseline: f64,
}

impl ComparisonRow {
    pub fn is_baseline(&self, baseline: &str) -> bool {
        self.institution == baseline
    }
}

/// Restrict `values` to `selection`, compute each row's delta against
/// `baseline`, and order by value descending.
///
/// Names in `selection` with no entry in `values` are dropped silently.
/// Ties on value are ordered by institution name ascending.
pub fn compare(
    values: &HashMap<String, f64>,
    baseline: &str,
    selection: &HashSet<String>,
) -> Result<Vec<ComparisonRow>> {
    let baseline_value = *values
        .get(baseline)
        .ok_or_else(|| CostError::not_found(format!("baseline institution '{}'", baseline)))?;

    let mut rows: Vec<ComparisonRow> = selection
        .iter()
        .filter_map(|name| match values.get(name) {
            Some(value) => Some(ComparisonRow {
                institution: name.clone(),
                metric_value: *value,
                difference_from_baseline: value - baseline_value,
            }),
            None => {
                tracing::debug!(institution = %name, "Dropping unknown institution from selection");
                None
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.metric_value
            .partial_cmp(&a.metric_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.institution.cmp(&b.institution))
    });

    Ok(rows)
}
