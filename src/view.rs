// 📊 Dashboard views - what the chart, table and trend panels display
//
// Every interaction recomputes the whole view from the immutable dataset.
// Presentation layers (TUI, web page) call `render_view` and `trends` only.

use crate::calculator::{compare, project, ComparisonRow, ProjectionParams};
use crate::config::Settings;
use crate::dataset::Dataset;
use crate::error::{CostError, Result};
use crate::format;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// METRIC
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Published annual TCOA
    #[default]
    Annual,

    /// Compounded multi-year total
    Projected,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Annual => "annual",
            Metric::Projected => "projected",
        }
    }

    /// Column heading, e.g. "Projected 5-Year Total" for a 5-year horizon
    pub fn label_for(&self, years: u32) -> String {
        match self {
            Metric::Annual => "Annual Cost".to_string(),
            Metric::Projected => format!("Projected {}-Year Total", years),
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Metric::Annual => Metric::Projected,
            Metric::Projected => Metric::Annual,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "annual" | "annual cost" => Ok(Metric::Annual),
            "projected" | "projected four-year cost" => Ok(Metric::Projected),
            label if is_projected_label(label) => Ok(Metric::Projected),
            other => Err(CostError::invalid(format!(
                "unknown metric '{}' (expected 'annual' or 'projected')",
                other
            ))),
        }
    }
}

/// "projected <n>-year total"
fn is_projected_label(s: &str) -> bool {
    s.strip_prefix("projected ")
        .and_then(|rest| rest.strip_suffix("-year total"))
        .map_or(false, |years| years.parse::<u32>().is_ok())
}

// ============================================================================
// VIEW TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub metric: Metric,

    /// Academic year; the dataset's newest year when omitted
    #[serde(default)]
    pub year: Option<String>,

    #[serde(default)]
    pub selection: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonView {
    pub metric: Metric,

    /// Heading for the value column
    pub metric_label: String,

    /// Heading for the delta column, "Difference from <baseline>"
    pub difference_label: String,

    pub year: String,
    pub baseline: String,
    pub baseline_value: f64,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonView {
    /// "For 2025-26, the cost at Univ. of San Francisco is $92,602."
    pub fn baseline_summary(&self) -> String {
        format!(
            "For {}, the cost at {} is {}.",
            self.year,
            self.baseline,
            format::usd(self.baseline_value)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub institution: String,

    /// Oldest year first
    pub points: Vec<TrendPoint>,

    /// Percentage change from the oldest to the newest year
    pub change_pct: f64,
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// Dataset plus the fixed baseline and projection assumptions
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Dataset,
    baseline: String,
    default_year: String,
    params: ProjectionParams,
}

impl Dashboard {
    pub fn new(dataset: Dataset, baseline: &str, params: ProjectionParams) -> Result<Self> {
        if !dataset.contains(baseline) {
            return Err(CostError::not_found(format!(
                "baseline institution '{}' is not in the dataset",
                baseline
            )));
        }
        // Validates the parameters once so views never fail on them
        project(1.0, params.years, params.rate)?;

        let default_year = dataset.current_year().to_string();
        Ok(Dashboard {
            dataset,
            baseline: baseline.to_string(),
            default_year,
            params,
        })
    }

    pub fn from_settings(dataset: Dataset, settings: &Settings) -> Result<Self> {
        let mut dashboard = Self::new(
            dataset,
            &settings.dashboard.baseline,
            settings.projection.params(),
        )?;

        if let Some(year) = &settings.dashboard.default_year {
            dashboard.dataset.year_index(year)?;
            dashboard.default_year = year.clone();
        }

        tracing::info!(
            institutions = dashboard.dataset.len(),
            baseline = %dashboard.baseline,
            year = %dashboard.default_year,
            "Dashboard ready"
        );
        Ok(dashboard)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn default_year(&self) -> &str {
        &self.default_year
    }

    pub fn params(&self) -> ProjectionParams {
        self.params
    }

    pub fn metric_label(&self, metric: Metric) -> String {
        metric.label_for(self.params.years)
    }

    pub fn difference_label(&self) -> String {
        format!("Difference from {}", self.baseline)
    }

    /// Every institution's value for `metric` in `year`
    pub fn metric_values(&self, metric: Metric, year: &str) -> Result<HashMap<String, f64>> {
        self.dataset
            .records(year)?
            .into_iter()
            .map(|record| -> Result<(String, f64)> {
                let value = match metric {
                    Metric::Annual => record.annual_cost,
                    Metric::Projected => {
                        project(record.annual_cost, self.params.years, self.params.rate)?
                    }
                };
                Ok((record.name, value))
            })
            .collect()
    }

    pub fn render_view(&self, request: &ViewRequest) -> Result<ComparisonView> {
        let year = request
            .year
            .clone()
            .unwrap_or_else(|| self.default_year.clone());

        let values = self.metric_values(request.metric, &year)?;
        let selection: HashSet<String> = request.selection.iter().cloned().collect();
        let rows = compare(&values, &self.baseline, &selection)?;

        let baseline_value = values
            .get(&self.baseline)
            .copied()
            .ok_or_else(|| CostError::not_found(format!("baseline '{}'", self.baseline)))?;

        tracing::debug!(
            metric = request.metric.as_str(),
            year = %year,
            selected = selection.len(),
            rows = rows.len(),
            "Rendered comparison view"
        );

        Ok(ComparisonView {
            metric: request.metric,
            metric_label: self.metric_label(request.metric),
            difference_label: self.difference_label(),
            year,
            baseline: self.baseline.clone(),
            baseline_value,
            rows,
        })
    }

    /// Year-over-year costs for the selected institutions, in dataset order
    pub fn trends(&self, selection: &[String]) -> Vec<TrendSeries> {
        let selected: HashSet<&str> = selection.iter().map(String::as_str).collect();

        let mut year_order: Vec<(usize, &String)> = self.dataset.years().iter().enumerate().collect();
        year_order.sort_by(|a, b| a.1.cmp(b.1));

        self.dataset
            .institutions()
            .iter()
            .filter(|inst| selected.contains(inst.name.as_str()))
            .map(|inst| {
                let points: Vec<TrendPoint> = year_order
                    .iter()
                    .map(|(idx, year)| TrendPoint {
                        year: (*year).clone(),
                        cost: inst.costs[*idx],
                    })
                    .collect();

                let change_pct = match (points.first(), points.last()) {
                    (Some(first), Some(last)) => (last.cost - first.cost) / first.cost * 100.0,
                    _ => 0.0,
                };

                TrendSeries {
                    institution: inst.name.clone(),
                    points,
                    change_pct,
                }
            })
            .collect()
    }

    /// Every institution name, for "select all"
    pub fn all_names(&self) -> Vec<String> {
        self.dataset.names().into_iter().map(String::from).collect()
    }
}
