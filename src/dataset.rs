// 🏫 Dataset - Published TCOA per institution and academic year
//
// The table is a VALUE: built once at startup, never mutated.
// Lookups of unknown names or years are errors, never defaults.

use crate::error::{CostError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Baseline institution of the built-in dataset
pub const DEFAULT_BASELINE: &str = "Univ. of San Francisco";

// ============================================================================
// RECORDS
// ============================================================================

/// One institution's cost for a single academic year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    pub name: String,

    /// Annual total cost of attendance in US dollars
    pub annual_cost: f64,
}

/// Full dataset row: one cost per academic year, aligned with `Dataset::years()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub name: String,
    pub costs: Vec<f64>,
}

impl Institution {
    pub fn new(name: impl Into<String>, costs: Vec<f64>) -> Self {
        Institution {
            name: name.into(),
            costs,
        }
    }
}

// ============================================================================
// DATASET
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Academic year labels ("2025-26"), in column order
    years: Vec<String>,

    /// Institutions in dataset order
    institutions: Vec<Institution>,
}

impl Dataset {
    /// Build a dataset, checking names are unique and every cost is positive
    pub fn new(years: Vec<String>, institutions: Vec<Institution>) -> Result<Self> {
        if years.is_empty() {
            return Err(CostError::invalid("dataset has no academic years"));
        }

        let mut seen_years = HashSet::new();
        for year in &years {
            if year.trim().is_empty() {
                return Err(CostError::invalid("empty academic year label"));
            }
            if !seen_years.insert(year.as_str()) {
                return Err(CostError::invalid(format!("duplicate academic year '{}'", year)));
            }
        }

        let mut seen_names = HashSet::new();
        for inst in &institutions {
            if inst.name.trim().is_empty() {
                return Err(CostError::invalid("empty institution name"));
            }
            if !seen_names.insert(inst.name.as_str()) {
                return Err(CostError::invalid(format!(
                    "duplicate institution '{}'",
                    inst.name
                )));
            }
            if inst.costs.len() != years.len() {
                return Err(CostError::invalid(format!(
                    "institution '{}' has {} costs, expected {}",
                    inst.name,
                    inst.costs.len(),
                    years.len()
                )));
            }
            if let Some(bad) = inst.costs.iter().find(|c| !c.is_finite() || **c <= 0.0) {
                return Err(CostError::invalid(format!(
                    "institution '{}' has non-positive cost {}",
                    inst.name, bad
                )));
            }
        }

        Ok(Dataset { years, institutions })
    }

    /// The 27 US Jesuit institutions, 2022-23 through 2025-26
    pub fn builtin() -> Self {
        let years = ["2025-26", "2024-25", "2023-24", "2022-23"]
            .iter()
            .map(|y| y.to_string())
            .collect();

        let institutions = BUILTIN_COSTS
            .iter()
            .map(|(name, costs)| Institution::new(*name, costs.to_vec()))
            .collect();

        Dataset {
            years,
            institutions,
        }
    }

    /// Load from CSV with header `Institution,<year>,<year>,...`
    pub fn from_csv(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open dataset CSV {}", path.display()))?;
        let dataset = Self::from_reader(file)
            .with_context(|| format!("Failed to load dataset CSV {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            institutions = dataset.len(),
            years = dataset.years.len(),
            "Loaded dataset from CSV"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        if headers.len() < 2 {
            anyhow::bail!("CSV header needs an institution column and at least one year");
        }
        let years: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();

        let mut institutions = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read CSV row {}", line + 2))?;
            let name = record.get(0).unwrap_or_default().to_string();

            let costs = record
                .iter()
                .skip(1)
                .map(|field| {
                    field
                        .replace([',', '$'], "")
                        .parse::<f64>()
                        .with_context(|| format!("Bad cost '{}' for '{}'", field, name))
                })
                .collect::<anyhow::Result<Vec<f64>>>()?;

            institutions.push(Institution::new(name, costs));
        }

        Ok(Dataset::new(years, institutions)?)
    }

    pub fn len(&self) -> usize {
        self.institutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    /// Newest academic year (labels sort chronologically)
    pub fn current_year(&self) -> &str {
        self.years
            .iter()
            .max()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// All institution names in dataset order
    pub fn names(&self) -> Vec<&str> {
        self.institutions.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn institutions(&self) -> &[Institution] {
        &self.institutions
    }

    pub fn contains(&self, name: &str) -> bool {
        self.institutions.iter().any(|i| i.name == name)
    }

    pub fn institution(&self, name: &str) -> Result<&Institution> {
        self.institutions
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| CostError::not_found(format!("institution '{}'", name)))
    }

    pub fn year_index(&self, year: &str) -> Result<usize> {
        self.years
            .iter()
            .position(|y| y == year)
            .ok_or_else(|| CostError::not_found(format!("academic year '{}'", year)))
    }

    /// Current-year annual cost
    pub fn annual_cost(&self, name: &str) -> Result<f64> {
        self.annual_cost_for(name, self.current_year())
    }

    pub fn annual_cost_for(&self, name: &str, year: &str) -> Result<f64> {
        let idx = self.year_index(year)?;
        Ok(self.institution(name)?.costs[idx])
    }

    /// Every institution's record for one academic year, in dataset order
    pub fn records(&self, year: &str) -> Result<Vec<InstitutionRecord>> {
        let idx = self.year_index(year)?;
        Ok(self
            .institutions
            .iter()
            .map(|i| InstitutionRecord {
                name: i.name.clone(),
                annual_cost: i.costs[idx],
            })
            .collect())
    }
}

// ============================================================================
// BUILT-IN TABLE
// ============================================================================

/// Columns: 2025-26, 2024-25, 2023-24, 2022-23
const BUILTIN_COSTS: [(&str, [f64; 4]); 27] = [
    ("Univ. of San Francisco", [92602.0, 89470.0, 85200.0, 82100.0]),
    ("Georgetown", [96492.0, 92563.0, 88560.0, 84500.0]),
    ("Boston College", [91792.0, 88632.0, 84200.0, 80300.0]),
    ("Fordham", [98331.0, 94100.0, 90200.0, 86400.0]),
    ("Loyola Marymount", [94598.0, 91200.0, 87500.0, 84100.0]),
    ("Santa Clara", [88650.0, 86694.0, 83142.0, 78849.0]),
    ("College of the Holy Cross", [90350.0, 87295.0, 83722.0, 80392.0]),
    ("Fairfield", [84780.0, 81913.0, 78560.0, 75437.0]),
    ("Loyola Maryland", [83620.0, 80792.0, 77485.0, 74406.0]),
    ("Gonzaga", [82689.0, 79893.0, 76623.0, 73579.0]),
    ("Seattle Univ.", [79928.0, 77225.0, 74063.0, 71121.0]),
    ("Saint Louis Univ.", [77917.0, 75282.0, 72200.0, 69331.0]),
    ("St. Joseph’s", [75202.0, 72659.0, 69685.0, 66916.0]),
    ("Univ. of Scranton", [73296.0, 70817.0, 67917.0, 65219.0]),
    ("Marquette", [72666.0, 70209.0, 67335.0, 64660.0]),
    ("Loyola Chicago", [74673.0, 72148.0, 69195.0, 66444.0]),
    ("Xavier", [70930.0, 68531.0, 65725.0, 63114.0]),
    ("John Carroll", [66500.0, 64251.0, 61621.0, 59174.0]),
    ("Regis Univ.", [65500.0, 63285.0, 60695.0, 58285.0]),
    ("Creighton", [65413.0, 63201.0, 60614.0, 58207.0]),
    ("Le Moyne", [60300.0, 58261.0, 55875.0, 53655.0]),
    ("Rockhurst", [59300.0, 57295.0, 54949.0, 52767.0]),
    ("Canisius", [57200.0, 55266.0, 53004.0, 50900.0]),
    ("Detroit Mercy", [55100.0, 53237.0, 51059.0, 49031.0]),
    ("Loyola New Orleans", [75000.0, 72464.0, 69500.0, 66740.0]),
    ("Saint Peter’s", [63831.0, 61672.0, 59148.0, 56800.0]),
    ("Spring Hill", [46800.0, 45217.0, 43367.0, 41645.0]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let builtin = Dataset::builtin();
        let rebuilt = Dataset::new(builtin.years().to_vec(), builtin.institutions().to_vec());

        assert!(rebuilt.is_ok());
        assert_eq!(builtin.len(), 27);
        assert_eq!(builtin.current_year(), "2025-26");
        assert!(builtin.contains(DEFAULT_BASELINE));
    }

    #[test]
    fn test_annual_cost_lookup() {
        let dataset = Dataset::builtin();

        assert_eq!(dataset.annual_cost("Fordham").unwrap(), 98331.0);
        assert_eq!(dataset.annual_cost(DEFAULT_BASELINE).unwrap(), 92602.0);
        assert_eq!(dataset.annual_cost_for("Fordham", "2022-23").unwrap(), 86400.0);
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let dataset = Dataset::builtin();

        let err = dataset.annual_cost("Hogwarts").unwrap_err();
        assert!(matches!(err, CostError::NotFound(_)));

        let err = dataset.annual_cost_for("Fordham", "1999-00").unwrap_err();
        assert!(matches!(err, CostError::NotFound(_)));
    }

    #[test]
    fn test_names_keep_dataset_order() {
        let dataset = Dataset::builtin();
        let names = dataset.names();

        assert_eq!(names[0], "Univ. of San Francisco");
        assert_eq!(names[3], "Fordham");
        assert_eq!(names.last(), Some(&"Spring Hill"));
    }

    #[test]
    fn test_records_for_year() {
        let dataset = Dataset::builtin();
        let records = dataset.records("2024-25").unwrap();

        assert_eq!(records.len(), 27);
        assert_eq!(
            records[1],
            InstitutionRecord {
                name: "Georgetown".to_string(),
                annual_cost: 92563.0,
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = Dataset::new(
            vec!["2025-26".to_string()],
            vec![
                Institution::new("A", vec![100.0]),
                Institution::new("A", vec![200.0]),
            ],
        );

        assert!(matches!(result, Err(CostError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_non_positive_cost() {
        let result = Dataset::new(
            vec!["2025-26".to_string()],
            vec![Institution::new("A", vec![0.0])],
        );
        assert!(matches!(result, Err(CostError::InvalidArgument(_))));

        let result = Dataset::new(
            vec!["2025-26".to_string()],
            vec![Institution::new("A", vec![-5.0])],
        );
        assert!(matches!(result, Err(CostError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_misaligned_costs() {
        let result = Dataset::new(
            vec!["2025-26".to_string(), "2024-25".to_string()],
            vec![Institution::new("A", vec![100.0])],
        );

        assert!(matches!(result, Err(CostError::InvalidArgument(_))));
    }

    #[test]
    fn test_from_reader() {
        let csv = "Institution,2025-26,2024-25\n\
                   Alpha College,\"$50,000\",48000\n\
                   Beta Univ.,61000,59000\n";

        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.years(), &["2025-26".to_string(), "2024-25".to_string()]);
        assert_eq!(dataset.annual_cost("Alpha College").unwrap(), 50000.0);
        assert_eq!(dataset.annual_cost_for("Beta Univ.", "2024-25").unwrap(), 59000.0);
    }

    #[test]
    fn test_from_reader_rejects_bad_cost() {
        let csv = "Institution,2025-26\nAlpha College,lots\n";
        assert!(Dataset::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_current_year_ignores_column_order() {
        let dataset = Dataset::new(
            vec!["2023-24".to_string(), "2025-26".to_string()],
            vec![Institution::new("A", vec![100.0, 120.0])],
        )
        .unwrap();

        assert_eq!(dataset.current_year(), "2025-26");
        assert_eq!(dataset.annual_cost("A").unwrap(), 120.0);
    }
}
