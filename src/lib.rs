// TCOA Comparison Dashboard - Core Library
// Exposes the dataset, calculator and views for the TUI, the API server and tests

pub mod calculator;
pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod view;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use calculator::{
    compare, project, project_record,
    ComparisonRow, ProjectionParams, ProjectionResult,
    DEFAULT_RATE, DEFAULT_YEARS, MAX_YEARS,
};
pub use config::Settings;
pub use dataset::{Dataset, Institution, InstitutionRecord, DEFAULT_BASELINE};
pub use error::CostError;
pub use view::{ComparisonView, Dashboard, Metric, TrendPoint, TrendSeries, ViewRequest};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing. `RUST_LOG` wins over `default_level`.
///
/// Output goes to stderr so it never interleaves with table/CSV output on stdout.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
