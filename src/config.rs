// ⚙️ Configuration - TOML file with defaults for every key

use crate::calculator::{ProjectionParams, DEFAULT_RATE, DEFAULT_YEARS, MAX_YEARS};
use crate::dataset::{Dataset, DEFAULT_BASELINE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "tcoa.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub dashboard: DashboardConfig,
    pub projection: ProjectionConfig,
    pub server: ServerConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Institution every delta is measured against
    pub baseline: String,

    /// Academic year shown on startup (newest year when unset)
    pub default_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub years: u32,
    pub rate: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV replacing the built-in table
    pub csv: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_level: "info".to_string(),
            dashboard: DashboardConfig::default(),
            projection: ProjectionConfig::default(),
            server: ServerConfig::default(),
            data: DataConfig::default(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            baseline: DEFAULT_BASELINE.to_string(),
            default_year: None,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            years: DEFAULT_YEARS,
            rate: DEFAULT_RATE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ProjectionConfig {
    pub fn params(&self) -> ProjectionParams {
        ProjectionParams {
            years: self.years,
            rate: self.rate,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Settings> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Settings::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(raw).context("Failed to parse TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_YEARS).contains(&self.projection.years) {
            anyhow::bail!("projection.years must be between 1 and {}", MAX_YEARS);
        }
        if !self.projection.rate.is_finite() || self.projection.rate < 0.0 {
            anyhow::bail!("projection.rate must be a non-negative number");
        }
        if self.dashboard.baseline.trim().is_empty() {
            anyhow::bail!("dashboard.baseline must name an institution");
        }
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }
        Ok(())
    }

    /// Apply command-line overrides, then re-check the result
    pub fn override_port(&mut self, port: Option<u16>) -> Result<()> {
        if let Some(port) = port {
            self.server.port = port;
        }
        self.validate()
    }

    /// Dataset from `data.csv`, or the built-in table
    pub fn load_dataset(&self) -> Result<Dataset> {
        match &self.data.csv {
            Some(path) => Dataset::from_csv(path),
            None => Ok(Dataset::builtin()),
        }
    }
}
