//! Configuration loading from TOML.
//!
//! Reads `wagerbook.toml` and deserializes into strongly-typed structs.
//! Every setting has a default, so a missing file or a partial file is
//! fine — the config exists to pin the product decisions (position
//! basis, default import schema, report window), not to gate startup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::ingest::ImportSchema;
use crate::report::{AggregateMode, PositionBasis};

/// Default config file path.
pub const DEFAULT_CONFIG_FILE: &str = "wagerbook.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub import: ImportSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LedgerSettings {
    /// Display label only — all arithmetic is currency-agnostic.
    pub currency: String,
    /// Which bets count toward total position (see SummaryMetrics).
    pub position_basis: PositionBasis,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            position_basis: PositionBasis::All,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ImportSettings {
    pub default_schema: ImportSchema,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            default_schema: ImportSchema::Simple,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportSettings {
    pub mode: AggregateMode,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            mode: AggregateMode::AllTime,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is
    /// absent. A present-but-broken file is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
