//! # Configuration
//!
//! Settings for numbering, tax and storage.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FURNISURE_DB_PATH=/srv/furnisure.db                                │
//! │     FURNISURE_TAX_EXEMPT=true                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/furnisure/furnisure.toml (Linux)                         │
//! │     ~/Library/Application Support/com.furnisure.quotations/... (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     CE prefix, 9% + 9% GST, Furnisure letterhead                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "./furnisure.db"
//! max_connections = 5
//!
//! [tax]
//! cgst_bps = 900
//! sgst_bps = 900
//!
//! [numbering]
//! prefix = "CE"
//! counter_name = "quotation"
//!
//! [company]
//! name = "Furnisure"
//! gst_number = "24BOGPG5365H1ZZ"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use furnisure_core::numbering::DEFAULT_PREFIX;
use furnisure_core::validation::validate_tax_rate_bps;
use furnisure_core::{CompanyProfile, GstRates, TaxRate, CGST_RATE, SGST_RATE};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file. Created on first use.
    pub path: PathBuf,

    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: 5,
        }
    }
}

/// GST rates applied to new quotations, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxSettings {
    pub cgst_bps: u32,
    pub sgst_bps: u32,
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            cgst_bps: CGST_RATE.bps(),
            sgst_bps: SGST_RATE.bps(),
        }
    }
}

impl TaxSettings {
    pub fn rates(&self) -> GstRates {
        GstRates::new(
            TaxRate::from_bps(self.cgst_bps),
            TaxRate::from_bps(self.sgst_bps),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingSettings {
    /// Leading letters of every number, `CE` in `CE0016-21-22`.
    pub prefix: String,

    /// Key of the sequence counter that numbers are drawn from.
    pub counter_name: String,
}

impl Default for NumberingSettings {
    fn default() -> Self {
        NumberingSettings {
            prefix: DEFAULT_PREFIX.to_string(),
            counter_name: "quotation".to_string(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub tax: TaxSettings,

    #[serde(default)]
    pub numbering: NumberingSettings,

    /// Letterhead printed on rendered quotations.
    #[serde(default)]
    pub company: CompanyProfile,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform default; a missing
    ///    file is not an error)
    /// 3. Environment variables
    /// 4. Validation
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Absent sections and keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.numbering.prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid(format!(
                "numbering.prefix must be non-empty ASCII letters, got: {:?}",
                prefix
            )));
        }

        if self.numbering.counter_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "numbering.counter_name must not be empty".into(),
            ));
        }

        for (key, bps) in [
            ("tax.cgst_bps", self.tax.cgst_bps),
            ("tax.sgst_bps", self.tax.sgst_bps),
        ] {
            validate_tax_rate_bps(bps)
                .map_err(|_| ConfigError::Invalid(format!("{} must be at most 10000", key)))?;
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `FURNISURE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup` (the environment, or a map in tests).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("FURNISURE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("FURNISURE_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring invalid FURNISURE_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(bps) = lookup("FURNISURE_CGST_BPS") {
            match bps.parse::<u32>() {
                Ok(bps) => self.tax.cgst_bps = bps,
                Err(_) => warn!(value = %bps, "Ignoring invalid FURNISURE_CGST_BPS"),
            }
        }

        if let Some(bps) = lookup("FURNISURE_SGST_BPS") {
            match bps.parse::<u32>() {
                Ok(bps) => self.tax.sgst_bps = bps,
                Err(_) => warn!(value = %bps, "Ignoring invalid FURNISURE_SGST_BPS"),
            }
        }

        // Wins over the individual rates
        if let Some(exempt) = lookup("FURNISURE_TAX_EXEMPT") {
            match exempt.to_lowercase().as_str() {
                "1" | "true" | "yes" => {
                    debug!("Tax exemption enabled from environment");
                    self.tax.cgst_bps = 0;
                    self.tax.sgst_bps = 0;
                }
                "0" | "false" | "no" => {}
                _ => warn!(value = %exempt, "Ignoring invalid FURNISURE_TAX_EXEMPT"),
            }
        }

        if let Some(prefix) = lookup("FURNISURE_NUMBER_PREFIX") {
            self.numbering.prefix = prefix;
        }

        if let Some(name) = lookup("FURNISURE_COUNTER_NAME") {
            self.numbering.counter_name = name;
        }

        if let Some(name) = lookup("FURNISURE_COMPANY_NAME") {
            self.company.name = name;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "furnisure", "quotations")
            .map(|dirs| dirs.config_dir().join("furnisure.toml"))
    }
}

/// Platform data directory, or the working directory if there is none.
fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "furnisure", "quotations")
        .map(|dirs| dirs.data_dir().join("furnisure.db"))
        .unwrap_or_else(|| PathBuf::from("furnisure.db"))
}

// =============================================================================
// Unit Tests
// =============================================================================
