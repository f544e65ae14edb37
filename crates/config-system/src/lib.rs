//! Configuration for NetSim trace replay
//! Engine tuning, catalog ordering and logging, loadable from YAML, JSON or TOML

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod parser;
pub mod validation;

pub use parser::{ConfigFormat, ConfigParser, ConfigSerializer};
pub use validation::ConfigValidator;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// What happens to auto-ranged axes when an event is undone
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangeRewindPolicy {
    /// Ranges only ever widen; rewinding leaves them as they are
    #[default]
    Monotone,
    /// Every applied event snapshots the ranges it touched and undo restores them
    Restore,
}

/// Ordering of the selectable series list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Alphabetical,
    Type,
    Id,
    None,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Alphabetical => write!(f, "Alphabetical"),
            SortOrder::Type => write!(f, "Type"),
            SortOrder::Id => write!(f, "Id"),
            SortOrder::None => write!(f, "None"),
        }
    }
}

/// Replay engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Fraction of an observed value added past the min/max when widening
    pub range_padding: f64,
    pub range_rewind: RangeRewindPolicy,
    /// Fabricate keep-alive samples for auto-advancing category series
    pub synthetic_events: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            range_padding: 0.05,
            range_rewind: RangeRewindPolicy::Monotone,
            synthetic_events: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CatalogSettings {
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `env_logger` filter level: error, warn, info, debug or trace
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete replay configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ReplayConfig {
    pub engine: EngineSettings,
    pub catalog: CatalogSettings,
    pub logging: LoggingSettings,
}

impl ReplayConfig {
    /// Parse, then validate, a configuration file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = ConfigParser::parse_file(path)?;
        ConfigValidator::validate(&config)?;
        log::debug!(
            "[ReplayConfig] Loaded: padding={}, rewind={:?}, synthetic={}, sort={}",
            config.engine.range_padding,
            config.engine.range_rewind,
            config.engine.synthetic_events,
            config.catalog.sort_order
        );
        Ok(config)
    }

    /// Validate, then write, a configuration file. The format follows the
    /// extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        ConfigValidator::validate(self)?;
        ConfigSerializer::serialize_file(self, path)
    }
}
