//! Configuration validation utilities

use crate::{ConfigError, ReplayConfig, Result};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration
    pub fn validate(config: &ReplayConfig) -> Result<()> {
        Self::validate_engine(&config.engine)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    fn validate_engine(engine: &crate::EngineSettings) -> Result<()> {
        let padding = engine.range_padding;
        if !padding.is_finite() || !(0.0..=1.0).contains(&padding) {
            return Err(ConfigError::Validation(format!(
                "Invalid range_padding: {}. Must be between 0.0 and 1.0",
                padding
            )));
        }

        Ok(())
    }

    fn validate_logging(logging: &crate::LoggingSettings) -> Result<()> {
        let level = logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Invalid log level: {}. Must be one of {:?}",
                logging.level, LOG_LEVELS
            )));
        }

        Ok(())
    }
}
