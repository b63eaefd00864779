//! Error types for Sentinel.
//!
//! The simulation core never fails at runtime (gating failures are ordinary
//! "not fired" / "hold position" outcomes); these errors cover loading and
//! validating the static configuration.

use thiserror::Error;

/// Top-level error type for Sentinel operations.
#[derive(Debug, Error)]
pub enum SentinelError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Two weapons share a name
    #[error("Duplicate weapon name: {0}")]
    DuplicateWeapon(String),
}

impl ConfigError {
    /// Shorthand for an [`ConfigError::Invalid`] error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Fails unless `value` is a finite number `>= 0`.
    pub fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::invalid(field, format!("must be >= 0, got {value}")))
        }
    }

    /// Fails unless `value` lies within `[min, max]`.
    pub fn ensure_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::invalid(field, format!("must be within [{min}, {max}], got {value}")))
        }
    }
}

/// Result type alias for Sentinel operations.
pub type SentinelResult<T> = Result<T, SentinelError>;
