//! Unified error types for Sprig.
//!
//! Engine operations are pure and only fail on validation. Storage and
//! serialization failures are surfaced to the caller unchanged. A few
//! infrastructure paths (species identification, config loading) are
//! fail-open: they log a warning and fall back to a safe default rather than
//! blocking the user.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Sprig operations.
#[derive(Error, Debug)]
pub enum SprigError {
    /// I/O errors from plant file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Unknown plant id, or a plant the caller does not own.
    ///
    /// The two cases are deliberately indistinguishable.
    #[error("plant not found: {plant_id}")]
    NotFound { plant_id: String },

    /// The plant kept changing under a read-modify-write update.
    #[error("plant was modified concurrently: {plant_id}")]
    Conflict { plant_id: String },

    /// Watering frequency outside 1..=3650 days.
    #[error("invalid watering frequency: {days} (must be between 1 and 3650 days)")]
    InvalidFrequency { days: u32 },

    /// Any other rejected input at plant creation.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Species identification service errors.
    #[error("identification error: {message}")]
    Identification { message: String },
}

/// A specialized Result type for Sprig operations.
pub type Result<T> = std::result::Result<T, SprigError>;

impl SprigError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a not-found error for a plant id.
    pub fn not_found(plant_id: impl Into<String>) -> Self {
        Self::NotFound {
            plant_id: plant_id.into(),
        }
    }

    /// Create a conflict error for a plant id.
    pub fn conflict(plant_id: impl Into<String>) -> Self {
        Self::Conflict {
            plant_id: plant_id.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an identification error.
    pub fn identification(message: impl Into<String>) -> Self {
        Self::Identification {
            message: message.into(),
        }
    }
}

impl From<io::Error> for SprigError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SprigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Used on paths that must never block plant creation or startup: log the
/// error and return a safe default.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }
}

/// Exit codes for the Sprig CLI.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Command failed (not found, invalid input, storage failure).
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = SprigError::storage(
            "/tmp/pl_1.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/pl_1.json"));
    }

    #[test]
    fn test_not_found_error_display() {
        let err = SprigError::not_found("pl_20260101_abcd0123");
        assert_eq!(err.to_string(), "plant not found: pl_20260101_abcd0123");
    }

    #[test]
    fn test_conflict_error_display() {
        let err = SprigError::conflict("pl_20260101_abcd0123");
        assert_eq!(
            err.to_string(),
            "plant was modified concurrently: pl_20260101_abcd0123"
        );
    }

    #[test]
    fn test_invalid_frequency_display() {
        let err = SprigError::InvalidFrequency { days: 0 };
        assert_eq!(
            err.to_string(),
            "invalid watering frequency: 0 (must be between 1 and 3650 days)"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = SprigError::config("invalid TOML");
        assert_eq!(err.to_string(), "config error: invalid TOML");
    }

    #[test]
    fn test_identification_error_display() {
        let err = SprigError::identification("service unavailable");
        assert_eq!(
            err.to_string(),
            "identification error: service unavailable"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: SprigError = io_err.into();
        assert!(matches!(err, SprigError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: SprigError = json_err.into();
        assert!(matches!(err, SprigError::Serde { .. }));
    }

    #[test]
    fn test_fail_open_default() {
        let result: Result<Vec<String>> = Err(SprigError::identification("test"));
        let value = result.fail_open_default("test context");
        assert!(value.is_empty());
    }

    #[test]
    fn test_fail_open_success() {
        let result: Result<i32> = Ok(100);
        let value = result.fail_open_default("test context");
        assert_eq!(value, 100);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::ERROR, 1);
        assert_eq!(exit_codes::CRASH, 3);
    }
}
