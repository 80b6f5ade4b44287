//! Unified error type for profile generation.
//!
//! Domain failures from configuration, geometry, and input validation are
//! represented by [`ProfgenError`]. Outer layers wrap it in `anyhow` with
//! context about the file or stage that failed.

use thiserror::Error;

/// Error categories for every profgen operation.
#[derive(Error, Debug)]
pub enum ProfgenError {
    /// I/O errors (file access, directory creation)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Input data that is well-formed but inconsistent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors (missing technology, unknown policy, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or unsupported geometries
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using ProfgenError.
pub type ProfgenResult<T> = Result<T, ProfgenError>;

impl From<anyhow::Error> for ProfgenError {
    fn from(err: anyhow::Error) -> Self {
        ProfgenError::Other(err.to_string())
    }
}

impl From<String> for ProfgenError {
    fn from(s: String) -> Self {
        ProfgenError::Other(s)
    }
}

impl From<&str> for ProfgenError {
    fn from(s: &str) -> Self {
        ProfgenError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for ProfgenError {
    fn from(err: serde_json::Error) -> Self {
        ProfgenError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for ProfgenError {
    fn from(err: serde_yaml::Error) -> Self {
        ProfgenError::Config(err.to_string())
    }
}
