// Error types for the spatial point pattern test

use thiserror::Error;

/// Unified error type for all operations in this crate.
///
/// The three domain variants mirror the failure taxonomy of the test:
/// configuration problems are caught before any computation starts, data
/// problems are fatal at the I/O boundary, and invariant violations indicate
/// a bug rather than a user input problem.
#[derive(Error, Debug)]
pub enum SpptError {
    /// Invalid run parameters (iteration count, percentages, empty band, no areas)
    #[error("configuration error: {0}")]
    Config(String),

    /// Problems with the input data (unreadable files, unsupported geometries)
    #[error("data error: {0}")]
    Data(String),

    /// Conditions that cannot occur unless the engine itself is broken
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// I/O errors (reading point/area files, writing results)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GeoJSON parse errors
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SpptError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SpptError::Config(message.into())
    }

    /// Creates a data error.
    pub fn data(message: impl Into<String>) -> Self {
        SpptError::Data(message.into())
    }

    /// Creates an invariant violation.
    pub fn invariant(message: impl Into<String>) -> Self {
        SpptError::Invariant(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpptError>;
