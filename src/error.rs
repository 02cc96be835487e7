//! Error types for the geocoding pipeline.

use thiserror::Error;

/// Errors produced while resolving addresses or writing output.
///
/// Single-address failures are per-record: the caller logs and moves on.
/// Batch submission failures are fatal to that submission.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Connection or timeout failure talking to a geocoding service.
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered, but not in the shape we expect.
    #[error("unexpected response from geocoding service: {0}")]
    ResponseFormat(String),

    /// The batch geocoder rejected the upload.
    #[error("batch submission rejected: {0}")]
    BatchSubmission(String),

    /// An input record or a claimed match violates an invariant, e.g. a
    /// duplicate record id or a coordinate that is not a finite number.
    #[error("invalid coordinate value: {0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
