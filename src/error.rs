// Typed errors for pattern validation and import

use thiserror::Error;

/// Errors raised while building or parsing pattern fields
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("unknown tool: {0} (expected one of: claude-code, cursor, copilot, other)")]
    UnknownTool(String),

    #[error("unknown outcome: {0} (expected one of: success, partial, failure)")]
    UnknownOutcome(String),

    #[error("unknown source: {0} (expected one of: local, team)")]
    UnknownSource(String),
}

/// Structural failures of an import payload
///
/// Either variant means nothing was merged.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid format: expected array")]
    NotAnArray,
}
