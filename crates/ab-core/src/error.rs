//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::ZoneId;

/// The top-level error type for `ab-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("zone {0} not found")]
    ZoneNotFound(ZoneId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `ab-core`.
pub type CoreResult<T> = Result<T, CoreError>;
