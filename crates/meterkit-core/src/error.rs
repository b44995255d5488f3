//! Shared error type across meterkit crates.

use thiserror::Error;

use crate::meter::MeterKind;

/// Stable error codes (used in logs and HTTP mappings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Identity already bound to a meter of another kind.
    TypeMismatch,
    /// Bad amount or malformed input.
    InvalidArgument,
}

impl ErrorCode {
    /// String representation used in logs and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type for registry and meter operations.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("meter {id} is a {existing}, requested a {requested}")]
    TypeMismatch {
        id: String,
        existing: MeterKind,
        requested: MeterKind,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl MeterError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeterError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            MeterError::InvalidArgument(_) => ErrorCode::InvalidArgument,
        }
    }
}
