//! Convenience result type alias for DocGate.

use crate::error::AppError;

/// A specialized `Result` type for DocGate operations.
pub type AppResult<T> = Result<T, AppError>;
