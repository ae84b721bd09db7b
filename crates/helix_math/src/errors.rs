//! Error Types
//!
//! Fallible conversions of the math layer. Precondition violations on hot
//! paths (non-normalized input to `_normalized` operations, non-unit axes)
//! panic instead, see the individual functions.

use thiserror::Error;

/// Errors returned by the fallible math conversions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// The matrix has scaling, shear, reflection or projection in it.
    #[error("the matrix doesn't represent a rigid transformation")]
    NotRigidTransformation,
}

/// Alias for `Result<T, MathError>`.
pub type Result<T> = std::result::Result<T, MathError>;
