//! Error types for the temporal pooler.
//!
//! This module provides a unified error type for the fatal error kinds of
//! the temporal pooler, using the `thiserror` crate for ergonomic error
//! handling. Surprise (an unpredicted input) is data, not an error: it is
//! recovered locally via backtracking and never surfaces through this type.

use thiserror::Error;

/// The main error type for temporal pooler operations.
///
/// All variants here are fatal: construction-time misconfiguration, a
/// malformed call, or caller-supplied input outside the valid range.
#[derive(Error, Debug)]
pub enum TpError {
    /// A construction-time parameter invariant was violated.
    #[error("invalid temporal pooler configuration: {0}")]
    ConfigInvalid(String),

    /// `predict(n)` was called with `n <= 0`.
    #[error("predict() requires nSteps > 0, got {0}")]
    PredictStepsInvalid(i64),

    /// `computeOutput` was asked for an output mode it doesn't know.
    #[error("unknown output type")]
    OutputModeUnknown,

    /// A column index in `activeColumns` fell outside `[0, NumberOfCols)`.
    #[error("column index {index} out of range [0, {num_cols})")]
    InputOutOfRange {
        /// The offending index.
        index: usize,
        /// Valid column count.
        num_cols: usize,
    },
}

/// A specialized `Result` type for temporal pooler operations.
pub type Result<T> = std::result::Result<T, TpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TpError::PredictStepsInvalid(0);
        assert_eq!(err.to_string(), "predict() requires nSteps > 0, got 0");

        let err = TpError::InputOutOfRange {
            index: 10,
            num_cols: 4,
        };
        assert_eq!(err.to_string(), "column index 10 out of range [0, 4)");
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(returns_result().unwrap(), 42);
    }
}
