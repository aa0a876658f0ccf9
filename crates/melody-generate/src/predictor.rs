//! The next-symbol predictor contract.
//!
//! The generator drives any sequence model that can score one context
//! window: rows of one-hot vectors in, one probability distribution
//! over the classes out. Implementations may wrap an in-process model
//! or call out to a served one; nothing else in this crate knows the
//! difference.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredictError {
    /// The context rows did not match the model's input width.
    #[error("context row {row} has {got} columns, expected {expected}")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Whatever backs the model failed: process, socket, file.
    #[error("predictor backend failure: {message}")]
    Backend { message: String },
}

pub trait Predictor: Send + Sync {
    /// Scores one window. `context` holds the most recent symbols in
    /// order, each row one-hot over the vocabulary; the result must be
    /// one probability per class, all strictly positive, summing to 1.
    fn predict(&self, context: &[Vec<f64>]) -> Result<Vec<f64>, PredictError>;
}

/// Shape check shared by predictor implementations: every row must be
/// `num_classes` wide.
pub fn check_window_shape(context: &[Vec<f64>], num_classes: usize) -> Result<(), PredictError> {
    for (row, columns) in context.iter().enumerate() {
        if columns.len() != num_classes {
            return Err(PredictError::ShapeMismatch {
                row,
                expected: num_classes,
                got: columns.len(),
            });
        }
    }
    Ok(())
}
