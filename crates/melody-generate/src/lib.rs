//! Autoregressive melody generation over the time-step alphabet.
//!
//! This crate closes the loop that `melody-encode` opens: a trained
//! next-symbol model, wrapped in the [`Predictor`] trait, is driven
//! one sampling step at a time until it draws the end symbol or runs
//! out of budget. Temperature controls how adventurous the draws are.
//!
//! ```
//! use std::sync::Arc;
//!
//! use melody_encode::{Framing, Symbol, Vocabulary};
//! use melody_generate::{MelodyGenerator, PredictError, Predictor};
//!
//! struct Uniform;
//!
//! impl Predictor for Uniform {
//!     fn predict(&self, context: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
//!         let classes = context.first().map_or(0, Vec::len);
//!         Ok(vec![1.0 / classes as f64; classes])
//!     }
//! }
//!
//! let corpus: Vec<Symbol> = "60 62 64 _ r /"
//!     .split_whitespace()
//!     .map(|token| Symbol::parse(token).unwrap())
//!     .collect();
//! let vocabulary = Vocabulary::build([corpus.as_slice()]);
//! let generator =
//!     MelodyGenerator::with_vocabulary(Arc::new(Uniform), vocabulary, 4, Framing::BoundaryRun);
//!
//! let melody = generator.generate(&[Symbol::Pitch(60)], 8, 16, 1.0).unwrap();
//! assert!(melody.steps >= 1 && melody.steps <= 8);
//! assert_eq!(melody.symbols.first(), Some(&Symbol::Pitch(60)));
//! ```

pub mod generate;
pub mod predictor;
pub mod sample;

pub use generate::{GenerateError, GeneratedMelody, MelodyGenerator, StopReason};
pub use predictor::{check_window_shape, PredictError, Predictor};
pub use sample::{
    sample_with_temperature, validate_distribution, SampleError, PROBABILITY_SUM_TOLERANCE,
};
