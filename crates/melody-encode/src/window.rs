//! Sliding training windows over an encoded corpus.
//!
//! A corpus of `n` class indices yields `n - sequence_length` training
//! pairs: indices `i..i + sequence_length` as context and index
//! `i + sequence_length` as the target, for every valid `i`.

use thiserror::Error;

use crate::symbol::Symbol;
use crate::vocab::{VocabError, Vocabulary};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("sequence length must be at least 1")]
    ZeroSequenceLength,

    #[error(transparent)]
    Vocab(#[from] VocabError),
}

/// One supervised pair: a context window and the class that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub context: Vec<usize>,
    pub target: usize,
}

/// Restartable iterator of training pairs. Index resolution happens
/// once up front, so iteration itself cannot fail.
#[derive(Debug, Clone)]
pub struct Windows {
    indices: Vec<usize>,
    sequence_length: usize,
    cursor: usize,
}

impl Windows {
    /// Number of pairs this iterator yields in total.
    pub fn total(&self) -> usize {
        self.indices.len().saturating_sub(self.sequence_length)
    }
}

/// Resolves `symbols` against `vocabulary` and returns the window
/// iterator. Fails up front on any out-of-vocabulary symbol.
pub fn windows(
    symbols: &[Symbol],
    vocabulary: &Vocabulary,
    sequence_length: usize,
) -> Result<Windows, WindowError> {
    if sequence_length == 0 {
        return Err(WindowError::ZeroSequenceLength);
    }
    let indices = symbols
        .iter()
        .map(|symbol| vocabulary.lookup(symbol))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Windows {
        indices,
        sequence_length,
        cursor: 0,
    })
}

impl Iterator for Windows {
    type Item = TrainingExample;

    fn next(&mut self) -> Option<TrainingExample> {
        let end = self.cursor + self.sequence_length;
        if end >= self.indices.len() {
            return None;
        }
        let example = TrainingExample {
            context: self.indices[self.cursor..end].to_vec(),
            target: self.indices[end],
        };
        self.cursor += 1;
        Some(example)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows {}

/// Materializes the full supervised set in the shape a trainer wants:
/// one-hot context windows and plain class targets.
pub fn training_set(
    symbols: &[Symbol],
    vocabulary: &Vocabulary,
    sequence_length: usize,
) -> Result<(Vec<Vec<Vec<f64>>>, Vec<usize>), WindowError> {
    let pairs = windows(symbols, vocabulary, sequence_length)?;
    let mut inputs = Vec::with_capacity(pairs.total());
    let mut targets = Vec::with_capacity(pairs.total());
    for example in pairs {
        inputs.push(vocabulary.one_hot(&example.context));
        targets.push(example.target);
    }
    Ok((inputs, targets))
}
