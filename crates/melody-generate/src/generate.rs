//! The autoregressive generation loop.
//!
//! One step: take the most recent class indices, one-hot them, ask the
//! predictor for a distribution, sample with temperature, append. The
//! loop stops when the framing's end symbol is drawn or the step
//! budget runs out, whichever comes first.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use melody_encode::{Framing, Metadata, MetadataError, Symbol, VocabError, Vocabulary};

use crate::predictor::{PredictError, Predictor};
use crate::sample::{sample_with_temperature, SampleError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("max_steps must be at least 1")]
    ZeroMaxSteps,

    #[error("max_context must be at least 1")]
    ZeroMaxContext,

    #[error("predictor returned {got} probabilities for a {expected}-class vocabulary")]
    DistributionLength { got: usize, expected: usize },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Vocab(#[from] VocabError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model drew the end symbol for the generator's framing.
    EndSymbol,
    /// The step budget ran out first. Not an error; the melody is
    /// simply truncated.
    MaxSteps,
}

/// A finished run: the caller's seed followed by everything sampled,
/// end symbol excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMelody {
    pub symbols: Vec<Symbol>,
    /// Sampling steps actually taken, end draw included.
    pub steps: usize,
    pub stop: StopReason,
}

/// Drives a [`Predictor`] one symbol at a time.
///
/// The generator itself is stateless across calls; every run carries
/// its own context, so one generator can serve concurrent runs.
pub struct MelodyGenerator {
    predictor: Arc<dyn Predictor>,
    vocabulary: Vocabulary,
    sequence_length: usize,
    framing: Framing,
}

impl MelodyGenerator {
    /// Builds a generator from persisted metadata, validating and
    /// rebuilding the vocabulary tables.
    pub fn new(
        predictor: Arc<dyn Predictor>,
        metadata: &Metadata,
    ) -> Result<MelodyGenerator, GenerateError> {
        let vocabulary = metadata.to_vocabulary()?;
        info!(
            classes = vocabulary.num_classes(),
            sequence_length = metadata.sequence_length,
            "generator ready"
        );
        Ok(MelodyGenerator {
            predictor,
            vocabulary,
            sequence_length: metadata.sequence_length,
            framing: metadata.framing,
        })
    }

    /// Builds a generator around an in-memory vocabulary, for
    /// same-process pipelines.
    pub fn with_vocabulary(
        predictor: Arc<dyn Predictor>,
        vocabulary: Vocabulary,
        sequence_length: usize,
        framing: Framing,
    ) -> MelodyGenerator {
        MelodyGenerator {
            predictor,
            vocabulary,
            sequence_length,
            framing,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// [`generate_with_rng`](Self::generate_with_rng) with a fresh
    /// entropy-seeded generator.
    pub fn generate(
        &self,
        seed: &[Symbol],
        max_steps: usize,
        max_context: usize,
        temperature: f64,
    ) -> Result<GeneratedMelody, GenerateError> {
        let mut rng = StdRng::from_entropy();
        self.generate_with_rng(seed, max_steps, max_context, temperature, &mut rng)
    }

    /// Runs the loop with a caller-supplied RNG, which is what tests
    /// and anything needing reproducible output use.
    ///
    /// The context starts as `sequence_length` pad symbols followed by
    /// the seed, and each step sees at most the `max_context` most
    /// recent indices.
    pub fn generate_with_rng<R: Rng>(
        &self,
        seed: &[Symbol],
        max_steps: usize,
        max_context: usize,
        temperature: f64,
        rng: &mut R,
    ) -> Result<GeneratedMelody, GenerateError> {
        if max_steps == 0 {
            return Err(GenerateError::ZeroMaxSteps);
        }
        if max_context == 0 {
            return Err(GenerateError::ZeroMaxContext);
        }
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(SampleError::InvalidTemperature { temperature }.into());
        }

        let pad_index = self.vocabulary.lookup(&self.framing.pad_symbol())?;
        // A corpus may legitimately lack the end symbol (start/end
        // framing with nothing but fragments); then only the budget
        // stops the run.
        let end_index = self.vocabulary.lookup(&self.framing.end_symbol()).ok();

        let mut indices = Vec::with_capacity(self.sequence_length + seed.len() + max_steps);
        indices.resize(self.sequence_length, pad_index);
        for symbol in seed {
            indices.push(self.vocabulary.lookup(symbol)?);
        }

        let mut melody: Vec<Symbol> = seed.to_vec();
        let mut steps = 0;
        let mut stop = StopReason::MaxSteps;

        for step in 0..max_steps {
            let start = indices.len().saturating_sub(max_context);
            let window = self.vocabulary.one_hot(&indices[start..]);

            let probabilities = self.predictor.predict(&window)?;
            if probabilities.len() != self.vocabulary.num_classes() {
                return Err(GenerateError::DistributionLength {
                    got: probabilities.len(),
                    expected: self.vocabulary.num_classes(),
                });
            }

            let drawn = sample_with_temperature(&probabilities, temperature, rng)?;
            indices.push(drawn);
            steps = step + 1;

            if end_index == Some(drawn) {
                stop = StopReason::EndSymbol;
                break;
            }

            let symbol = self.vocabulary.symbol(drawn)?.clone();
            debug!(step, symbol = %symbol, "sampled");
            melody.push(symbol);
        }

        info!(steps, ?stop, length = melody.len(), "generation finished");
        Ok(GeneratedMelody {
            symbols: melody,
            steps,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Uniform;

    impl Predictor for Uniform {
        fn predict(&self, context: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
            let classes = context.first().map_or(0, Vec::len);
            Ok(vec![1.0 / classes as f64; classes])
        }
    }

    fn tiny_generator() -> MelodyGenerator {
        let sequence: Vec<Symbol> = "60 62 _ r /"
            .split_whitespace()
            .map(|token| Symbol::parse(token).unwrap())
            .collect();
        let vocabulary = Vocabulary::build([sequence.as_slice()]);
        MelodyGenerator::with_vocabulary(Arc::new(Uniform), vocabulary, 4, Framing::BoundaryRun)
    }

    #[test]
    fn zero_budgets_are_rejected() {
        let generator = tiny_generator();
        assert!(matches!(
            generator.generate(&[], 0, 8, 1.0),
            Err(GenerateError::ZeroMaxSteps)
        ));
        assert!(matches!(
            generator.generate(&[], 8, 0, 1.0),
            Err(GenerateError::ZeroMaxContext)
        ));
    }

    #[test]
    fn bad_temperature_fails_before_any_prediction() {
        let generator = tiny_generator();
        assert!(matches!(
            generator.generate(&[], 8, 8, 0.0),
            Err(GenerateError::Sample(SampleError::InvalidTemperature { .. }))
        ));
        assert!(matches!(
            generator.generate(&[], 8, 8, f64::NAN),
            Err(GenerateError::Sample(SampleError::InvalidTemperature { .. }))
        ));
    }

    #[test]
    fn unknown_seed_symbol_is_reported() {
        let generator = tiny_generator();
        let seed = [Symbol::Pitch(99)];
        assert!(matches!(
            generator.generate(&seed, 8, 8, 1.0),
            Err(GenerateError::Vocab(VocabError::UnknownSymbol { .. }))
        ));
    }
}
