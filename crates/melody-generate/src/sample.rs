//! Temperature-scaled sampling from a class distribution.
//!
//! Temperature reshapes a distribution before the draw: below 1 it
//! sharpens toward the argmax, above 1 it flattens toward uniform,
//! and exactly 1 leaves the model's probabilities alone.

use rand::Rng;
use thiserror::Error;

/// How far from 1.0 a prediction's sum may stray before it is
/// rejected rather than silently renormalized.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SampleError {
    #[error("temperature must be positive and finite, got {temperature}")]
    InvalidTemperature { temperature: f64 },

    #[error("empty probability vector")]
    EmptyDistribution,

    #[error("invalid prediction: entry {index} is {value}, expected finite and positive")]
    BadProbability { index: usize, value: f64 },

    #[error("invalid prediction: probabilities sum to {sum}, expected 1")]
    UnnormalizedDistribution { sum: f64 },
}

/// Checks that `probabilities` is a usable distribution: non-empty,
/// every entry finite and strictly positive, total within
/// [`PROBABILITY_SUM_TOLERANCE`] of 1. A model that emits exact zeros
/// fails here instead of producing infinities in the log step.
pub fn validate_distribution(probabilities: &[f64]) -> Result<(), SampleError> {
    if probabilities.is_empty() {
        return Err(SampleError::EmptyDistribution);
    }
    for (index, &value) in probabilities.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(SampleError::BadProbability { index, value });
        }
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(SampleError::UnnormalizedDistribution { sum });
    }
    Ok(())
}

/// Draws one class index from `probabilities` rescaled by
/// `temperature`.
///
/// The weights are `exp((ln p_i - ln p_max) / T)`: logits shifted by
/// their maximum before the division, so the winning class always has
/// weight exactly 1 and nothing underflows to an all-zero weight set
/// at small temperatures. The draw itself walks the cumulative sum of
/// the unnormalized weights.
pub fn sample_with_temperature<R: Rng>(
    probabilities: &[f64],
    temperature: f64,
    rng: &mut R,
) -> Result<usize, SampleError> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(SampleError::InvalidTemperature { temperature });
    }
    validate_distribution(probabilities)?;

    let max_ln = probabilities
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max)
        .ln();
    let weights: Vec<f64> = probabilities
        .iter()
        .map(|p| ((p.ln() - max_ln) / temperature).exp())
        .collect();
    let total: f64 = weights.iter().sum();

    let draw = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if draw < cumulative {
            return Ok(index);
        }
    }
    // Round-off can leave the draw at the far edge; the last class
    // owns that sliver.
    Ok(weights.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bad_temperatures_are_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let uniform = [0.25, 0.25, 0.25, 0.25];
        for temperature in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = sample_with_temperature(&uniform, temperature, &mut rng);
            assert!(
                matches!(result, Err(SampleError::InvalidTemperature { .. })),
                "temperature {temperature} was accepted"
            );
        }
    }

    #[test]
    fn bad_distributions_are_rejected() {
        assert_eq!(
            validate_distribution(&[]),
            Err(SampleError::EmptyDistribution)
        );
        assert_eq!(
            validate_distribution(&[0.5, 0.0, 0.5]),
            Err(SampleError::BadProbability {
                index: 1,
                value: 0.0
            })
        );
        assert!(matches!(
            validate_distribution(&[0.5, -0.1, 0.6]),
            Err(SampleError::BadProbability { index: 1, .. })
        ));
        assert!(matches!(
            validate_distribution(&[0.5, f64::NAN]),
            Err(SampleError::BadProbability { index: 1, .. })
        ));
        assert!(matches!(
            validate_distribution(&[0.3, 0.3]),
            Err(SampleError::UnnormalizedDistribution { .. })
        ));
    }

    #[test]
    fn sums_within_tolerance_pass() {
        assert_eq!(validate_distribution(&[0.5005, 0.5]), Ok(()));
        assert!(matches!(
            validate_distribution(&[0.502, 0.5]),
            Err(SampleError::UnnormalizedDistribution { .. })
        ));
    }

    #[test]
    fn unit_temperature_tracks_the_model() {
        // Chi-squared goodness of fit against the stated distribution.
        let probabilities = [0.2, 0.3, 0.5];
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 10_000;

        let mut counts = [0usize; 3];
        for _ in 0..draws {
            counts[sample_with_temperature(&probabilities, 1.0, &mut rng).unwrap()] += 1;
        }

        let statistic: f64 = counts
            .iter()
            .zip(&probabilities)
            .map(|(&observed, &p)| {
                let expected = p * draws as f64;
                (observed as f64 - expected).powi(2) / expected
            })
            .sum();
        // 2 degrees of freedom, far out on the tail.
        assert!(statistic < 13.8, "chi-squared statistic {statistic}");
    }

    #[test]
    fn tiny_temperature_collapses_to_argmax() {
        let probabilities = [0.1, 0.2, 0.7];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let index = sample_with_temperature(&probabilities, 1e-4, &mut rng).unwrap();
            assert_eq!(index, 2);
        }
    }

    #[test]
    fn large_temperature_flattens_the_tail() {
        // At T=10 the rare class should come up far more often than
        // its raw 1% rate.
        let probabilities = [0.99, 0.01];
        let mut rng = StdRng::seed_from_u64(11);
        let draws = 5_000;
        let rare = (0..draws)
            .filter(|_| sample_with_temperature(&probabilities, 10.0, &mut rng).unwrap() == 1)
            .count();
        // exp(ln(0.01/0.99)/10) is roughly 0.63, so the rare class
        // gets about 39% of the mass.
        assert!(rare > draws / 4, "rare class drawn {rare} times");
    }

    #[test]
    fn single_class_always_wins() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(sample_with_temperature(&[1.0], 0.5, &mut rng), Ok(0));
    }
}
