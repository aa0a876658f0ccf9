//! Time quantization: exact durations to integer step counts.

use thiserror::Error;

use crate::song::{Duration, Song};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuantizeError {
    #[error("duration {duration} is not a whole multiple of the {step} step")]
    NotAMultiple { duration: Duration, step: Duration },
    #[error("duration {duration} spans too many {step} steps")]
    TooLong { duration: Duration, step: Duration },
}

/// Number of grid steps covered by `duration`, exact or nothing.
///
/// The division is done on the cross-multiplied integer forms, so a
/// duration that is not a whole multiple of `step` fails instead of
/// rounding.
pub fn steps(duration: Duration, step: Duration) -> Result<u32, QuantizeError> {
    let numer = u64::from(duration.numerator()) * u64::from(step.denominator());
    let denom = u64::from(duration.denominator()) * u64::from(step.numerator());
    if numer % denom != 0 {
        return Err(QuantizeError::NotAMultiple { duration, step });
    }
    u32::try_from(numer / denom).map_err(|_| QuantizeError::TooLong { duration, step })
}

/// Hard corpus filter: true when every timed event in `song` has a
/// duration from `accepted`. Chord labels carry no duration and never
/// disqualify a piece.
pub fn durations_acceptable(song: &Song, accepted: &[Duration]) -> bool {
    song.events.iter().all(|event| match event.duration() {
        Some(duration) => accepted.contains(&duration),
        None => true,
    })
}
