//! Event stream to symbol stream.
//!
//! A note or rest becomes its onset symbol followed by one hold per
//! remaining grid step, so a dotted quarter at a sixteenth step is
//! `60 _ _ _ _ _`. Chord labels pass through untimed.

use thiserror::Error;
use tracing::debug;

use crate::config::EncodingConfig;
use crate::quantize::{self, QuantizeError};
use crate::song::{Duration, Event, Song};
use crate::symbol::{self, sanitize_chord_label, Symbol};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The piece used a duration outside the acceptable set. The whole
    /// piece is rejected; callers skip it rather than rounding.
    #[error("duration {duration} quarter-beats is not in the acceptable set")]
    UnacceptableDuration { duration: Duration },

    #[error(transparent)]
    Unquantizable(#[from] QuantizeError),

    /// The sanitized label would be indistinguishable from a pitch or
    /// marker token once written to a corpus file.
    #[error("chord label '{label}' collides with reserved token text")]
    ChordLabelCollision { label: String },
}

/// Encodes one song to the time-step alphabet.
///
/// Adjacent chord labels with no timed event between them collapse to
/// the first one; labels that sanitize to nothing are dropped. Any
/// unacceptable or off-grid duration fails the whole song.
pub fn encode(song: &Song, config: &EncodingConfig) -> Result<Vec<Symbol>, EncodeError> {
    let mut symbols = Vec::new();
    let mut last_was_chord = false;

    for event in &song.events {
        match event {
            Event::Note { pitch, duration } => {
                push_timed(&mut symbols, Symbol::Pitch(*pitch), *duration, config)?;
                last_was_chord = false;
            }
            Event::Rest { duration } => {
                push_timed(&mut symbols, Symbol::Rest, *duration, config)?;
                last_was_chord = false;
            }
            Event::Chord { label } => {
                let clean = sanitize_chord_label(label);
                if clean.is_empty() {
                    debug!(%label, "dropping chord label that sanitizes to nothing");
                    continue;
                }
                if collides_with_reserved(&clean) {
                    return Err(EncodeError::ChordLabelCollision { label: clean });
                }
                if last_was_chord {
                    // Two labels with nothing sounding between them:
                    // the first one wins.
                    debug!(label = %clean, "suppressing adjacent chord label");
                    continue;
                }
                symbols.push(Symbol::Chord(clean));
                last_was_chord = true;
            }
        }
    }

    Ok(symbols)
}

fn push_timed(
    out: &mut Vec<Symbol>,
    onset: Symbol,
    duration: Duration,
    config: &EncodingConfig,
) -> Result<(), EncodeError> {
    if !config.acceptable_durations.contains(&duration) {
        return Err(EncodeError::UnacceptableDuration { duration });
    }
    let steps = quantize::steps(duration, config.step)?;
    out.push(onset);
    for _ in 1..steps {
        out.push(Symbol::Hold);
    }
    Ok(())
}

fn collides_with_reserved(label: &str) -> bool {
    label.bytes().all(|b| b.is_ascii_digit())
        || matches!(
            label,
            symbol::REST_TOKEN
                | symbol::HOLD_TOKEN
                | symbol::BOUNDARY_TOKEN
                | symbol::START_TOKEN
                | symbol::END_TOKEN
        )
}
