//! Symbol stream back to an event stream.
//!
//! The inverse of [`encode`](crate::encode::encode) for melodies that
//! stayed on the grid: each onset symbol opens a note or rest of one
//! step, and each hold stretches the open event by one more step.

use thiserror::Error;

use crate::song::{Duration, Event, Song};
use crate::symbol::Symbol;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A hold with no note or rest before it has nothing to extend.
    #[error("continuation at position {position} has no open note or rest to extend")]
    DanglingHold { position: usize },

    /// Markers delimit pieces; a decodable melody never contains one.
    /// Callers strip framing before decoding.
    #[error("marker token '{token}' at position {position} is not part of a melody")]
    MarkerInMelody { token: String, position: usize },
}

/// Rebuilds the event stream from symbols, growing each open note or
/// rest by `step` per hold. Chord labels are passed through in place
/// and do not close the open event.
pub fn decode(symbols: &[Symbol], step: Duration) -> Result<Song, DecodeError> {
    let mut events: Vec<Event> = Vec::new();
    // Index of the note or rest a hold would extend.
    let mut open: Option<usize> = None;

    for (position, symbol) in symbols.iter().enumerate() {
        match symbol {
            Symbol::Pitch(pitch) => {
                events.push(Event::Note {
                    pitch: *pitch,
                    duration: step,
                });
                open = Some(events.len() - 1);
            }
            Symbol::Rest => {
                events.push(Event::Rest { duration: step });
                open = Some(events.len() - 1);
            }
            Symbol::Hold => match open {
                Some(index) => match &mut events[index] {
                    Event::Note { duration, .. } | Event::Rest { duration } => {
                        *duration = *duration + step;
                    }
                    Event::Chord { .. } => unreachable!("open only ever points at a timed event"),
                },
                None => return Err(DecodeError::DanglingHold { position }),
            },
            Symbol::Chord(label) => {
                events.push(Event::Chord {
                    label: label.clone(),
                });
            }
            Symbol::Boundary | Symbol::Start | Symbol::End => {
                return Err(DecodeError::MarkerInMelody {
                    token: symbol.to_string(),
                    position,
                });
            }
        }
    }

    Ok(Song::from_events(events))
}
