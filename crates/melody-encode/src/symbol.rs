//! The token alphabet shared by the encoder, vocabulary, and generator.
//!
//! Every symbol has exactly one text rendering, and token text maps
//! back to exactly one symbol, so a whitespace-joined corpus file can
//! be reparsed without a side table. Pitches render as their MIDI
//! number, which is why chord labels may not be all digits.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token text for a rest step.
pub const REST_TOKEN: &str = "r";
/// Token text for continuing the previous note or rest by one step.
pub const HOLD_TOKEN: &str = "_";
/// Token text for the piece separator in boundary-run framing.
pub const BOUNDARY_TOKEN: &str = "/";
/// Token text opening a piece in start/end framing.
pub const START_TOKEN: &str = "<s>";
/// Token text closing a piece in start/end framing.
pub const END_TOKEN: &str = "</s>";

/// One element of the discrete melody alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// Onset of a note at this MIDI pitch.
    Pitch(u8),
    /// Onset of a rest.
    Rest,
    /// The previous note or rest continues for one more step.
    Hold,
    /// Harmonic context label, already sanitized.
    Chord(String),
    /// Piece separator.
    Boundary,
    /// Start-of-piece marker.
    Start,
    /// End-of-piece marker.
    End,
}

/// Raised when token text does not belong to the alphabet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SymbolParseError {
    #[error("empty token")]
    Empty,
    #[error("token '{token}' contains whitespace")]
    Whitespace { token: String },
    #[error("pitch token '{token}' is outside the MIDI range 0-127")]
    PitchOutOfRange { token: String },
}

impl Symbol {
    /// Parses one whitespace-free token back into a symbol.
    ///
    /// All-digit tokens are pitches, the reserved single tokens map to
    /// their markers, and anything else is a chord label.
    pub fn parse(token: &str) -> Result<Symbol, SymbolParseError> {
        if token.is_empty() {
            return Err(SymbolParseError::Empty);
        }
        if token.chars().any(char::is_whitespace) {
            return Err(SymbolParseError::Whitespace {
                token: token.to_string(),
            });
        }
        let symbol = match token {
            REST_TOKEN => Symbol::Rest,
            HOLD_TOKEN => Symbol::Hold,
            BOUNDARY_TOKEN => Symbol::Boundary,
            START_TOKEN => Symbol::Start,
            END_TOKEN => Symbol::End,
            other if other.bytes().all(|b| b.is_ascii_digit()) => match other.parse::<u8>() {
                Ok(pitch) if pitch <= 127 => Symbol::Pitch(pitch),
                _ => {
                    return Err(SymbolParseError::PitchOutOfRange {
                        token: other.to_string(),
                    })
                }
            },
            other => Symbol::Chord(other.to_string()),
        };
        Ok(symbol)
    }

    /// True for the framing tokens that never appear inside a melody.
    pub fn is_marker(&self) -> bool {
        matches!(self, Symbol::Boundary | Symbol::Start | Symbol::End)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Pitch(pitch) => write!(f, "{pitch}"),
            Symbol::Rest => f.write_str(REST_TOKEN),
            Symbol::Hold => f.write_str(HOLD_TOKEN),
            Symbol::Chord(label) => f.write_str(label),
            Symbol::Boundary => f.write_str(BOUNDARY_TOKEN),
            Symbol::Start => f.write_str(START_TOKEN),
            Symbol::End => f.write_str(END_TOKEN),
        }
    }
}

// Symbols serialize as their token text, same as the corpus file form.
impl Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Symbol, D::Error> {
        let text = String::deserialize(deserializer)?;
        Symbol::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Strips whitespace out of a raw chord label so the result survives
/// whitespace-delimited corpus files. "A maj7" becomes "Amaj7".
pub fn sanitize_chord_label(label: &str) -> String {
    label.split_whitespace().collect()
}

/// How pieces are delimited when a corpus is concatenated, and which
/// symbols pad and terminate a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// A run of `sequence_length` boundary tokens after every piece.
    /// The run is as long as the training window, so no window spans
    /// two pieces with less than a full run between them.
    #[default]
    BoundaryRun,
    /// A single start marker before and end marker after every piece.
    /// Leaner, but a training window may straddle two pieces.
    StartEnd,
}

impl Framing {
    /// Symbol used to left-pad a generation context.
    pub fn pad_symbol(&self) -> Symbol {
        match self {
            Framing::BoundaryRun => Symbol::Boundary,
            Framing::StartEnd => Symbol::Start,
        }
    }

    /// Symbol whose sampling terminates a generation run.
    pub fn end_symbol(&self) -> Symbol {
        match self {
            Framing::BoundaryRun => Symbol::Boundary,
            Framing::StartEnd => Symbol::End,
        }
    }

    /// Appends whatever opens a piece in this framing.
    pub fn begin_piece(&self, out: &mut Vec<Symbol>) {
        if let Framing::StartEnd = self {
            out.push(Symbol::Start);
        }
    }

    /// Appends whatever closes a piece in this framing.
    pub fn end_piece(&self, out: &mut Vec<Symbol>, sequence_length: usize) {
        match self {
            Framing::BoundaryRun => {
                out.extend(std::iter::repeat(Symbol::Boundary).take(sequence_length));
            }
            Framing::StartEnd => out.push(Symbol::End),
        }
    }
}
