//! Symbolic event model for monophonic melodies.
//!
//! Everything here is measured in quarter-beats. A [`Duration`] is an
//! exact fraction so that quantization can test divisibility without
//! floating-point slop, and a [`Song`] is just an ordered list of
//! events: notes, rests, and harmonic context labels.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A span of musical time in quarter-beats, kept as a reduced fraction.
///
/// Two durations compare equal whenever they name the same span, so
/// `Duration::new(2, 4)` equals `Duration::new(1, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    num: u32,
    den: u32,
}

/// Raised when duration text is not a positive `N` or `N/D` fraction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid duration '{text}': expected a positive 'N' or 'N/D' in quarter-beats")]
pub struct DurationParseError {
    pub text: String,
}

impl Duration {
    /// Sixteenth note: a quarter of a quarter-beat.
    pub const SIXTEENTH: Duration = Duration { num: 1, den: 4 };
    /// Eighth note.
    pub const EIGHTH: Duration = Duration { num: 1, den: 2 };
    /// Dotted eighth note.
    pub const DOTTED_EIGHTH: Duration = Duration { num: 3, den: 4 };
    /// Quarter note, the unit span.
    pub const QUARTER: Duration = Duration { num: 1, den: 1 };
    /// Dotted quarter note.
    pub const DOTTED_QUARTER: Duration = Duration { num: 3, den: 2 };
    /// Half note.
    pub const HALF: Duration = Duration { num: 2, den: 1 };
    /// Dotted half note.
    pub const DOTTED_HALF: Duration = Duration { num: 3, den: 1 };
    /// Whole note.
    pub const WHOLE: Duration = Duration { num: 4, den: 1 };

    /// Builds `num/den` quarter-beats, reduced to lowest terms.
    ///
    /// Returns `None` when either part is zero; durations are always
    /// strictly positive.
    pub fn new(num: u32, den: u32) -> Option<Duration> {
        if num == 0 || den == 0 {
            return None;
        }
        let divisor = gcd(num, den);
        Some(Duration {
            num: num / divisor,
            den: den / divisor,
        })
    }

    pub fn numerator(&self) -> u32 {
        self.num
    }

    pub fn denominator(&self) -> u32 {
        self.den
    }

    /// Approximate span as a float, for timelines and display only.
    /// Quantization never goes through this.
    pub fn as_quarters(&self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, other: Duration) -> Duration {
        let num = self.num * other.den + other.num * self.den;
        let den = self.den * other.den;
        let divisor = gcd(num, den);
        Duration {
            num: num / divisor,
            den: den / divisor,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(text: &str) -> Result<Duration, DurationParseError> {
        let err = || DurationParseError {
            text: text.to_string(),
        };
        let (num, den) = match text.split_once('/') {
            Some((num, den)) => (
                num.trim().parse::<u32>().map_err(|_| err())?,
                den.trim().parse::<u32>().map_err(|_| err())?,
            ),
            None => (text.trim().parse::<u32>().map_err(|_| err())?, 1),
        };
        Duration::new(num, den).ok_or_else(err)
    }
}

// Durations travel through JSON and TOML as fraction text ("3/2", "1")
// so that config files and persisted records stay exact.
impl Serialize for Duration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// One entry in a melody's event stream.
///
/// Chords carry no duration of their own; they label the harmony from
/// their position until the next label and sit between timed events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Note { pitch: u8, duration: Duration },
    Rest { duration: Duration },
    Chord { label: String },
}

impl Event {
    /// The time this event occupies; `None` for chord labels.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Event::Note { duration, .. } | Event::Rest { duration } => Some(*duration),
            Event::Chord { .. } => None,
        }
    }
}

/// An ordered monophonic event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub events: Vec<Event>,
}

impl Song {
    pub fn new() -> Song {
        Song::default()
    }

    pub fn from_events(events: Vec<Event>) -> Song {
        Song { events }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Copy of this song with every note moved by `semitones`, pitches
    /// clamped to the MIDI range. Rests and chord labels pass through;
    /// relabeling harmony is the caller's concern.
    pub fn transposed(&self, semitones: i8) -> Song {
        let events = self
            .events
            .iter()
            .map(|event| match event {
                Event::Note { pitch, duration } => Event::Note {
                    pitch: (i16::from(*pitch) + i16::from(semitones)).clamp(0, 127) as u8,
                    duration: *duration,
                },
                other => other.clone(),
            })
            .collect();
        Song { events }
    }

    /// Events paired with their onset in quarter-beats from the start.
    /// A chord label shares the onset of whatever follows it.
    pub fn timeline(&self) -> Vec<(f64, &Event)> {
        let mut onset = 0.0;
        self.events
            .iter()
            .map(|event| {
                let at = onset;
                if let Some(duration) = event.duration() {
                    onset += duration.as_quarters();
                }
                (at, event)
            })
            .collect()
    }
}
