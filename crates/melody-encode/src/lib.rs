//! Time-step encoding for monophonic melodies.
//!
//! Songs become flat token streams on a fixed rhythmic grid: a note or
//! rest contributes its onset symbol plus one `_` per remaining step,
//! chord labels ride along untimed, and pieces are framed by boundary
//! runs or start/end markers. On top of that sit a deterministic
//! class-index vocabulary, sliding training windows, and the persisted
//! metadata that ties a trained model back to its corpus.
//!
//! ```
//! use melody_encode::{decode, encode, Duration, EncodingConfig, Event, Song};
//!
//! let mut song = Song::new();
//! song.push(Event::Note { pitch: 60, duration: Duration::SIXTEENTH });
//! song.push(Event::Rest { duration: Duration::QUARTER });
//!
//! let config = EncodingConfig::default();
//! let symbols = encode(&song, &config).unwrap();
//! let texts: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
//! assert_eq!(texts, ["60", "r", "_", "_", "_"]);
//!
//! assert_eq!(decode(&symbols, config.step).unwrap(), song);
//! ```

pub mod config;
pub mod corpus;
pub mod decode;
pub mod encode;
pub mod metadata;
pub mod quantize;
pub mod song;
pub mod symbol;
pub mod vocab;
pub mod window;

pub use config::{Config, ConfigError, EncodingConfig, PathsConfig};
pub use corpus::{
    load_corpus, parse_tokens, render_tokens, CorpusBuilder, CorpusError, EncodedCorpus,
    KeyNormalizer,
};
pub use decode::{decode, DecodeError};
pub use encode::{encode, EncodeError};
pub use metadata::{Metadata, MetadataError};
pub use quantize::{durations_acceptable, steps, QuantizeError};
pub use song::{Duration, DurationParseError, Event, Song};
pub use symbol::{sanitize_chord_label, Framing, Symbol, SymbolParseError};
pub use vocab::{VocabError, Vocabulary};
pub use window::{training_set, windows, TrainingExample, WindowError, Windows};
