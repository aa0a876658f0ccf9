//! Configuration for corpus preprocessing.
//!
//! There are no process-wide settings in this crate; every operation
//! takes its options as a value. The file form is TOML:
//!
//! ```toml
//! [paths]
//! dataset_dir = "data/raw/deutschl"
//! corpus_path = "data/processed/corpus.txt"
//! metadata_path = "data/processed/metadata.json"
//!
//! [encoding]
//! step = "1/4"
//! acceptable_durations = ["1/4", "1/2", "3/4", "1", "3/2", "2", "3", "4"]
//! sequence_length = 64
//! framing = "boundary_run"
//! ```
//!
//! Durations are fraction text in quarter-beats. Missing sections and
//! fields fall back to the compiled defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::song::Duration;
use crate::symbol::Framing;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead { path: PathBuf, source: io::Error },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Options consumed by the encoder, corpus builder, and windower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Quantization step in quarter-beats.
    #[serde(default = "default_step")]
    pub step: Duration,
    /// Pieces containing any timed duration outside this set are
    /// dropped whole, never rounded in.
    #[serde(default = "default_acceptable_durations")]
    pub acceptable_durations: Vec<Duration>,
    /// Training context length, also the length of a boundary run.
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,
    /// How pieces are separated in a concatenated corpus.
    #[serde(default)]
    pub framing: Framing,
}

impl Default for EncodingConfig {
    fn default() -> EncodingConfig {
        EncodingConfig {
            step: default_step(),
            acceptable_durations: default_acceptable_durations(),
            sequence_length: default_sequence_length(),
            framing: Framing::default(),
        }
    }
}

fn default_step() -> Duration {
    Duration::SIXTEENTH
}

fn default_acceptable_durations() -> Vec<Duration> {
    vec![
        Duration::SIXTEENTH,
        Duration::EIGHTH,
        Duration::DOTTED_EIGHTH,
        Duration::QUARTER,
        Duration::DOTTED_QUARTER,
        Duration::HALF,
        Duration::DOTTED_HALF,
        Duration::WHOLE,
    ]
}

fn default_sequence_length() -> usize {
    64
}

/// Where the corpus pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory of raw notation files, walked by whatever front end
    /// feeds [`Song`](crate::song::Song) values into the builder.
    pub dataset_dir: PathBuf,
    /// Whitespace-joined token file the builder writes.
    pub corpus_path: PathBuf,
    /// Vocabulary metadata JSON next to the corpus.
    pub metadata_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> PathsConfig {
        PathsConfig {
            dataset_dir: PathBuf::from("data/raw"),
            corpus_path: PathBuf::from("data/processed/corpus.txt"),
            metadata_path: PathBuf::from("data/processed/metadata.json"),
        }
    }
}

/// Complete file-form configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
}

impl Config {
    /// Loads TOML from `path` over the compiled defaults.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Renders the full configuration, defaults included, as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
