//! Corpus assembly and the whitespace-joined token file format.
//!
//! The builder runs each song through key normalization, the duration
//! filter, and the encoder, then frames the surviving pieces into one
//! long symbol stream. A piece that fails encoding is skipped with a
//! warning; one bad transcription never aborts a corpus build.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::EncodingConfig;
use crate::encode::encode;
use crate::metadata::write_atomic;
use crate::song::Song;
use crate::symbol::{Symbol, SymbolParseError};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write corpus file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("bad token at position {position}: {source}")]
    BadToken {
        position: usize,
        source: SymbolParseError,
    },
}

/// Key normalization capability. The builder is agnostic about how the
/// shift is decided; score key signatures, Krumhansl profiles, or a
/// fixed table all fit behind this.
pub trait KeyNormalizer: Send + Sync {
    /// Semitones to add to every pitch so the song sits in the
    /// reference key (C major / A minor in the stock pipelines).
    fn semitone_shift(&self, song: &Song) -> i8;
}

/// One assembled corpus plus its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCorpus {
    /// All kept pieces, framed and concatenated.
    pub symbols: Vec<Symbol>,
    /// Pieces that encoded cleanly.
    pub kept: usize,
    /// Pieces rejected by the duration filter or label checks.
    pub skipped: usize,
}

impl EncodedCorpus {
    /// Writes the token file atomically (temp sibling, then rename).
    pub fn save(&self, path: &Path) -> Result<(), CorpusError> {
        let text = render_tokens(&self.symbols);
        write_atomic(path, text.as_bytes()).map_err(|source| CorpusError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), tokens = self.symbols.len(), "corpus saved");
        Ok(())
    }
}

/// The canonical file form: token texts joined by single spaces.
pub fn render_tokens(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses whitespace-separated token text back into symbols.
pub fn parse_tokens(text: &str) -> Result<Vec<Symbol>, CorpusError> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            Symbol::parse(token).map_err(|source| CorpusError::BadToken { position, source })
        })
        .collect()
}

/// Reads a saved corpus file.
pub fn load_corpus(path: &Path) -> Result<Vec<Symbol>, CorpusError> {
    let text = fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tokens(&text)
}

/// Assembles framed corpora from parsed songs.
pub struct CorpusBuilder<'a> {
    config: &'a EncodingConfig,
    normalizer: Option<&'a dyn KeyNormalizer>,
}

impl<'a> CorpusBuilder<'a> {
    pub fn new(config: &'a EncodingConfig) -> CorpusBuilder<'a> {
        CorpusBuilder {
            config,
            normalizer: None,
        }
    }

    /// Transpose every song by the normalizer's shift before encoding.
    pub fn with_normalizer(mut self, normalizer: &'a dyn KeyNormalizer) -> CorpusBuilder<'a> {
        self.normalizer = Some(normalizer);
        self
    }

    /// Encodes and frames every song that survives the filters.
    pub fn build(&self, songs: &[Song]) -> EncodedCorpus {
        let mut symbols = Vec::new();
        let mut kept = 0;
        let mut skipped = 0;

        for (piece, song) in songs.iter().enumerate() {
            let normalized = match self.normalizer {
                Some(normalizer) => song.transposed(normalizer.semitone_shift(song)),
                None => song.clone(),
            };
            match encode(&normalized, self.config) {
                Ok(encoded) => {
                    self.config.framing.begin_piece(&mut symbols);
                    symbols.extend(encoded);
                    self.config
                        .framing
                        .end_piece(&mut symbols, self.config.sequence_length);
                    kept += 1;
                }
                Err(error) => {
                    warn!(piece, %error, "piece rejected from corpus");
                    skipped += 1;
                }
            }
        }

        info!(kept, skipped, tokens = symbols.len(), "corpus assembled");
        EncodedCorpus {
            symbols,
            kept,
            skipped,
        }
    }
}
