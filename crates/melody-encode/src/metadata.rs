//! Persisted vocabulary metadata.
//!
//! The JSON record is the contract between corpus preprocessing and
//! any later consumer of the trained model: token text to class index,
//! the training window length, the class count, and the framing the
//! corpus was assembled with. Building the same corpus twice writes
//! byte-identical metadata.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::symbol::{Framing, Symbol, SymbolParseError};
use crate::vocab::Vocabulary;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read metadata file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write metadata file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("malformed metadata JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("metadata declares {declared} classes but maps {actual} symbols")]
    ClassCountMismatch { declared: usize, actual: usize },

    #[error("mapping indices must cover 0..{num_classes} exactly; {index} breaks that")]
    NonContiguousIndices { index: usize, num_classes: usize },

    #[error("mapping key is not a valid token: {source}")]
    BadToken {
        #[from]
        source: SymbolParseError,
    },
}

/// The on-disk vocabulary record.
///
/// `mapping` is a [`BTreeMap`] so serialization order, and therefore
/// the bytes on disk, never depend on hash iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Token text to class index.
    pub mapping: BTreeMap<String, usize>,
    /// Training context length the corpus was windowed with.
    pub sequence_length: usize,
    /// Width of the model's probability output.
    pub num_classes: usize,
    /// Absent in records written before framing was configurable;
    /// those were all boundary-run.
    #[serde(default)]
    pub framing: Framing,
}

impl Metadata {
    pub fn from_vocabulary(
        vocabulary: &Vocabulary,
        sequence_length: usize,
        framing: Framing,
    ) -> Metadata {
        let mapping = vocabulary
            .symbols()
            .iter()
            .enumerate()
            .map(|(index, symbol)| (symbol.to_string(), index))
            .collect();
        Metadata {
            mapping,
            sequence_length,
            num_classes: vocabulary.num_classes(),
            framing,
        }
    }

    /// Rebuilds the bidirectional vocabulary tables, validating first.
    pub fn to_vocabulary(&self) -> Result<Vocabulary, MetadataError> {
        self.validate()?;
        let mut slots: Vec<Option<Symbol>> = vec![None; self.num_classes];
        for (text, &index) in &self.mapping {
            slots[index] = Some(Symbol::parse(text)?);
        }
        // validate() proved the indices cover 0..num_classes exactly.
        Ok(Vocabulary::from_parts(slots.into_iter().flatten().collect()))
    }

    /// Checks that `mapping` is a bijection onto `0..num_classes`.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.num_classes != self.mapping.len() {
            return Err(MetadataError::ClassCountMismatch {
                declared: self.num_classes,
                actual: self.mapping.len(),
            });
        }
        let mut seen = vec![false; self.num_classes];
        for &index in self.mapping.values() {
            if index >= self.num_classes || seen[index] {
                return Err(MetadataError::NonContiguousIndices {
                    index,
                    num_classes: self.num_classes,
                });
            }
            seen[index] = true;
        }
        Ok(())
    }

    /// Reads and validates a metadata file.
    pub fn load(path: &Path) -> Result<Metadata, MetadataError> {
        let text = fs::read_to_string(path).map_err(|source| MetadataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata: Metadata =
            serde_json::from_str(&text).map_err(|source| MetadataError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Writes the record atomically: a temp sibling first, then a
    /// rename over `path`, so readers never observe a half-written
    /// file.
    pub fn save(&self, path: &Path) -> Result<(), MetadataError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| MetadataError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic(path, json.as_bytes()).map_err(|source| MetadataError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), classes = self.num_classes, "metadata saved");
        Ok(())
    }
}

/// Write-then-rename publish, parent directories created on demand.
/// Also used for corpus files.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
