//! Deterministic symbol to class-index mapping.
//!
//! Class indices are assigned by sorting the distinct token texts, so
//! the same corpus always yields the same table no matter how it was
//! iterated. Anything keyed by hash order never decides an index.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::symbol::Symbol;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VocabError {
    #[error("symbol '{symbol}' is not in the vocabulary")]
    UnknownSymbol { symbol: String },

    #[error("class index {index} is out of range for {num_classes} classes")]
    IndexOutOfRange { index: usize, num_classes: usize },
}

/// Bijective mapping between symbols and dense class indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    /// Position in this table is the class index.
    symbols: Vec<Symbol>,
    /// Forward lookup only; its iteration order decides nothing.
    index: HashMap<Symbol, usize>,
}

impl Vocabulary {
    /// Collects the distinct symbols of `sequences` and assigns class
    /// indices in lexicographic token-text order.
    pub fn build<'a, I>(sequences: I) -> Vocabulary
    where
        I: IntoIterator<Item = &'a [Symbol]>,
    {
        let mut by_text: BTreeMap<String, Symbol> = BTreeMap::new();
        for sequence in sequences {
            for symbol in sequence {
                by_text
                    .entry(symbol.to_string())
                    .or_insert_with(|| symbol.clone());
            }
        }
        Vocabulary::from_parts(by_text.into_values().collect())
    }

    /// Rebuilds the lookup tables from an already-ordered, duplicate-free
    /// symbol list. Callers validate before handing symbols in.
    pub(crate) fn from_parts(symbols: Vec<Symbol>) -> Vocabulary {
        let index = symbols
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, symbol)| (symbol, index))
            .collect();
        Vocabulary { symbols, index }
    }

    /// Class index of `symbol`, failing on anything unseen. There is
    /// no out-of-vocabulary bucket.
    pub fn lookup(&self, symbol: &Symbol) -> Result<usize, VocabError> {
        self.index
            .get(symbol)
            .copied()
            .ok_or_else(|| VocabError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    /// Symbol at `index`, the inverse of [`lookup`](Self::lookup).
    pub fn symbol(&self, index: usize) -> Result<&Symbol, VocabError> {
        self.symbols.get(index).ok_or(VocabError::IndexOutOfRange {
            index,
            num_classes: self.symbols.len(),
        })
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.index.contains_key(symbol)
    }

    pub fn num_classes(&self) -> usize {
        self.symbols.len()
    }

    /// All symbols in class-index order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// One-hot rows for a window of class indices, the input shape the
    /// predictor contract expects. Indices must come from this
    /// vocabulary's `lookup`.
    pub fn one_hot(&self, indices: &[usize]) -> Vec<Vec<f64>> {
        indices
            .iter()
            .map(|&class| {
                debug_assert!(class < self.symbols.len());
                let mut row = vec![0.0; self.symbols.len()];
                row[class] = 1.0;
                row
            })
            .collect()
    }
}
