//! Symbols and the sets the extractors produce.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a symbol was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Macro,
    Function,
    CatalogEntry,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Macro => "macro",
            SymbolKind::Function => "function",
            SymbolKind::CatalogEntry => "catalog_entry",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named API element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Key used for every cross-set comparison.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Duplicate-free collection of symbols that remembers discovery order.
///
/// Membership is case-insensitive: `TX_BEGIN` and `tx_begin` are the same
/// element, and the first spelling seen is the one kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
    keys: HashSet<String>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol. Returns false when an equal key is already present.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        if self.keys.insert(symbol.key()) {
            self.symbols.push(symbol);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains(&name.to_lowercase())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Names in discovery order.
    pub fn names(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.name.as_str()).collect()
    }

    /// Union preserving `self`'s order first.
    pub fn union(&self, other: &SymbolSet) -> SymbolSet {
        let mut merged = self.clone();
        merged.extend(other.iter().cloned());
        merged
    }
}

impl Extend<Symbol> for SymbolSet {
    fn extend<I: IntoIterator<Item = Symbol>>(&mut self, iter: I) {
        for symbol in iter {
            self.insert(symbol);
        }
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut set = SymbolSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}
