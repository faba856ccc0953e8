//! Reconciliation of the extracted symbol sets.
//!
//! Each check is a pure function from sets to a [`MissList`]. None of them
//! looks at another's result, so they can run in any order.

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::probe::LinkageProbe;
use crate::symbol::{Symbol, SymbolSet};

/// The four completeness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    UndocumentedMacros,
    UndocumentedFunctions,
    OrphanEntries,
    UnlinkedEntries,
}

impl Check {
    pub const ALL: [Check; 4] = [
        Check::UndocumentedMacros,
        Check::UndocumentedFunctions,
        Check::OrphanEntries,
        Check::UnlinkedEntries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Check::UndocumentedMacros => "undocumented_macros",
            Check::UndocumentedFunctions => "undocumented_functions",
            Check::OrphanEntries => "orphan_entries",
            Check::UnlinkedEntries => "unlinked_entries",
        }
    }

    /// Header line printed above the miss-list.
    pub fn header(&self) -> &'static str {
        match self {
            Check::UndocumentedMacros => "Macros missing from the generated catalog",
            Check::UndocumentedFunctions => "Functions missing from the generated catalog",
            Check::OrphanEntries => "Catalog entries without a matching macro or function",
            Check::UnlinkedEntries => "Catalog entries without a linked manual page",
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Symbols one check found missing, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissList {
    pub check: Check,
    pub symbols: Vec<Symbol>,
    /// The check did not run (linkage probing disabled).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl MissList {
    pub fn new(check: Check, symbols: Vec<Symbol>) -> Self {
        Self {
            check,
            symbols,
            skipped: false,
        }
    }

    pub fn skipped(check: Check) -> Self {
        Self {
            check,
            symbols: Vec::new(),
            skipped: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.symbols.iter().any(|s| s.key() == key)
    }

    pub fn names(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.name.as_str()).collect()
    }
}

/// The three extracted sets of one run.
#[derive(Debug, Clone, Default)]
pub struct SymbolSets {
    pub macros: SymbolSet,
    pub functions: SymbolSet,
    pub catalog: SymbolSet,
}

/// The four miss-lists of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub undocumented_macros: MissList,
    pub undocumented_functions: MissList,
    pub orphan_entries: MissList,
    pub unlinked_entries: MissList,
}

impl Findings {
    /// Miss-lists in report order.
    pub fn lists(&self) -> [&MissList; 4] {
        [
            &self.undocumented_macros,
            &self.undocumented_functions,
            &self.orphan_entries,
            &self.unlinked_entries,
        ]
    }

    pub fn get(&self, check: Check) -> &MissList {
        match check {
            Check::UndocumentedMacros => &self.undocumented_macros,
            Check::UndocumentedFunctions => &self.undocumented_functions,
            Check::OrphanEntries => &self.orphan_entries,
            Check::UnlinkedEntries => &self.unlinked_entries,
        }
    }

    /// Fully documented and linked.
    pub fn is_clean(&self) -> bool {
        self.lists().iter().all(|l| l.is_empty())
    }

    pub fn total_missing(&self) -> usize {
        self.lists().iter().map(|l| l.len()).sum()
    }
}

/// Elements of `left` with no case-insensitive match in `right`.
fn difference(left: &SymbolSet, right: &SymbolSet) -> Vec<Symbol> {
    left.iter()
        .filter(|s| !right.contains(&s.name))
        .cloned()
        .collect()
}

/// `Macros - CatalogEntries`.
pub fn undocumented_macros(macros: &SymbolSet, catalog: &SymbolSet) -> MissList {
    MissList::new(Check::UndocumentedMacros, difference(macros, catalog))
}

/// `ExportedFunctions - CatalogEntries`.
pub fn undocumented_functions(functions: &SymbolSet, catalog: &SymbolSet) -> MissList {
    MissList::new(Check::UndocumentedFunctions, difference(functions, catalog))
}

/// `CatalogEntries - (Macros | ExportedFunctions)`.
pub fn orphan_entries(catalog: &SymbolSet, macros: &SymbolSet, functions: &SymbolSet) -> MissList {
    MissList::new(Check::OrphanEntries, difference(catalog, &macros.union(functions)))
}

/// Catalog entries the manual viewer cannot resolve.
///
/// Probes run on the rayon pool; the result keeps catalog order.
pub fn unlinked_entries(
    catalog: &SymbolSet,
    probe: &dyn LinkageProbe,
    progress: &ProgressBar,
) -> Result<MissList> {
    let probed: Vec<(&Symbol, bool)> = catalog
        .as_slice()
        .par_iter()
        .map(|entry| {
            let linked = probe.is_linked(&entry.name);
            progress.inc(1);
            linked.map(|linked| (entry, linked))
        })
        .collect::<Result<Vec<_>>>()?;

    let missing = probed
        .into_iter()
        .filter(|(_, linked)| !linked)
        .map(|(entry, _)| entry.clone())
        .collect();
    Ok(MissList::new(Check::UnlinkedEntries, missing))
}

/// Run all four checks. `probe` of None skips the linkage check.
pub fn reconcile(
    sets: &SymbolSets,
    probe: Option<&dyn LinkageProbe>,
    progress: &ProgressBar,
) -> Result<Findings> {
    let unlinked = match probe {
        Some(probe) => unlinked_entries(&sets.catalog, probe, progress)?,
        None => MissList::skipped(Check::UnlinkedEntries),
    };

    Ok(Findings {
        undocumented_macros: undocumented_macros(&sets.macros, &sets.catalog),
        undocumented_functions: undocumented_functions(&sets.functions, &sets.catalog),
        orphan_entries: orphan_entries(&sets.catalog, &sets.macros, &sets.functions),
        unlinked_entries: unlinked,
    })
}
