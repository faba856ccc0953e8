//! Extractors producing the three symbol sets of an audit.

mod catalog;
mod exports;
mod macros;

pub use catalog::{extract_catalog_entries, parse_catalog_name};
pub use exports::{extract_exported_functions, parse_symbol_table, NmDump, SymbolDump};
pub use macros::{
    extract_macros, scan_header, LookaheadState, MacroScan, SuspiciousLine, SuspicionReason,
};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{AuditError, Result};

/// List the non-directory entries directly inside `dir`, sorted by file name.
///
/// A missing directory is a configuration fault. `role` names the directory
/// in the resulting error.
pub(crate) fn list_entries(dir: &Path, role: &'static str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AuditError::MissingDirectory {
            path: dir.to_path_buf(),
            role,
        });
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| AuditError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        entries.push(entry.into_path());
    }

    Ok(entries)
}

/// File name of `path` as UTF-8, or None for names that are not.
pub(crate) fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
