//! Exported function extraction from shared objects.

use std::path::Path;
use std::process::Command;

use super::{file_name_str, list_entries};
use crate::config::{AuditConfig, ToolConfig};
use crate::error::{AuditError, Result};
use crate::symbol::{Symbol, SymbolKind, SymbolSet};

/// Symbol type letter of a defined global symbol in the text section.
const GLOBAL_TEXT: &str = "T";

/// Produces the textual symbol table of a compiled artifact.
pub trait SymbolDump: Send + Sync {
    /// Raw symbol table of `artifact`, one symbol per line in `nm` format.
    fn dump(&self, artifact: &Path) -> Result<String>;
}

/// Runs the platform `nm` (or whatever `ToolConfig` names).
pub struct NmDump {
    tool: ToolConfig,
}

impl NmDump {
    pub fn new(tool: ToolConfig) -> Self {
        Self { tool }
    }
}

impl SymbolDump for NmDump {
    fn dump(&self, artifact: &Path) -> Result<String> {
        tracing::debug!(tool = %self.tool.command, artifact = %artifact.display(), "dumping symbols");

        let output = Command::new(&self.tool.command)
            .args(&self.tool.args)
            .arg(artifact)
            .output()
            .map_err(|source| AuditError::ToolUnavailable {
                tool: self.tool.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AuditError::ToolFailed {
                tool: self.tool.command.clone(),
                path: artifact.to_path_buf(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Collect exported functions from every shared object in `dir`.
///
/// Returns the pooled set and the number of artifacts dumped.
pub fn extract_exported_functions(
    dir: &Path,
    config: &AuditConfig,
    dump: &dyn SymbolDump,
) -> Result<(SymbolSet, usize)> {
    let exclusions = config.artifact_exclusions()?;
    let mut functions = SymbolSet::new();
    let mut dumped = 0;

    for path in list_entries(dir, "shared object directory")? {
        let Some(name) = file_name_str(&path) else {
            continue;
        };
        let is_shared_object = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == config.shared_object_extension)
            .unwrap_or(false);
        if !is_shared_object {
            continue;
        }
        if exclusions.is_match(name) {
            tracing::debug!(artifact = name, "artifact excluded");
            continue;
        }

        let table = dump.dump(&path)?;
        let before = functions.len();
        functions.extend(
            parse_symbol_table(&table, &config.excluded_symbols)
                .into_iter()
                .map(|n| Symbol::new(n, SymbolKind::Function)),
        );
        dumped += 1;

        tracing::debug!(artifact = name, new_functions = functions.len() - before, "dumped artifact");
    }

    if dumped == 0 {
        tracing::warn!(dir = %dir.display(), "no shared objects found");
    }
    tracing::info!(artifacts = dumped, functions = functions.len(), "symbol extraction done");
    Ok((functions, dumped))
}

/// Names of defined global text symbols in `nm` output, lowercased.
///
/// Lines look like `0000000000012340 T pmemobj_open`; anything else is
/// skipped. A version suffix (`@@LIBPMEMOBJ_1.0`) is dropped.
pub fn parse_symbol_table(table: &str, excluded: &[String]) -> Vec<String> {
    table
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let (_address, kind, name) = (fields.next()?, fields.next()?, fields.next()?);
            if kind != GLOBAL_TEXT || fields.next().is_some() {
                return None;
            }
            let name = name.split('@').next().unwrap_or(name);
            if name.is_empty() || excluded.iter().any(|e| e == name) {
                return None;
            }
            Some(name.to_lowercase())
        })
        .collect()
}
