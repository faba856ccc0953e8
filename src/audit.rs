//! Audit orchestration: extraction followed by reconciliation.

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::extract::{
    extract_catalog_entries, extract_exported_functions, extract_macros, NmDump, SuspiciousLine,
    SymbolDump,
};
use crate::probe::{LinkageProbe, ManProbe};
use crate::reconcile::{reconcile, Findings, SymbolSets};

/// Sizes of the extracted sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub headers_scanned: usize,
    pub artifacts_dumped: usize,
    pub macros: usize,
    pub functions: usize,
    pub catalog_entries: usize,
}

/// Everything one audit run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub root: String,
    pub findings: Findings,
    pub stats: ExtractionStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suspicious: Vec<SuspiciousLine>,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.findings.is_clean()
    }
}

/// Runs all extractors and checks against one source tree.
pub struct Auditor {
    root: PathBuf,
    config: AuditConfig,
    skip_linkage: bool,
    symbol_dump: Option<Box<dyn SymbolDump>>,
    probe: Option<Box<dyn LinkageProbe>>,
    progress: ProgressBar,
}

impl Auditor {
    pub fn new<P: AsRef<Path>>(root: P, config: AuditConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
            skip_linkage: false,
            symbol_dump: None,
            probe: None,
            progress: ProgressBar::hidden(),
        }
    }

    /// Skip manual page probing regardless of the config.
    pub fn skip_linkage(mut self, skip: bool) -> Self {
        self.skip_linkage = skip;
        self
    }

    /// Replace the configured `nm` invocation.
    pub fn symbol_dump(mut self, dump: Box<dyn SymbolDump>) -> Self {
        self.symbol_dump = Some(dump);
        self
    }

    /// Replace the configured `man` invocation.
    pub fn linkage_probe(mut self, probe: Box<dyn LinkageProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Progress bar advanced once per probed catalog entry.
    pub fn progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extract the three sets and reconcile them.
    ///
    /// Any configuration fault aborts the whole run; there is no partial report.
    pub fn run(&self) -> Result<AuditReport> {
        if !self.root.is_dir() {
            return Err(AuditError::MissingDirectory {
                path: self.root.clone(),
                role: "tree root",
            });
        }

        let macro_scan = extract_macros(&self.root.join(&self.config.headers_dir), &self.config)?;

        let default_dump;
        let dump: &dyn SymbolDump = match &self.symbol_dump {
            Some(d) => &**d,
            None => {
                default_dump = NmDump::new(self.config.symbol_dump.clone());
                &default_dump
            }
        };
        let (functions, artifacts_dumped) = extract_exported_functions(
            &self.root.join(&self.config.artifacts_dir),
            &self.config,
            dump,
        )?;

        let catalog = extract_catalog_entries(&self.root.join(&self.config.catalog_dir), &self.config)?;

        let sets = SymbolSets {
            macros: macro_scan.macros,
            functions,
            catalog,
        };

        let default_probe;
        let probe: Option<&dyn LinkageProbe> = if self.skip_linkage || !self.config.check_linkage {
            tracing::info!("manual page linkage check skipped");
            None
        } else {
            match &self.probe {
                Some(p) => Some(&**p),
                None => {
                    default_probe = ManProbe::new(self.config.man_viewer.clone(), &self.root);
                    Some(&default_probe as &dyn LinkageProbe)
                }
            }
        };

        if probe.is_some() {
            self.progress.set_length(sets.catalog.len() as u64);
        }
        let findings = reconcile(&sets, probe, &self.progress)?;
        self.progress.finish_and_clear();

        tracing::info!(missing = findings.total_missing(), "reconciliation done");

        Ok(AuditReport {
            root: self.root.to_string_lossy().to_string(),
            stats: ExtractionStats {
                headers_scanned: macro_scan.files_scanned,
                artifacts_dumped,
                macros: sets.macros.len(),
                functions: sets.functions.len(),
                catalog_entries: sets.catalog.len(),
            },
            findings,
            suspicious: macro_scan.suspicious,
        })
    }
}
