//! Audit configuration.
//!
//! Every field has a default matching the PMDK source tree, so an empty (or
//! absent) `doccheck.yaml` audits libpmemobj the same way the project's own
//! documentation checks do.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AuditError, Result};

/// Config file looked up in the tree root when `--config` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "doccheck.yaml";

/// Top-level audit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Header directory, relative to the tree root.
    pub headers_dir: PathBuf,
    /// Directory holding the non-debug shared objects.
    pub artifacts_dir: PathBuf,
    /// Generated documentation catalog.
    pub catalog_dir: PathBuf,

    /// A macro is public only if its name starts with one of these.
    pub macro_prefixes: Vec<String>,
    /// Object-like macros with this prefix are kept (debug-trace family).
    pub debug_prefix: String,
    /// Line marker announcing an inline function on the following line.
    pub inline_marker: String,
    /// Null-handle sentinel, never documented on its own.
    pub null_handle: String,
    /// `#define` lines containing any of these are skipped.
    pub excluded_body_markers: Vec<String>,

    /// Extension of shared objects in `artifacts_dir`.
    pub shared_object_extension: String,
    /// Glob patterns (file names) of artifacts that are not audited.
    pub excluded_artifacts: Vec<String>,
    /// Exported symbols ignored by exact name.
    pub excluded_symbols: Vec<String>,

    /// Manual section of API reference pages.
    pub catalog_section: String,
    /// Build-control file living among the catalog sources.
    pub build_control_file: String,
    /// Catalog entries documented as a group rather than per symbol.
    pub excluded_catalog_prefixes: Vec<String>,

    pub symbol_dump: ToolConfig,
    pub man_viewer: ToolConfig,
    /// Whether to probe catalog entries through the manual viewer.
    pub check_linkage: bool,
}

/// An external command and its leading arguments.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ToolConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolConfig {
    fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            args: Vec::new(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            headers_dir: PathBuf::from("src/include/libpmemobj"),
            artifacts_dir: PathBuf::from("src/nondebug"),
            catalog_dir: PathBuf::from("doc/generated"),
            macro_prefixes: ["POBJ_", "OID_", "TOID", "TX_", "DIRECT_", "D_"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            debug_prefix: "D_".to_string(),
            inline_marker: "static inline".to_string(),
            null_handle: "TOID_NULL".to_string(),
            excluded_body_markers: vec!["(id)".to_string(), "FLAG".to_string()],
            shared_object_extension: "so".to_string(),
            excluded_artifacts: vec!["libvmmalloc.so".to_string()],
            excluded_symbols: vec!["_pobj_debug_notice".to_string()],
            catalog_section: "3".to_string(),
            build_control_file: "Makefile".to_string(),
            excluded_catalog_prefixes: vec!["pmemobj_action".to_string()],
            symbol_dump: ToolConfig::new("nm"),
            man_viewer: ToolConfig::new("man"),
            check_linkage: true,
        }
    }
}

impl AuditConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
        Self::parse_str(&content).map_err(|source| AuditError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a configuration from YAML text. Missing fields take defaults.
    pub fn parse_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load `explicit` if given, else `<root>/doccheck.yaml` if present,
    /// else the defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::parse_file(path)?,
            None => {
                let candidate = root.join(DEFAULT_CONFIG_NAME);
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "using discovered config");
                    Self::parse_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would silently audit nothing.
    pub fn validate(&self) -> Result<()> {
        if self.macro_prefixes.iter().all(|p| p.is_empty()) {
            return Err(AuditError::InvalidConfig(
                "macro_prefixes must contain at least one non-empty prefix".to_string(),
            ));
        }
        if self.inline_marker.is_empty() {
            return Err(AuditError::InvalidConfig(
                "inline_marker must not be empty".to_string(),
            ));
        }
        if self.catalog_section.is_empty() {
            return Err(AuditError::InvalidConfig(
                "catalog_section must not be empty".to_string(),
            ));
        }
        for (name, tool) in [("symbol_dump", &self.symbol_dump), ("man_viewer", &self.man_viewer)] {
            if tool.command.trim().is_empty() {
                return Err(AuditError::InvalidConfig(format!(
                    "{}.command must not be empty",
                    name
                )));
            }
        }
        self.artifact_exclusions()?;
        Ok(())
    }

    /// Compile `excluded_artifacts` into a matcher over file names.
    pub fn artifact_exclusions(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_artifacts {
            let glob = Glob::new(pattern).map_err(|e| {
                AuditError::InvalidConfig(format!("excluded_artifacts {:?}: {}", pattern, e))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| AuditError::InvalidConfig(format!("excluded_artifacts: {}", e)))
    }

    /// Whether `name` starts with one of the public macro prefixes.
    pub fn has_macro_prefix(&self, name: &str) -> bool {
        self.macro_prefixes
            .iter()
            .any(|p| !p.is_empty() && name.starts_with(p.as_str()))
    }
}
