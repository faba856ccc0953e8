//! Manual page linkage probing.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::ToolConfig;
use crate::error::{AuditError, Result};

/// Checks whether a catalog entry resolves through the manual viewer.
pub trait LinkageProbe: Send + Sync {
    /// `Ok(false)` means the entry is unreachable. `Err` is reserved for a
    /// viewer that cannot be run at all.
    fn is_linked(&self, entry: &str) -> Result<bool>;
}

/// Invokes `man <entry>` and reads only the exit status.
pub struct ManProbe {
    tool: ToolConfig,
    cwd: PathBuf,
}

impl ManProbe {
    /// `cwd` is the tree root; the viewer runs from there.
    pub fn new(tool: ToolConfig, cwd: &Path) -> Self {
        Self {
            tool,
            cwd: cwd.to_path_buf(),
        }
    }
}

impl LinkageProbe for ManProbe {
    fn is_linked(&self, entry: &str) -> Result<bool> {
        let status = Command::new(&self.tool.command)
            .args(&self.tool.args)
            .arg(entry)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| AuditError::ToolUnavailable {
                tool: self.tool.command.clone(),
                source,
            })?;

        tracing::debug!(entry, code = ?status.code(), "probed manual page");
        Ok(status.success())
    }
}
