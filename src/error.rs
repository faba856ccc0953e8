//! Errors that abort an audit run.
//!
//! Everything here is a configuration fault: the tree does not have the
//! expected layout, or an external tool could not be used. Findings are not
//! errors and never surface through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal faults raised while preparing or running an audit.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("expected directory {path:?} does not exist ({role})")]
    MissingDirectory { path: PathBuf, role: &'static str },

    #[error("{tool:?} could not be started: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool:?} failed on {path:?} with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        path: PathBuf,
        status: i32,
        stderr: String,
    },

    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("listing {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("parsing config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl AuditError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
