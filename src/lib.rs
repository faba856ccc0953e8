//! doccheck - documentation completeness audit for libpmemobj.
//!
//! Three symbol sets are extracted from a built PMDK tree and reconciled:
//!
//! - public macros, pattern-matched from `src/include/libpmemobj/*.h`
//! - exported functions, read from `nm` output for `src/nondebug/*.so`
//! - catalog entries, listed from `doc/generated/*.3`
//!
//! Four checks compare them: undocumented macros, undocumented functions,
//! orphan catalog entries, and catalog entries `man` cannot resolve.
//!
//! # Architecture
//!
//! - `extract`: the three extractors
//! - `probe`: manual page linkage probing
//! - `reconcile`: the four set-difference checks
//! - `audit`: runs extraction and reconciliation for one tree
//! - `report`: output formatting (text, JSON, assertions)
//! - `config`: YAML configuration with PMDK defaults

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod probe;
pub mod reconcile;
pub mod report;
pub mod symbol;

pub use audit::{AuditReport, Auditor, ExtractionStats};
pub use config::{AuditConfig, ToolConfig};
pub use error::AuditError;
pub use extract::{LookaheadState, MacroScan, NmDump, SuspiciousLine, SymbolDump};
pub use probe::{LinkageProbe, ManProbe};
pub use reconcile::{Check, Findings, MissList, SymbolSets};
pub use symbol::{Symbol, SymbolKind, SymbolSet};
