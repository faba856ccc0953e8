//! Public macro extraction from C headers.
//!
//! Only declaration-line prefixes are matched; the headers are never parsed
//! as C. Four declaration forms are recognized:
//!
//! - `#define NAME(args) ...` - function-like macro, name kept without params
//! - `#define NAME\` - macro whose definition continues on the next line
//! - `#define D_NAME ...` - object-like macro of the debug-trace family
//! - `static inline` followed by `NAME(...)` on the next line
//!
//! Everything else is skipped. Lines that look like they were meant to be a
//! declaration but use an unexpected layout are collected as
//! [`SuspiciousLine`]s so the prefix list can be maintained.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{file_name_str, list_entries};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::symbol::{Symbol, SymbolKind, SymbolSet};

const DEFINE_DIRECTIVE: &str = "#define";
const BLANKS: &[char] = &[' ', '\t'];

lazy_static! {
    /// A define directive in any layout, capturing the macro name.
    static ref LOOSE_DEFINE: Regex =
        Regex::new(r"^\s*#\s*define\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();

    static ref IDENTIFIER: Regex = Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap();
}

/// Lookahead for names declared on the line after the inline marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookaheadState {
    #[default]
    Idle,
    AwaitingName,
}

/// Why a line was flagged as suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionReason {
    /// `#  define` or indented define of a prefixed name.
    NonCanonicalDefine,
    /// Line after the inline marker mentions a prefixed name, but not first.
    InlineNameNotAtLineStart,
    /// Line after the inline marker starts with a prefixed name but has no `(`.
    InlineNameWithoutParens,
}

impl std::fmt::Display for SuspicionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SuspicionReason::NonCanonicalDefine => "define with unexpected layout",
            SuspicionReason::InlineNameNotAtLineStart => "inline name not at line start",
            SuspicionReason::InlineNameWithoutParens => "inline name without parameter list",
        };
        write!(f, "{}", text)
    }
}

/// A header line carrying a recognized prefix in an unrecognized position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousLine {
    pub file: String,
    pub line: usize,
    pub text: String,
    pub reason: SuspicionReason,
}

/// Result of scanning a header directory.
#[derive(Debug, Clone, Default)]
pub struct MacroScan {
    pub macros: SymbolSet,
    pub suspicious: Vec<SuspiciousLine>,
    pub files_scanned: usize,
}

/// Scan every file in `dir` and pool the public macro names.
pub fn extract_macros(dir: &Path, config: &AuditConfig) -> Result<MacroScan> {
    let mut scan = MacroScan::default();

    for path in list_entries(dir, "header directory")? {
        let bytes = std::fs::read(&path).map_err(|e| AuditError::io(&path, e))?;
        let source = String::from_utf8_lossy(&bytes);
        let label = file_name_str(&path)
            .map(str::to_string)
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let before = scan.macros.len();
        scan_header(&source, &label, config, &mut scan);
        scan.files_scanned += 1;

        tracing::debug!(
            file = %label,
            new_macros = scan.macros.len() - before,
            "scanned header"
        );
    }

    tracing::info!(
        headers = scan.files_scanned,
        macros = scan.macros.len(),
        suspicious = scan.suspicious.len(),
        "macro extraction done"
    );
    Ok(scan)
}

/// Scan one header's text, adding names and diagnostics to `scan`.
pub fn scan_header(source: &str, file: &str, config: &AuditConfig, scan: &mut MacroScan) {
    let mut state = LookaheadState::Idle;

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;

        if line.starts_with(config.inline_marker.as_str()) {
            state = LookaheadState::AwaitingName;
            continue;
        }

        if state == LookaheadState::AwaitingName {
            state = LookaheadState::Idle;
            match inline_name(line, config) {
                Ok(Some(name)) => {
                    scan.macros.insert(Symbol::new(name.to_lowercase(), SymbolKind::Macro));
                }
                Ok(None) => {}
                Err(reason) => flag(scan, file, line_number, line, reason),
            }
            continue;
        }

        match define_name(line) {
            Some(name) => {
                if let Some(kept) = classify_define(line, name, config) {
                    scan.macros.insert(Symbol::new(kept.to_lowercase(), SymbolKind::Macro));
                }
            }
            None => {
                if let Some(caps) = LOOSE_DEFINE.captures(line) {
                    if config.has_macro_prefix(&caps[1]) {
                        flag(scan, file, line_number, line, SuspicionReason::NonCanonicalDefine);
                    }
                }
            }
        }
    }
}

/// Name declared on the line following the inline marker.
///
/// `Ok(None)` means the line is simply not a public declaration.
fn inline_name<'a>(
    line: &'a str,
    config: &AuditConfig,
) -> std::result::Result<Option<&'a str>, SuspicionReason> {
    if config.has_macro_prefix(line) {
        return match line.find('(') {
            Some(paren) => Ok(Some(line[..paren].trim_end())),
            None => Err(SuspicionReason::InlineNameWithoutParens),
        };
    }

    let mentions_prefix = IDENTIFIER
        .find_iter(line)
        .any(|m| config.has_macro_prefix(m.as_str()));
    if mentions_prefix {
        Err(SuspicionReason::InlineNameNotAtLineStart)
    } else {
        Ok(None)
    }
}

/// Macro name token of a canonical `#define NAME...` line.
fn define_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DEFINE_DIRECTIVE)?;
    if !rest.starts_with(BLANKS) {
        return None;
    }
    rest.trim_start_matches(BLANKS)
        .split(BLANKS)
        .next()
        .filter(|name| !name.is_empty())
}

/// Decide which part of a define's name token, if any, is a public macro.
fn classify_define<'a>(line: &str, name: &'a str, config: &AuditConfig) -> Option<&'a str> {
    if !config.has_macro_prefix(name) {
        return None;
    }
    if config
        .excluded_body_markers
        .iter()
        .any(|marker| !marker.is_empty() && line.contains(marker.as_str()))
    {
        return None;
    }

    let is_null_handle = !config.null_handle.is_empty() && name.starts_with(config.null_handle.as_str());
    if let Some(paren) = name.find('(') {
        if !is_null_handle {
            return Some(&name[..paren]);
        }
    }
    if let Some(backslash) = name.find('\\') {
        return Some(&name[..backslash]);
    }
    if !config.debug_prefix.is_empty() && name.starts_with(config.debug_prefix.as_str()) {
        return Some(name);
    }
    None
}

fn flag(scan: &mut MacroScan, file: &str, line: usize, text: &str, reason: SuspicionReason) {
    tracing::debug!(file, line, %reason, text = text.trim(), "suspicious header line");
    scan.suspicious.push(SuspiciousLine {
        file: file.to_string(),
        line,
        text: text.trim().to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scan(source: &str) -> MacroScan {
        let mut scan = MacroScan::default();
        scan_header(source, "test.h", &AuditConfig::default(), &mut scan);
        scan
    }

    fn names(source: &str) -> Vec<String> {
        scan(source)
            .macros
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_function_like_define() {
        assert_eq!(names("#define FOO_BAR(oid) (x)\n#define POBJ_NEW(pop, o, t) y\n"), vec!["pobj_new"]);
        assert_eq!(names("#define TX_BEGIN(pop) _POBJ_TX_BEGIN(pop)"), vec!["tx_begin"]);
    }

    #[test]
    fn test_tab_separated_define() {
        assert_eq!(names("#define\tTOID_TYPE_NUM(t)\t(_toid_type_num(t))"), vec!["toid_type_num"]);
    }

    #[test]
    fn test_continuation_define() {
        assert_eq!(names("#define TX_ONABORT\\\n\tif (1)"), vec!["tx_onabort"]);
    }

    #[test]
    fn test_debug_prefix_object_like() {
        assert_eq!(names("#define D_RW_FLAT _pobj_direct"), vec!["d_rw_flat"]);
        // object-like macros of other families are constants
        assert!(names("#define POBJ_MAX_ALLOC_SIZE 100").is_empty());
    }

    #[test]
    fn test_exclusions() {
        let source = "\
#define TOID_NULL(t) ((TOID(t))OID_NULL)
#define TOID_VALID(o) (x(id) == 1)
#define POBJ_XALLOC_ZERO_FLAG (1 << 0)
#define OID_IS_NULL(o) ((o).off == 0)
";
        assert_eq!(names(source), vec!["oid_is_null"]);
    }

    #[test]
    fn test_unprefixed_define_ignored() {
        assert!(names("#define pmemobj_alloc_usable_size(x) y\n#define LIBPMEMOBJ_H 1").is_empty());
    }

    #[test]
    fn test_inline_lookahead() {
        let source = "\
static inline PMEMoid
POBJ_ROOT_FUNC(PMEMobjpool *pop)
{
";
        assert_eq!(names(source), vec!["pobj_root_func"]);

        let source = "\
static inline PMEMoid
pmemobj_helper(PMEMobjpool *pop)
";
        assert!(names(source).is_empty());
    }

    #[test]
    fn test_inline_name_with_space_before_parens() {
        let source = "\
static inline PMEMoid
POBJ_ROOT (PMEMobjpool *pop)
";
        assert_eq!(names(source), vec!["pobj_root"]);
    }

    #[test]
    fn test_lookahead_resets_after_one_line() {
        let source = "\
static inline void
other_line(void)
TX_LATE(x)
";
        assert!(names(source).is_empty());
    }

    #[test]
    fn test_line_after_marker_is_not_a_define() {
        let source = "\
static inline
#define TX_ADD(o) x
#define TX_SET(o) y
";
        assert_eq!(names(source), vec!["tx_set"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let source = "#define TX_ADD(o) x\n#define TX_ADD(o, f) y\n";
        assert_eq!(names(source), vec!["tx_add"]);
    }

    #[test]
    fn test_suspicious_lines() {
        let source = "\
#  define TX_WEIRD(x) x
  #define POBJ_INDENTED(x) x
# define unrelated_thing 1
static inline
  TX_INDENTED(void)
static inline
POBJ_NO_PARENS
";
        let result = scan(source);
        assert!(result.macros.is_empty());
        let reasons: Vec<_> = result.suspicious.iter().map(|s| (s.line, s.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (1, SuspicionReason::NonCanonicalDefine),
                (2, SuspicionReason::NonCanonicalDefine),
                (5, SuspicionReason::InlineNameNotAtLineStart),
                (7, SuspicionReason::InlineNameWithoutParens),
            ]
        );
        assert_eq!(result.suspicious[0].text, "#  define TX_WEIRD(x) x");
    }

    #[test]
    fn test_extract_pools_headers() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.h"), "#define TX_ADD(o) x\n#define D_RW(o) y\n").unwrap();
        std::fs::write(temp.path().join("b.h"), "#define TX_ADD(o) x\n#define OID_EQUALS(a, b) z\n").unwrap();

        let result = extract_macros(temp.path(), &AuditConfig::default()).unwrap();
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.macros.names(), vec!["tx_add", "d_rw", "oid_equals"]);
    }

    #[test]
    fn test_extract_missing_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = extract_macros(&temp.path().join("missing"), &AuditConfig::default()).unwrap_err();
        assert!(matches!(err, AuditError::MissingDirectory { .. }));
    }
}
