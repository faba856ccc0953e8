//! Generated documentation catalog listing.

use std::path::Path;

use super::{file_name_str, list_entries};
use crate::config::AuditConfig;
use crate::error::Result;
use crate::symbol::{Symbol, SymbolKind, SymbolSet};

/// Split a catalog file name into its basename and manual section.
///
/// `pmemobj_open.3` and `pmemobj_open.3.md` both give `("pmemobj_open", "3")`.
/// Names without a dot have no section.
pub fn parse_catalog_name(file_name: &str) -> Option<(&str, &str)> {
    let mut parts = file_name.split('.');
    let basename = parts.next()?;
    let section = parts.next()?;
    Some((basename, section))
}

/// Entry name for `file_name`, if it documents a single API symbol.
fn catalog_entry<'a>(file_name: &'a str, config: &AuditConfig) -> Option<&'a str> {
    if file_name == config.build_control_file {
        return None;
    }
    let (basename, section) = parse_catalog_name(file_name)?;
    if basename.is_empty() || section != config.catalog_section {
        return None;
    }
    if config
        .excluded_catalog_prefixes
        .iter()
        .any(|p| !p.is_empty() && basename.starts_with(p.as_str()))
    {
        return None;
    }
    Some(basename)
}

/// List the catalog entries in `dir`.
pub fn extract_catalog_entries(dir: &Path, config: &AuditConfig) -> Result<SymbolSet> {
    let mut entries = SymbolSet::new();

    for path in list_entries(dir, "generated documentation directory")? {
        if let Some(name) = file_name_str(&path).and_then(|n| catalog_entry(n, config)) {
            entries.insert(Symbol::new(name, SymbolKind::CatalogEntry));
        }
    }

    tracing::info!(entries = entries.len(), "catalog listing done");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use tempfile::TempDir;

    #[test]
    fn test_parse_catalog_name() {
        assert_eq!(parse_catalog_name("pmemobj_open.3"), Some(("pmemobj_open", "3")));
        assert_eq!(parse_catalog_name("tx_begin.3.md"), Some(("tx_begin", "3")));
        assert_eq!(parse_catalog_name(".3"), Some(("", "3")));
        assert_eq!(parse_catalog_name("Makefile"), None);
    }

    #[test]
    fn test_catalog_entry_filters() {
        let config = AuditConfig::default();
        assert_eq!(catalog_entry("pmemobj_open.3", &config), Some("pmemobj_open"));
        assert_eq!(catalog_entry("libpmemobj.7", &config), None);
        assert_eq!(catalog_entry("pmemobj_open.3p", &config), None);
        assert_eq!(catalog_entry(".3", &config), None);
        assert_eq!(catalog_entry("Makefile", &config), None);
        assert_eq!(catalog_entry("pmemobj_action.3", &config), None);
        assert_eq!(catalog_entry("pmemobj_action_publish.3", &config), None);
        assert_eq!(catalog_entry("pmemobj_reserve.3", &config), Some("pmemobj_reserve"));
    }

    #[test]
    fn test_extract_catalog_entries() {
        let temp = TempDir::new().unwrap();
        for name in [
            "tx_begin.3",
            "pmemobj_open.3",
            "libpmemobj.7",
            "Makefile",
            "pmemobj_action.3",
            "TOID_DECLARE.3",
        ] {
            std::fs::write(temp.path().join(name), "").unwrap();
        }
        std::fs::create_dir(temp.path().join("subdir.3")).unwrap();

        let entries = extract_catalog_entries(temp.path(), &AuditConfig::default()).unwrap();
        assert_eq!(entries.names(), vec!["TOID_DECLARE", "pmemobj_open", "tx_begin"]);
        assert!(entries.contains("toid_declare"));
    }

    #[test]
    fn test_extract_missing_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = extract_catalog_entries(&temp.path().join("generated"), &AuditConfig::default())
            .unwrap_err();
        assert!(matches!(err, AuditError::MissingDirectory { .. }));
    }
}
