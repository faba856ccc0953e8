//! Command-line interface for doccheck.

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::audit::Auditor;
use crate::config::AuditConfig;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Audit libpmemobj documentation completeness.
///
/// Compares public macros from the headers, exported functions from the
/// built shared objects, and the generated man page catalog, and checks
/// that every catalog entry resolves through `man`.
#[derive(Parser)]
#[command(name = "doccheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root of the library source/build tree
    pub root: PathBuf,

    /// Path to config YAML (default: <ROOT>/doccheck.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Do not probe catalog entries through the manual viewer
    #[arg(long)]
    pub skip_linkage: bool,

    /// Exit 0 even when documentation is missing
    #[arg(long)]
    pub no_fail: bool,

    /// Log debug detail and list suspicious header lines
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

fn probe_progress(format: OutputFormat) -> ProgressBar {
    if format != OutputFormat::Pretty || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("  probing man pages {bar:30} {pos}/{len}") {
        bar.set_style(style);
    }
    bar
}

/// Run an audit and print the report.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let root = match cli.root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access tree root {:?}: {}", cli.root, e);
            return Ok(EXIT_ERROR);
        }
    };

    let config = AuditConfig::load(&root, cli.config.as_deref())?;

    let report = Auditor::new(&root, config)
        .skip_linkage(cli.skip_linkage)
        .progress(probe_progress(cli.format))
        .run()?;

    match cli.format {
        OutputFormat::Json => report::write_json(&report)?,
        OutputFormat::Pretty => report::write_pretty(&report, cli.verbose),
    }

    if report.passed() || cli.no_fail {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "doccheck",
            "/opt/pmdk",
            "--format",
            "json",
            "--skip-linkage",
            "--no-fail",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("/opt/pmdk"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.skip_linkage);
        assert!(cli.no_fail);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_root_is_required() {
        assert!(Cli::try_parse_from(["doccheck"]).is_err());
    }

    #[test]
    fn test_missing_root_exit_code() {
        let cli = Cli::try_parse_from(["doccheck", "/nonexistent/doccheck/tree"]).unwrap();
        assert_eq!(run(&cli).unwrap(), EXIT_ERROR);
    }

    /// Tree with one stale catalog entry and no artifacts.
    fn tree_with_orphan() -> tempfile::TempDir {
        let temp = tempfile::TempDir::new().unwrap();
        for sub in ["src/include/libpmemobj", "src/nondebug", "doc/generated"] {
            std::fs::create_dir_all(temp.path().join(sub)).unwrap();
        }
        std::fs::write(temp.path().join("doc/generated/stale_fn.3"), ".TH\n").unwrap();
        std::fs::write(
            temp.path().join("doccheck.yaml"),
            "symbol_dump: {command: \"true\"}\ncheck_linkage: false\n",
        )
        .unwrap();
        temp
    }

    #[test]
    fn test_findings_exit_code() {
        let tree = tree_with_orphan();
        let root = tree.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["doccheck", root, "--format", "json"]).unwrap();
        assert_eq!(run(&cli).unwrap(), EXIT_FAILED);
    }

    #[test]
    fn test_no_fail_exit_code() {
        let tree = tree_with_orphan();
        let root = tree.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["doccheck", root, "--format", "json", "--no-fail"]).unwrap();
        assert_eq!(run(&cli).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn test_clean_tree_exit_code() {
        let tree = tree_with_orphan();
        std::fs::remove_file(tree.path().join("doc/generated/stale_fn.3")).unwrap();
        let root = tree.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["doccheck", root, "--format", "json"]).unwrap();
        assert_eq!(run(&cli).unwrap(), EXIT_SUCCESS);
    }
}
