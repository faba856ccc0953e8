//! Output formatting for audit results.
//!
//! - Pretty: colored terminal output, one block per check
//! - JSON: the whole [`AuditReport`] for CI tooling
//! - Assertions: [`assert_complete`] for running the checks as tests

use colored::*;
use serde::{Deserialize, Serialize};

use crate::audit::AuditReport;
use crate::extract::SuspiciousLine;
use crate::reconcile::MissList;

/// JSON document written by `--format json`.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub passed: bool,
    pub total_missing: usize,
    #[serde(flatten)]
    pub report: AuditReport,
}

impl JsonReport {
    pub fn new(report: &AuditReport) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            passed: report.passed(),
            total_missing: report.findings.total_missing(),
            report: report.clone(),
        }
    }
}

/// Write results in JSON format.
pub fn write_json(report: &AuditReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport::new(report))?;
    println!("{}", json);
    Ok(())
}

/// Plain-text rendering of one miss-list: header line, then one name per line.
pub fn format_miss_list(list: &MissList) -> String {
    let mut text = format!("{}:", list.check.header());
    for symbol in &list.symbols {
        text.push('\n');
        text.push_str(&symbol.name);
    }
    text
}

/// Panic unless `list` is empty, listing the missing names.
///
/// Meant for test harnesses: the failure message is the same block the
/// CLI prints.
#[track_caller]
pub fn assert_complete(list: &MissList) {
    assert!(
        list.is_empty(),
        "{} missing\n{}",
        list.len(),
        format_miss_list(list)
    );
}

/// Write results in pretty (human-readable) format.
pub fn write_pretty(report: &AuditReport, verbose: bool) {
    println!();
    print!("  ");
    print!("{}", "doccheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Tree:     ".dimmed());
    println!("{}", report.root);
    print!("  {}", "Scanned:  ".dimmed());
    println!(
        "{} headers, {} shared objects, {} catalog entries",
        report.stats.headers_scanned, report.stats.artifacts_dumped, report.stats.catalog_entries
    );
    print!("  {}", "Symbols:  ".dimmed());
    println!(
        "{} macros, {} functions",
        report.stats.macros, report.stats.functions
    );
    println!();

    for list in report.findings.lists() {
        write_miss_list(list);
        println!();
    }

    if verbose && !report.suspicious.is_empty() {
        write_suspicious(&report.suspicious);
        println!();
    }

    write_final_status(report);
    println!();
}

fn write_miss_list(list: &MissList) {
    if list.skipped {
        println!("  {} {}", list.check.header().bold(), "(skipped)".dimmed());
        return;
    }

    let count = if list.is_empty() {
        list.len().to_string().green()
    } else {
        list.len().to_string().red()
    };
    println!("  {} ({}):", list.check.header().bold(), count);

    for symbol in &list.symbols {
        println!("    {:<40} {}", symbol.name, symbol.kind.as_str().dimmed());
    }
}

fn write_suspicious(lines: &[SuspiciousLine]) {
    println!("  {} ({}):", "Suspicious header lines".yellow(), lines.len());
    for s in lines {
        print!("    {}", s.file.blue());
        print!("{}", format!(":{}", s.line).dimmed());
        println!("  {}", s.reason.to_string().dimmed());
        println!("            {}", s.text);
    }
}

fn write_final_status(report: &AuditReport) {
    if report.passed() {
        println!("  {}", "✓ PASS  fully documented and linked".green());
    } else {
        println!(
            "  {}  {} symbol(s) need attention",
            "✗ FAIL".red(),
            report.findings.total_missing()
        );
    }
}
