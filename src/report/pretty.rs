//! Human-readable terminal output.

use colored::*;
use std::path::{Path, PathBuf};

use crate::detect::{Issue, IssueCategory};
use crate::pipeline::{BatchOutcome, FileFailure, RenderedFile};

/// Write a batch summary in pretty format.
pub fn write_pretty(source: &str, out_dir: &Path, outcome: &BatchOutcome, written: &[PathBuf]) {
    // Header
    println!();
    print!("  ");
    print!("{}", "legacydoc".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Source:  ".dimmed());
    println!("{}", source);
    print!("  {}", "Output:  ".dimmed());
    println!("{}", out_dir.display());
    println!();

    for rendered in &outcome.outputs {
        write_file(rendered);
        println!();
    }

    if !outcome.failures.is_empty() {
        write_failures(&outcome.failures);
        println!();
    }

    write_final_status(outcome, written.len());
    println!();
}

fn write_file(rendered: &RenderedFile) {
    let analysis = &rendered.analysis;
    let metrics = &analysis.metrics;

    print!("  {}", rendered.filename().blue().bold());
    println!(" {}", format!("({})", analysis.language()).dimmed());

    for line in analysis.summary().lines() {
        println!("    {}", line);
    }
    println!(
        "    {}",
        format!(
            "{} lines, {} classes, {} methods, {} functions",
            metrics.lines_of_code, metrics.classes, metrics.methods, metrics.functions
        )
        .dimmed()
    );

    if analysis.issues.is_empty() {
        println!("    {}", "✓ no issues".green());
        return;
    }

    println!();
    for issue in &analysis.issues {
        write_issue(issue);
    }
}

fn write_issue(issue: &Issue) {
    let tag = match issue.category {
        IssueCategory::MissingDoc => "DOC  ".yellow(),
        IssueCategory::EmptyClass => "EMPTY".blue(),
        IssueCategory::OversizedMethod => "LONG ".red(),
    };
    print!("    {} ", tag);
    if issue.line > 0 {
        print!("{} ", format!("{:>4}", issue.line).dimmed());
    }
    println!("{}", issue.message);
}

fn write_failures(failures: &[FileFailure]) {
    println!("  {} ({}):", "Failed".red().bold(), failures.len());
    for failure in failures {
        print!("    {}", failure.filename.blue());
        println!("  {}", failure.reason);
    }
}

fn write_final_status(outcome: &BatchOutcome, written: usize) {
    let issues: usize = outcome.outputs.iter().map(|r| r.analysis.issues.len()).sum();

    if outcome.failures.is_empty() {
        print!("  {}", "✓ DONE".green());
    } else {
        print!("  {}", "✗ PARTIAL".red());
    }
    print!(
        "  {} documented",
        outcome.outputs.len().to_string().bold()
    );
    if !outcome.failures.is_empty() {
        print!(", {} failed", outcome.failures.len().to_string().red());
    }
    print!(", {} issues", issues);
    println!("  {}", format!("({} files written)", written).dimmed());
}
