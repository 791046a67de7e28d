//! Markdown documentation for one analyzed file.
//!
//! Everything here is plain templating: a structural summary, a short
//! canned narrative built from metrics, detail listings, and the final
//! document assembly.

use chrono::{DateTime, Local};

use crate::analysis::{ClassInfo, FileInventory, Language};
use crate::detect::{recommend, Issue};
use crate::metrics::Metrics;

/// Placeholder shown for declarations without documentation.
fn no_doc_label(language: Language) -> &'static str {
    match language {
        Language::Python => "No docstring",
        Language::Java => "No Javadoc",
    }
}

/// A rendered Markdown document for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Name of the documented source file.
    pub filename: String,
    pub markdown: String,
}

/// "1 class", "3 classes".
fn count_noun(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// One-paragraph structural summary of an inventory.
pub fn summarize_structure(inventory: &FileInventory) -> String {
    match inventory.language {
        Language::Python => summarize_python(inventory),
        Language::Java => summarize_java(&inventory.classes),
    }
}

fn summarize_python(inventory: &FileInventory) -> String {
    let mut parts = Vec::new();
    if !inventory.classes.is_empty() {
        let names: Vec<_> = inventory.classes.iter().map(|c| c.name.as_str()).collect();
        parts.push(format!(
            "{}: {}",
            count_noun(names.len(), "class", "classes"),
            names.join(", ")
        ));
    }
    if !inventory.functions.is_empty() {
        let names: Vec<_> = inventory.functions.iter().map(|f| f.name.as_str()).collect();
        parts.push(format!(
            "{}: {}",
            count_noun(names.len(), "function", "functions"),
            names.join(", ")
        ));
    }

    if parts.is_empty() {
        "File without classes or functions.".to_string()
    } else {
        format!("File with {}.", parts.join("; "))
    }
}

fn summarize_java(classes: &[ClassInfo]) -> String {
    if classes.is_empty() {
        return "No Java classes found in the file.".to_string();
    }

    let mut summary = format!(
        "File with {} detected:\n",
        count_noun(classes.len(), "class", "classes")
    );
    for class in classes {
        summary.push_str(&format!(
            "- Class `{}` with {}.\n",
            class.name,
            count_noun(class.methods.len(), "method", "methods")
        ));
    }
    summary
}

/// Two to four canned sentences describing the file.
pub fn narrative(language: Language, metrics: &Metrics, issue_count: usize) -> String {
    let mut sentences = Vec::new();

    match language {
        Language::Python if metrics.classes == 0 && metrics.functions == 0 => {
            sentences.push("The Python file defines no classes or functions.".to_string());
        }
        Language::Python => sentences.push(format!(
            "The Python file defines {} and {}, with {} in total.",
            count_noun(metrics.classes, "class", "classes"),
            count_noun(metrics.functions, "free function", "free functions"),
            count_noun(metrics.methods, "method", "methods"),
        )),
        Language::Java if metrics.classes == 0 => {
            sentences.push("No Java classes were detected in this file.".to_string());
        }
        Language::Java => sentences.push(format!(
            "The Java file declares {} with {} in total.",
            count_noun(metrics.classes, "class", "classes"),
            count_noun(metrics.methods, "method", "methods"),
        )),
    }

    sentences.push(format!(
        "It spans {}.",
        count_noun(metrics.lines_of_code, "non-blank line", "non-blank lines")
    ));

    if let Some(percent) = metrics.documented_percent() {
        if metrics.undocumented == 0 {
            sentences.push(format!(
                "Every function and method carries a {}.",
                language.doc_term()
            ));
        } else {
            sentences.push(format!(
                "{} of {} functions and methods lack a {} ({}% documented).",
                metrics.undocumented,
                metrics.declarations,
                language.doc_term(),
                percent
            ));
        }
    }

    if issue_count == 0 {
        sentences.push("No style issues were detected.".to_string());
    } else {
        sentences.push(format!(
            "{} flagged; see the issues section below.",
            count_noun(issue_count, "potential issue was", "potential issues were")
        ));
    }

    sentences.join(" ")
}

/// First line of a documentation block, for compact listings.
fn first_line(doc: &str) -> &str {
    doc.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
}

/// Detail sections: a metrics list, one block per class, and a block of
/// free functions when there are any.
pub fn detail_blocks(inventory: &FileInventory, metrics: &Metrics) -> Vec<String> {
    let mut blocks = vec![metrics_block(metrics)];
    let missing = no_doc_label(inventory.language);

    for class in &inventory.classes {
        let mut block = format!("### Class: `{}`\n", class.name);
        if class.methods.is_empty() {
            block.push_str("- _No methods._\n");
        }
        for method in &class.methods {
            let doc = method
                .documentation
                .as_deref()
                .map(first_line)
                .filter(|d| !d.is_empty())
                .unwrap_or(missing);
            block.push_str(&format!("- Method: `{}` — {}\n", method.name, doc));
        }
        blocks.push(block);
    }

    if !inventory.functions.is_empty() {
        let mut block = String::from("### Functions\n");
        for function in &inventory.functions {
            block.push_str(&format!("**Function:** `{}`\n", function.name));
            let doc = function.documentation.as_deref().unwrap_or(missing);
            let doc = if doc.trim().is_empty() { missing } else { doc };
            for line in doc.lines() {
                block.push_str(&format!("> {}\n", line));
            }
            block.push('\n');
        }
        blocks.push(block.trim_end().to_string());
    }

    blocks
}

fn metrics_block(metrics: &Metrics) -> String {
    format!(
        "### Metrics\n\
         - Lines of code: {}\n\
         - Classes: {}\n\
         - Methods: {}\n\
         - Functions: {}\n\
         - Undocumented declarations: {}\n\
         - Oversized methods: {}\n",
        metrics.lines_of_code,
        metrics.classes,
        metrics.methods,
        metrics.functions,
        metrics.undocumented,
        metrics.oversized,
    )
}

/// Assemble the document, stamped with the current local time.
pub fn compose(
    filename: &str,
    summary: &str,
    narrative: &str,
    details: &[String],
    issues: &[Issue],
) -> Document {
    compose_at(filename, summary, narrative, details, issues, Local::now())
}

/// Assemble the document with an explicit timestamp.
///
/// The issues and recommendations sections are omitted when there are no
/// issues.
pub fn compose_at(
    filename: &str,
    summary: &str,
    narrative: &str,
    details: &[String],
    issues: &[Issue],
    generated_at: DateTime<Local>,
) -> Document {
    let mut md = String::new();

    md.push_str(&format!("# Documentation generated for `{}`\n\n", filename));
    md.push_str(&format!(
        "**Date:** {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    md.push_str("## General summary\n");
    md.push_str(summary.trim_end());
    md.push_str("\n\n");
    if !narrative.is_empty() {
        md.push_str(narrative);
        md.push_str("\n\n");
    }

    md.push_str("## Details\n");
    for block in details {
        md.push_str(block.trim_end());
        md.push_str("\n\n");
    }

    if !issues.is_empty() {
        md.push_str("## Issues\n");
        for issue in issues {
            md.push_str(&format!("- {}\n", issue.message));
        }
        md.push('\n');

        md.push_str("## Recommendations\n");
        for rec in recommend(issues) {
            md.push_str(&format!("- {}\n", rec.text));
        }
        md.push('\n');
    }

    Document {
        filename: filename.to_string(),
        markdown: md,
    }
}
