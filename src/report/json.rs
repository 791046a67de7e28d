//! Machine-readable JSON output.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::pipeline::{BatchOutcome, RenderedFile};

/// Top-level JSON report for a batch.
#[derive(Serialize)]
pub struct JsonReport {
    pub version: String,
    pub source: String,
    pub output_dir: String,
    pub files: Vec<JsonFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<JsonFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<String>,
}

#[derive(Serialize)]
pub struct JsonFile {
    pub file: String,
    pub language: String,
    pub summary: String,
    pub metrics: BTreeMap<String, usize>,
    pub issues: Vec<JsonIssue>,
    pub recommendations: Vec<String>,
}

#[derive(Serialize)]
pub struct JsonIssue {
    pub category: String,
    pub target: String,
    pub line: usize,
    pub message: String,
}

#[derive(Serialize)]
pub struct JsonFailure {
    pub file: String,
    pub reason: String,
}

fn file_to_json(rendered: &RenderedFile) -> JsonFile {
    let analysis = &rendered.analysis;
    JsonFile {
        file: analysis.filename.clone(),
        language: analysis.language().to_string(),
        summary: analysis.summary(),
        metrics: analysis
            .metrics
            .as_map()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        issues: analysis
            .issues
            .iter()
            .map(|i| JsonIssue {
                category: i.category.as_str().to_string(),
                target: i.target.clone(),
                line: i.line,
                message: i.message.clone(),
            })
            .collect(),
        recommendations: analysis
            .recommendations()
            .into_iter()
            .map(|r| r.text.to_string())
            .collect(),
    }
}

/// Build the JSON report structure.
pub fn build_json(
    source: &str,
    output_dir: &str,
    outcome: &BatchOutcome,
    written: &[String],
) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: source.to_string(),
        output_dir: output_dir.to_string(),
        files: outcome.outputs.iter().map(file_to_json).collect(),
        failures: outcome
            .failures
            .iter()
            .map(|f| JsonFailure {
                file: f.filename.clone(),
                reason: f.reason.clone(),
            })
            .collect(),
        written: written.to_vec(),
    }
}

/// Write results in JSON format to stdout.
pub fn write_json(
    source: &str,
    output_dir: &str,
    outcome: &BatchOutcome,
    written: &[String],
) -> anyhow::Result<()> {
    let report = build_json(source, output_dir, outcome, written);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}
