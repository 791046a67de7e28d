//! Input loading, batch processing, and output writing.
//!
//! ```text
//! path ──► load_inputs ──► [SourceInput] ──► process_batch ──► BatchOutcome
//!          (file, dir,                       analyze, compose,    │
//!           or .zip)                         render, annotate     ▼
//!                                                          write_outputs
//!                                                      (per-file + archive)
//! ```
//!
//! Files are processed one at a time. A failure in one file is recorded in
//! the outcome and never affects the outputs of the others.

use std::collections::BTreeSet;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use crate::analysis::{extract_named, get_analyzer_for_extension, FileInventory, Language};
use crate::annotate::annotate_python;
use crate::config::{Config, OutputFormat};
use crate::detect::{detect_smells, recommend, Issue, Recommendation};
use crate::error::{InputError, ParseError};
use crate::metrics::{compute_metrics, Metrics};
use crate::report::{
    compose, detail_blocks, narrative, render_html_page, render_pdf, summarize_structure,
    Document,
};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["__pycache__", "node_modules", "target"];

/// One source file to document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    /// Path relative to the input root (or the archive entry name), using
    /// `/` separators.
    pub name: String,
    pub language: Language,
    pub text: String,
}

/// Language of the analyzer registered for `name`'s extension, if any.
///
/// Extensions are matched case-insensitively, so `Account.JAVA` is Java.
pub fn source_language(name: &str) -> Option<Language> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    get_analyzer_for_extension(&ext).map(|analyzer| analyzer.language())
}

impl SourceInput {
    /// Build an input from a name, choosing the language by extension.
    pub fn from_name(name: impl Into<String>, text: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let language = source_language(&name)?;
        Some(Self {
            name,
            language,
            text: text.into(),
        })
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

fn read_text(path: &Path) -> Result<String, InputError> {
    let bytes = fs::read(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Collect the source inputs named by `path`.
///
/// `path` may be a `.py` or `.java` file, a directory, or a `.zip` archive.
/// Returns [`InputError::NoSourceFiles`] when nothing recognizable is found.
pub fn load_inputs(path: &Path, config: &Config) -> Result<Vec<SourceInput>, InputError> {
    let metadata = fs::metadata(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let inputs = if metadata.is_dir() {
        load_directory(path, config)?
    } else if is_zip(path) {
        let bytes = fs::read(path).map_err(|source| InputError::Io {
            path: path.display().to_string(),
            source,
        })?;
        load_archive(&path.display().to_string(), &bytes)?
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if source_language(&name).is_none() {
            return Err(InputError::Unsupported(path.display().to_string()));
        }
        SourceInput::from_name(name, read_text(path)?)
            .into_iter()
            .collect()
    };

    if inputs.is_empty() {
        return Err(InputError::NoSourceFiles(path.display().to_string()));
    }
    tracing::debug!(count = inputs.len(), path = %path.display(), "loaded inputs");
    Ok(inputs)
}

/// Walk a directory for Python and Java sources, in file name order.
fn load_directory(root: &Path, config: &Config) -> Result<Vec<SourceInput>, InputError> {
    let mut inputs = Vec::new();
    // Generated documents (and annotated copies) must not be re-read on the
    // next run when the output directory lives inside the input tree.
    let output_dir = fs::canonicalize(&config.output_dir).ok();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
                return false;
            }
            match &output_dir {
                Some(out) => fs::canonicalize(e.path()).map_or(true, |p| &p != out),
                None => true,
            }
        });

    for entry in walker {
        let entry = entry.map_err(|source| InputError::Walk {
            path: root.display().to_string(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if config.is_path_excluded(relative) {
            tracing::debug!(path = %relative.display(), "excluded");
            continue;
        }

        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if source_language(&name).is_none() {
            continue;
        }
        if let Some(input) = SourceInput::from_name(name, read_text(entry.path())?) {
            inputs.push(input);
        }
    }

    Ok(inputs)
}

/// Read the Python and Java entries of a ZIP archive held in memory.
///
/// Other entries are ignored, as are entries whose names would escape the
/// extraction directory.
pub fn load_archive(label: &str, bytes: &[u8]) -> Result<Vec<SourceInput>, InputError> {
    let archive_err = |source| InputError::Archive {
        path: label.to_string(),
        source,
    };
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(archive_err)?;
    let mut inputs = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_err)?;
        if entry.is_dir() {
            continue;
        }
        let raw_name = entry.name().to_string();
        if source_language(&raw_name).is_none() {
            tracing::debug!(entry = %raw_name, "skipping non-source archive entry");
            continue;
        }
        let Some(safe) = entry.enclosed_name() else {
            tracing::warn!(entry = %raw_name, "skipping archive entry with unsafe path");
            continue;
        };
        let name = safe
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .map_err(|source| InputError::Io {
                path: format!("{}:{}", label, raw_name),
                source,
            })?;
        if let Some(input) = SourceInput::from_name(name, String::from_utf8_lossy(&buf)) {
            inputs.push(input);
        }
    }

    Ok(inputs)
}

/// Everything learned about one source file.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub filename: String,
    pub inventory: FileInventory,
    pub metrics: Metrics,
    pub issues: Vec<Issue>,
}

/// Extract, detect, and measure one input.
pub fn analyze_source(input: &SourceInput) -> Result<FileAnalysis, ParseError> {
    let inventory = extract_named(&input.name, &input.text, input.language)?;
    let issues = detect_smells(&inventory);
    let metrics = compute_metrics(&input.text, &inventory);

    tracing::debug!(
        file = %input.name,
        classes = metrics.classes,
        declarations = metrics.declarations,
        issues = issues.len(),
        "analyzed"
    );

    Ok(FileAnalysis {
        filename: input.name.clone(),
        inventory,
        metrics,
        issues,
    })
}

impl FileAnalysis {
    pub fn language(&self) -> Language {
        self.inventory.language
    }

    pub fn summary(&self) -> String {
        summarize_structure(&self.inventory)
    }

    pub fn recommendations(&self) -> BTreeSet<Recommendation> {
        recommend(&self.issues)
    }

    /// Compose the Markdown document for this file.
    pub fn document(&self) -> Document {
        compose(
            &self.filename,
            &self.summary(),
            &narrative(self.language(), &self.metrics, self.issues.len()),
            &detail_blocks(&self.inventory, &self.metrics),
            &self.issues,
        )
    }
}

/// Options for [`process_batch`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub formats: Vec<OutputFormat>,
    /// Produce `<file>.annotated.py` for Python inputs.
    pub annotate: bool,
    /// Show a progress bar for multi-file batches.
    pub progress: bool,
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            formats: config.formats.clone(),
            annotate: config.annotate,
            progress: false,
        }
    }

    fn wants(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The documents produced for one file.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub analysis: FileAnalysis,
    pub markdown: Option<String>,
    pub html: Option<String>,
    pub pdf: Option<Vec<u8>>,
    pub annotated: Option<String>,
}

impl RenderedFile {
    pub fn filename(&self) -> &str {
        &self.analysis.filename
    }

    /// Output file names and contents, in a fixed order.
    pub fn artifacts(&self) -> Vec<(String, &[u8])> {
        let name = self.filename();
        let documents = [
            (OutputFormat::Markdown, self.markdown.as_deref().map(str::as_bytes)),
            (OutputFormat::Pdf, self.pdf.as_deref()),
            (OutputFormat::Html, self.html.as_deref().map(str::as_bytes)),
        ];
        let mut out: Vec<(String, &[u8])> = documents
            .into_iter()
            .filter_map(|(format, bytes)| {
                bytes.map(|b| (format!("{}.{}", name, format.extension()), b))
            })
            .collect();
        if let Some(annotated) = &self.annotated {
            let stem = name.strip_suffix(".py").unwrap_or(name);
            out.push((format!("{}.annotated.py", stem), annotated.as_bytes()));
        }
        out
    }
}

/// A file that could not be documented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub filename: String,
    pub reason: String,
}

/// Result of a batch: rendered files in input order plus failures.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub outputs: Vec<RenderedFile>,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

fn render_file(input: &SourceInput, options: &BatchOptions) -> anyhow::Result<RenderedFile> {
    let analysis = analyze_source(input)?;
    let document = analysis.document();

    let pdf = if options.wants(OutputFormat::Pdf) {
        Some(render_pdf(&input.name, &document.markdown)?)
    } else {
        None
    };
    let html = options
        .wants(OutputFormat::Html)
        .then(|| render_html_page(&input.name, &document.markdown));
    let annotated = (options.annotate && input.language == Language::Python)
        .then(|| annotate_python(&input.text));
    let markdown = options
        .wants(OutputFormat::Markdown)
        .then_some(document.markdown);

    Ok(RenderedFile {
        analysis,
        markdown,
        html,
        pdf,
        annotated,
    })
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("█▓▒░  "));
    }
    bar
}

/// Document every input, one at a time.
pub fn process_batch(inputs: &[SourceInput], options: &BatchOptions) -> BatchOutcome {
    let bar = (options.progress && inputs.len() > 1).then(|| progress_bar(inputs.len()));
    let mut outcome = BatchOutcome::default();

    for input in inputs {
        if let Some(bar) = &bar {
            bar.set_message(input.name.clone());
        }
        match render_file(input, options) {
            Ok(rendered) => outcome.outputs.push(rendered),
            Err(e) => {
                tracing::warn!(file = %input.name, error = %e, "failed to document file");
                outcome.failures.push(FileFailure {
                    filename: input.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    outcome
}

/// Bundle every rendered file's outputs into one ZIP archive.
pub fn build_archive(outputs: &[RenderedFile]) -> anyhow::Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();

    for rendered in outputs {
        for (name, bytes) in rendered.artifacts() {
            writer.start_file(name, options)?;
            writer.write_all(bytes)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}

fn write_artifact(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("failed to create {}: {}", parent.display(), e))?;
    }
    fs::write(path, bytes)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e))
}

/// Write per-file outputs into `out_dir`, plus the combined archive when
/// more than one file was rendered. Returns the written paths.
///
/// A write error is recorded in `outcome.failures` against the file (or the
/// archive name) it belongs to; the remaining outputs are still written.
pub fn write_outputs(
    outcome: &mut BatchOutcome,
    out_dir: &Path,
    archive_name: &str,
) -> Vec<PathBuf> {
    let mut written = Vec::new();
    let mut failures = Vec::new();

    for rendered in &outcome.outputs {
        for (name, bytes) in rendered.artifacts() {
            let path = out_dir.join(&name);
            match write_artifact(&path, bytes) {
                Ok(()) => written.push(path),
                Err(e) => {
                    tracing::warn!(file = %rendered.filename(), error = %e, "failed to write output");
                    failures.push(FileFailure {
                        filename: rendered.filename().to_string(),
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }
    }

    if outcome.outputs.len() > 1 {
        let path = out_dir.join(archive_name);
        match build_archive(&outcome.outputs).and_then(|bytes| write_artifact(&path, &bytes)) {
            Ok(()) => written.push(path),
            Err(e) => {
                tracing::warn!(archive = %archive_name, error = %e, "failed to write archive");
                failures.push(FileFailure {
                    filename: archive_name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome.failures.extend(failures);
    tracing::debug!(count = written.len(), dir = %out_dir.display(), "wrote outputs");
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markdown_only() -> BatchOptions {
        BatchOptions {
            formats: vec![OutputFormat::Markdown],
            annotate: false,
            progress: false,
        }
    }

    fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_archive_ignores_non_source_entries() {
        let bytes = zip_of(&[
            ("pkg/app.py", "def main():\n    pass\n"),
            ("README.txt", "hello"),
        ]);
        let inputs = load_archive("upload.zip", &bytes).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name, "pkg/app.py");
        assert_eq!(inputs[0].language, Language::Python);
    }

    #[test]
    fn test_source_language_uses_registered_extensions() {
        assert_eq!(source_language("pkg/app.py"), Some(Language::Python));
        assert_eq!(source_language("Account.JAVA"), Some(Language::Java));
        assert_eq!(source_language("notes.txt"), None);
        assert_eq!(source_language("Makefile"), None);
        assert!(SourceInput::from_name("README.md", "# hi").is_none());
    }

    #[test]
    fn test_write_error_is_recorded_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("docs");
        // A directory where a.py.md should go makes that one write fail.
        fs::create_dir_all(out.join("a.py.md")).unwrap();

        let inputs = vec![
            SourceInput::from_name("a.py", "def f():\n    pass\n").unwrap(),
            SourceInput::from_name("b.py", "def g():\n    pass\n").unwrap(),
        ];
        let mut outcome = process_batch(&inputs, &markdown_only());
        let written = write_outputs(&mut outcome, &out, "documentation.zip");

        assert!(out.join("b.py.md").is_file());
        assert!(out.join("documentation.zip").is_file());
        assert!(written.contains(&out.join("b.py.md")));
        assert!(!written.contains(&out.join("a.py.md")));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].filename, "a.py");
        assert!(outcome.failures[0].reason.contains("a.py.md"));
    }

    #[test]
    fn test_archive_rejects_garbage() {
        let err = load_archive("bad.zip", b"not a zip").unwrap_err();
        assert!(matches!(err, InputError::Archive { .. }));
    }

    #[test]
    fn test_failure_is_isolated() {
        let inputs = vec![
            SourceInput::from_name("good.py", "def f():\n    pass\n").unwrap(),
            SourceInput::from_name("bad.py", "def broken(:\n").unwrap(),
            SourceInput::from_name("Empty.java", "").unwrap(),
        ];
        let outcome = process_batch(&inputs, &markdown_only());

        assert_eq!(outcome.outputs.len(), 2);
        assert_eq!(outcome.outputs[0].filename(), "good.py");
        assert_eq!(outcome.outputs[1].filename(), "Empty.java");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].filename, "bad.py");
        assert!(outcome.has_failures());
    }

    #[test]
    fn test_java_empty_document() {
        let input = SourceInput::from_name("Empty.java", "").unwrap();
        let analysis = analyze_source(&input).unwrap();
        assert_eq!(analysis.summary(), "No Java classes found in the file.");
        assert!(analysis.issues.is_empty());

        let doc = analysis.document();
        assert!(doc.markdown.starts_with("# Documentation generated for `Empty.java`"));
        assert!(!doc.markdown.contains("## Issues"));
    }

    #[test]
    fn test_artifact_names() {
        let input = SourceInput::from_name("app.py", "def f(): return 1\n").unwrap();
        let options = BatchOptions {
            formats: vec![OutputFormat::Markdown, OutputFormat::Html],
            annotate: true,
            progress: false,
        };
        let outcome = process_batch(&[input], &options);
        let names: Vec<String> = outcome.outputs[0]
            .artifacts()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["app.py.md", "app.py.html", "app.annotated.py"]);
    }

    #[test]
    fn test_archive_bundles_all_outputs() {
        let inputs = vec![
            SourceInput::from_name("a.py", "def f():\n    pass\n").unwrap(),
            SourceInput::from_name("B.java", "class B {}\n").unwrap(),
        ];
        let outcome = process_batch(&inputs, &markdown_only());
        let bytes = build_archive(&outcome.outputs).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["B.java.md", "a.py.md"]);
    }
}
