//! Configuration file for legacydoc.
//!
//! A `legacydoc.yaml` sets defaults for the `generate` command. Every field
//! is optional; command-line flags override what the file says.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for in the working directory, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["legacydoc.yaml", ".legacydoc.yaml"];

/// Commented template written by `legacydoc init`.
pub const CONFIG_TEMPLATE: &str = include_str!("templates/legacydoc.yaml");

/// A document format written for every analyzed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Pdf,
    Html,
}

impl OutputFormat {
    /// File extension appended to the source file name.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Html => "html",
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving generated documents.
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    /// Also write `<file>.annotated.py` for Python sources.
    pub annotate: bool,
    /// Name of the combined archive written for multi-file batches.
    pub archive_name: String,
    /// Glob patterns for paths to skip when walking a directory.
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docs"),
            formats: vec![OutputFormat::Markdown, OutputFormat::Pdf],
            annotate: false,
            archive_name: "documentation.zip".to_string(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // An empty or comment-only file deserializes to null.
        if content.lines().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        }) {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Find a configuration file: the working directory first, then the
    /// per-user config directory.
    pub fn discover() -> Option<PathBuf> {
        for name in DEFAULT_CONFIG_NAMES {
            let path = PathBuf::from(name);
            if path.is_file() {
                return Some(path);
            }
        }

        let dirs = directories::ProjectDirs::from("", "", "legacydoc")?;
        let path = dirs.config_dir().join("legacydoc.yaml");
        path.is_file().then_some(path)
    }

    /// Load the explicit file if given, else a discovered one, else defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::discover(),
        };
        match path {
            Some(p) => {
                let config = Self::parse_file(&p)
                    .map_err(|e| anyhow::anyhow!("{}: {}", p.display(), e))?;
                tracing::debug!(path = %p.display(), "loaded configuration");
                Ok((config, Some(p)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    pub fn wants(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Check if a path should be excluded based on the `exclude` patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        self.exclude.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|glob| glob.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.formats.is_empty() {
        anyhow::bail!("formats must list at least one of markdown, pdf, html");
    }

    if !config.archive_name.ends_with(".zip") || config.archive_name.len() <= ".zip".len() {
        anyhow::bail!(
            "invalid archive_name {:?}, must end in .zip",
            config.archive_name
        );
    }

    for pattern in &config.exclude {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid exclude pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}
