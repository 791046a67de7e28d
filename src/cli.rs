//! Command-line interface for legacydoc.

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::annotate::try_annotate_python;
use crate::config::{self, Config, OutputFormat, CONFIG_TEMPLATE};
use crate::error::InputError;
use crate::pipeline::{self, BatchOptions};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Generate documentation for legacy Python and Java code.
///
/// legacydoc extracts the classes, methods and functions of each source
/// file, flags missing documentation, empty classes and oversized methods,
/// and writes a Markdown, PDF and optionally HTML document per file.
#[derive(Parser)]
#[command(name = "legacydoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Document a source file, a directory, or a .zip archive
    #[command(visible_alias = "gen")]
    Generate(GenerateArgs),
    /// Insert placeholder docstrings into a Python file
    Annotate(AnnotateArgs),
    /// Create a legacydoc.yaml configuration file
    Init(InitArgs),
}

/// Arguments for the generate command.
#[derive(Parser)]
pub struct GenerateArgs {
    /// Path to document (.py, .java, directory, or .zip)
    pub path: PathBuf,

    /// Directory receiving the generated documents
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Terminal output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Also write <file>.annotated.py for Python sources
    #[arg(long)]
    pub annotate: bool,

    /// Skip PDF rendering
    #[arg(long)]
    pub no_pdf: bool,

    /// Also write an HTML page per file
    #[arg(long)]
    pub html: bool,
}

/// Arguments for the annotate command.
#[derive(Parser)]
pub struct AnnotateArgs {
    /// Python file to annotate
    pub file: PathBuf,

    /// Output file path (default: print to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "legacydoc.yaml")]
    pub output: PathBuf,
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if args.annotate {
        config.annotate = true;
    }
    if args.no_pdf {
        config.formats.retain(|f| *f != OutputFormat::Pdf);
    }
    if args.html && !config.wants(OutputFormat::Html) {
        config.formats.push(OutputFormat::Html);
    }
}

/// Run the generate command.
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let mut config = match Config::load(args.config.as_deref()) {
        Ok((config, _)) => config,
        Err(e) => {
            eprintln!("Error parsing config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    apply_overrides(&mut config, args);

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let inputs = match pipeline::load_inputs(&args.path, &config) {
        Ok(inputs) => inputs,
        Err(e @ InputError::NoSourceFiles(_)) => {
            eprintln!("Warning: {}", e);
            return Ok(EXIT_SUCCESS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut options = BatchOptions::from_config(&config);
    options.progress = args.format == "pretty" && std::io::stderr().is_terminal();

    let mut outcome = pipeline::process_batch(&inputs, &options);
    let written =
        pipeline::write_outputs(&mut outcome, &config.output_dir, &config.archive_name);

    let source = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => {
            let written: Vec<String> = written
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect();
            report::write_json(
                &source,
                &config.output_dir.to_string_lossy(),
                &outcome,
                &written,
            )?;
        }
        _ => report::write_pretty(&source, &config.output_dir, &outcome, &written),
    }

    if outcome.has_failures() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the annotate command.
pub fn run_annotate(args: &AnnotateArgs) -> anyhow::Result<i32> {
    let is_python = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "py");
    if !is_python {
        eprintln!("Error: {} is not a Python file", args.file.display());
        return Ok(EXIT_ERROR);
    }

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", args.file.display(), e);
            return Ok(EXIT_ERROR);
        }
    };

    let (text, code) = match try_annotate_python(&source) {
        Ok(text) => (text, EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Warning: {}: {}", args.file.display(), e);
            (
                format!("# Error while improving the code: {}\n\n{}", e, source),
                EXIT_FAILED,
            )
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, text)?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }

    Ok(code)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to choose formats and output directory", args.output.display());
    println!("  2. Run: legacydoc generate <path> --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["legacydoc", "generate"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Generate(args) => args,
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_overrides() {
        let args = generate_args(&["src", "--no-pdf", "--html", "--annotate", "-o", "out"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.annotate);
        assert_eq!(
            config.formats,
            vec![OutputFormat::Markdown, OutputFormat::Html]
        );
    }

    /// Write an explicit config into `dir` so discovery never reaches the
    /// user's own legacydoc.yaml.
    fn isolated_config(dir: &Path) -> String {
        let path = dir.join("legacydoc.yaml");
        std::fs::write(&path, "formats: [markdown]\n").unwrap();
        path.to_string_lossy().into_owned()
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        use std::io::Write;
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        std::fs::write(path, writer.finish().unwrap().into_inner()).unwrap();
    }

    #[test]
    fn test_generate_archive_without_sources_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated_config(dir.path());
        let archive = dir.path().join("upload.zip");
        write_zip(&archive, &[("README.txt", "nothing to see")]);
        let out = dir.path().join("out");

        let args = generate_args(&[
            archive.to_str().unwrap(),
            "-c",
            &config,
            "-o",
            out.to_str().unwrap(),
            "-f",
            "json",
        ]);
        assert_eq!(run_generate(&args).unwrap(), EXIT_SUCCESS);
        assert!(!out.exists());
    }

    #[test]
    fn test_generate_partial_failure_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated_config(dir.path());
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("ok.py"), "def ok():\n    return 1\n").unwrap();
        std::fs::write(src.join("broken.py"), "def broken(:\n").unwrap();
        let out = dir.path().join("out");

        let args = generate_args(&[
            src.to_str().unwrap(),
            "-c",
            &config,
            "-o",
            out.to_str().unwrap(),
            "-f",
            "json",
            "--no-pdf",
        ]);
        assert_eq!(run_generate(&args).unwrap(), EXIT_FAILED);
        assert!(out.join("ok.py.md").is_file());
        assert!(!out.join("broken.py.md").exists());
    }

    #[test]
    fn test_generate_rejects_unknown_format() {
        let args = generate_args(&["x.py", "-f", "xml"]);
        assert_eq!(run_generate(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["legacydoc", "generate", "x.py", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("legacydoc.yaml");

        let args = InitArgs {
            output: output.clone(),
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), CONFIG_TEMPLATE);
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
