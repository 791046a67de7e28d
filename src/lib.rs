//! legacydoc - documentation generator for legacy Python and Java code.
//!
//! For each source file legacydoc builds a structural inventory (classes,
//! methods, functions and their documentation), flags style smells, computes
//! simple metrics, and composes a Markdown document that can be rendered to
//! HTML and PDF.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter extraction of the declaration inventory
//! - `detect`: smell detection and recommendations
//! - `metrics`: size and documentation counts
//! - `report`: Markdown composition, HTML/PDF rendering, terminal and JSON output
//! - `pipeline`: input loading, batch processing, output archive
//! - `annotate`: placeholder docstring insertion for Python
//! - `config`: YAML configuration file
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement the
//! `LanguageAnalyzer` trait and register it in `languages/mod.rs`.

pub mod analysis;
pub mod annotate;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod report;

pub use analysis::{
    extract, ClassInfo, Declaration, DeclarationKind, FileInventory,
    Language, LanguageAnalyzer,
};
pub use annotate::annotate_python;
pub use config::{Config, OutputFormat};
pub use detect::{detect_smells, recommend, Issue, IssueCategory, Recommendation};
pub use error::{InputError, ParseError};
pub use metrics::{compute_metrics, Metrics};
pub use pipeline::{process_batch, BatchOptions, BatchOutcome, SourceInput};
pub use report::{compose, Document};
