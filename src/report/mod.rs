//! Report generation.
//!
//! - `markdown`: the per-file documentation document
//! - `render`: HTML and PDF renderings of that document
//! - `pretty`: colored terminal summary of a batch
//! - `json`: machine-readable batch summary

mod json;
mod markdown;
mod pretty;
mod render;

pub use json::{build_json, write_json, JsonReport};
pub use markdown::{compose, compose_at, detail_blocks, narrative, summarize_structure, Document};
pub use pretty::write_pretty;
pub use render::{markdown_to_html, render_html_page, render_pdf};
