//! Placeholder docstring insertion for Python sources.
//!
//! Edits are planned against the tree-sitter tree and spliced into the
//! original text back to front, so everything not touched keeps its exact
//! formatting. The result is parsed again before it is returned.

use tree_sitter::Node;

use crate::analysis::{get_analyzer, undocumented_bodies, Language};

/// Docstring inserted into every undocumented function.
pub const PLACEHOLDER_DOCSTRING: &str = r#""""Describe the purpose of this function here.""""#;

const INDENT_STEP: &str = "    ";

/// Insert the placeholder docstring into every undocumented function or
/// method of `source`.
///
/// This never fails. If the source cannot be parsed, or the annotated text
/// would not parse, the original source is returned behind a comment line
/// naming the problem.
pub fn annotate_python(source: &str) -> String {
    match try_annotate_python(source) {
        Ok(annotated) => annotated,
        Err(e) => {
            tracing::warn!(error = %e, "annotation failed, keeping original source");
            format!("# Error while improving the code: {}\n\n{}", e, source)
        }
    }
}

/// A replacement of `source[start..end]`.
#[derive(Debug)]
struct Splice {
    start: usize,
    end: usize,
    text: String,
}

/// Fallible core of [`annotate_python`].
pub fn try_annotate_python(source: &str) -> anyhow::Result<String> {
    let analyzer = get_analyzer(Language::Python);
    let parsed = analyzer.parse("<annotate>", source.as_bytes())?;

    let mut splices: Vec<Splice> = undocumented_bodies(&parsed)
        .into_iter()
        .filter_map(|body| plan_splice(source, body))
        .collect();
    if splices.is_empty() {
        return Ok(source.to_string());
    }

    let inserted = splices.len();
    splices.sort_by(|a, b| b.start.cmp(&a.start));

    let mut out = source.to_string();
    for splice in splices {
        out.replace_range(splice.start..splice.end, &splice.text);
    }

    analyzer
        .parse("<annotated>", out.as_bytes())
        .map_err(|e| anyhow::anyhow!("annotated code no longer parses: {}", e))?;

    tracing::debug!(inserted, "inserted placeholder docstrings");
    Ok(out)
}

/// Byte offset of the start of the line containing `offset`.
fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Leading spaces and tabs of the line starting at `start`.
fn indentation_at(source: &str, start: usize) -> &str {
    let rest = &source[start..];
    let len = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    &rest[..len]
}

fn plan_splice(source: &str, body: Node) -> Option<Splice> {
    let count = body.named_child_count();
    let first = body.named_child(0)?;
    let last = body.named_child(count.checked_sub(1)?)?;

    let colon = body.prev_sibling().filter(|n| n.kind() == ":");
    let header_row = match colon {
        Some(c) => c.end_position().row,
        None => body.parent()?.start_position().row,
    };

    if first.start_position().row > header_row {
        // Block body: insert a new first line at the body's indentation.
        let start = line_start(source, first.start_byte());
        let indent = indentation_at(source, start);
        return Some(Splice {
            start,
            end: start,
            text: format!("{}{}\n", indent, PLACEHOLDER_DOCSTRING),
        });
    }

    // `def f(): return 1` has its body on the header line; move it down.
    let def = body.parent()?;
    let def_indent = indentation_at(source, line_start(source, def.start_byte()));
    let indent = format!("{}{}", def_indent, INDENT_STEP);
    let start = colon.map_or(first.start_byte(), |c| c.end_byte());
    let statements = &source[first.start_byte()..last.end_byte()];

    Some(Splice {
        start,
        end: last.end_byte(),
        text: format!(
            "\n{indent}{doc}\n{indent}{statements}",
            indent = indent,
            doc = PLACEHOLDER_DOCSTRING,
            statements = statements
        ),
    })
}
