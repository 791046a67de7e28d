//! Java language analyzer using tree-sitter.
//!
//! Java parsing is lenient: a file that does not parse yields an inventory
//! with no classes instead of an error, so one malformed file never aborts
//! a batch. The inventory records the swallowed error in `parse_error`.

use once_cell::sync::Lazy;
use regex::Regex;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language as Grammar, Node, Query, QueryCursor};

use crate::analysis::{
    ClassInfo, Declaration, DeclarationKind, FileInventory, Language, LanguageAnalyzer,
    ParsedFile,
};
use crate::error::ParseError;

/// Class declarations at any depth, including nested and local classes.
/// Interfaces, enums and records are not matched.
const CLASS_QUERY: &str = r#"
(class_declaration
  name: (identifier) @class_name
  body: (class_body) @class_body
) @class
"#;

/// Leading `*` gutter of Javadoc lines.
static JAVADOC_GUTTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\*[ \t]?").unwrap());

pub struct JavaAnalyzer {
    grammar: Grammar,
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self {
            grammar: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn extract_classes(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<ClassInfo>> {
        let query = Query::new(&self.grammar, CLASS_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut found = Vec::new();
        while let Some(m) = matches.next() {
            let mut name = None;
            let mut body = None;
            let mut class_node = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "class_name" => name = Some(parsed.node_text(capture.node).to_string()),
                    "class_body" => body = Some(capture.node),
                    "class" => class_node = Some(capture.node),
                    _ => {}
                }
            }

            if let (Some(name), Some(body), Some(node)) = (name, body, class_node) {
                let methods = self.extract_methods(parsed, &name, body);
                found.push((
                    node.start_byte(),
                    ClassInfo {
                        name,
                        line: node.start_position().row + 1,
                        methods,
                    },
                ));
            }
        }

        found.sort_by_key(|(start, _)| *start);
        Ok(found.into_iter().map(|(_, class)| class).collect())
    }

    /// Methods declared directly in a class body. Constructors are skipped.
    fn extract_methods(&self, parsed: &ParsedFile, class: &str, body: Node) -> Vec<Declaration> {
        let mut cursor = body.walk();
        body.named_children(&mut cursor)
            .filter(|member| member.kind() == "method_declaration")
            .filter_map(|member| {
                let name = member.child_by_field_name("name")?;
                Some(Declaration {
                    name: parsed.node_text(name).to_string(),
                    kind: DeclarationKind::Method {
                        class: class.to_string(),
                    },
                    documentation: javadoc(parsed, member),
                    // Java methods are never sized.
                    body_length: None,
                    line: member.start_position().row + 1,
                })
            })
            .collect()
    }
}

/// Javadoc text of the block comment directly preceding `member`.
fn javadoc(parsed: &ParsedFile, member: Node) -> Option<String> {
    let prev = member.prev_sibling()?;
    if prev.kind() != "block_comment" {
        return None;
    }

    let text = parsed.node_text(prev);
    let inner = text.strip_prefix("/**")?.strip_suffix("*/")?;
    let cleaned = JAVADOC_GUTTER.replace_all(inner, "");

    Some(
        cleaned
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
    )
}

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn language(&self) -> Language {
        Language::Java
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile, ParseError> {
        ParsedFile::parse(Language::Java, &self.grammar, path, source)
    }

    fn extract_inventory(&self, parsed: &ParsedFile) -> FileInventory {
        match self.extract_classes(parsed) {
            Ok(classes) => {
                tracing::debug!(path = %parsed.path, classes = classes.len(), "extracted java inventory");
                FileInventory {
                    language: Language::Java,
                    classes,
                    functions: Vec::new(),
                    parse_error: None,
                }
            }
            Err(e) => lenient_empty(&parsed.path, e.to_string()),
        }
    }

    fn analyze(&self, path: &str, source: &[u8]) -> Result<FileInventory, ParseError> {
        match self.parse(path, source) {
            Ok(parsed) => Ok(self.extract_inventory(&parsed)),
            Err(e) => Ok(lenient_empty(path, e.to_string())),
        }
    }
}

fn lenient_empty(path: &str, error: String) -> FileInventory {
    tracing::warn!(path, error = %error, "java source could not be analyzed; reporting no classes");
    FileInventory {
        parse_error: Some(error),
        ..FileInventory::empty(Language::Java)
    }
}
