//! Core traits for language analysis.

use tree_sitter::Node;

use super::{FileInventory, Language};
use crate::error::ParseError;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// This is kept separate from FileInventory so the tree can be walked
/// more than once without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file name (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Parse `source` with the given grammar.
    ///
    /// tree-sitter always recovers, so a tree containing ERROR or MISSING
    /// nodes is reported as a syntax error here.
    pub fn parse(
        language: Language,
        grammar: &tree_sitter::Language,
        path: &str,
        source: &[u8],
    ) -> Result<Self, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(grammar)
            .map_err(|e| ParseError::Grammar {
                language,
                message: e.to_string(),
            })?;

        let tree = parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            language,
            path: path.to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Err(ParseError::Syntax {
                language,
                path: path.to_string(),
                line,
            });
        }

        Ok(Self {
            tree,
            source: source.to_vec(),
            path: path.to_string(),
        })
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Line (1-indexed) of the first ERROR or MISSING node in pre-order.
///
/// Iterative, so arbitrarily deep trees cannot exhaust the stack. Only
/// subtrees reporting `has_error()` are entered.
fn first_error_line(root: Node) -> Option<usize> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Language-specific extractor trait.
///
/// Each supported language implements this trait to turn its
/// tree-sitter output into a `FileInventory`.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language handled by this analyzer.
    fn language(&self) -> Language;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file into a tree-sitter tree.
    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile, ParseError>;

    /// Walk a parsed file and collect classes, methods and functions.
    fn extract_inventory(&self, parsed: &ParsedFile) -> FileInventory;

    /// Parse and extract in one step.
    ///
    /// Parse failures propagate by default; analyzers with a lenient
    /// policy override this.
    fn analyze(&self, path: &str, source: &[u8]) -> Result<FileInventory, ParseError> {
        let parsed = self.parse(path, source)?;
        Ok(self.extract_inventory(&parsed))
    }

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
