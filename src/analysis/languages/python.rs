//! Python language analyzer using tree-sitter.

use tree_sitter::{Language as Grammar, Node};

use crate::analysis::{
    ClassInfo, Declaration, DeclarationKind, FileInventory, Language, LanguageAnalyzer,
    ParsedFile,
};
use crate::error::ParseError;

/// Node kinds that can hold statements. Walks descend only through these
/// (and definition bodies), never into expressions, so their depth follows
/// statement nesting rather than expression nesting.
const STATEMENT_CONTAINERS: &[&str] = &[
    "module",
    "block",
    "if_statement",
    "elif_clause",
    "else_clause",
    "for_statement",
    "while_statement",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "match_statement",
    "case_clause",
];

fn is_statement_container(node: Node) -> bool {
    STATEMENT_CONTAINERS.contains(&node.kind())
}

pub struct PythonAnalyzer {
    grammar: Grammar,
}

/// Accumulates the inventory during a walk.
#[derive(Default)]
struct Collector {
    classes: Vec<ClassInfo>,
    functions: Vec<Declaration>,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            grammar: tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Visit the direct children of `node`.
    ///
    /// `owner` is the index of the class whose body `node` is; it is only
    /// set for a class body block, so definitions nested one level deeper
    /// (inside `if`, `try`, or another function) are free functions.
    fn visit_children(
        &self,
        parsed: &ParsedFile,
        node: Node,
        owner: Option<usize>,
        out: &mut Collector,
    ) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let def = unwrap_decorated(child);
            match def.kind() {
                "function_definition" => self.visit_function(parsed, def, owner, out),
                "class_definition" => self.visit_class(parsed, def, out),
                _ if is_statement_container(child) => {
                    self.visit_children(parsed, child, None, out)
                }
                _ => {}
            }
        }
    }

    fn visit_function(
        &self,
        parsed: &ParsedFile,
        def: Node,
        owner: Option<usize>,
        out: &mut Collector,
    ) {
        let Some(name) = def.child_by_field_name("name") else {
            return;
        };
        let body = def.child_by_field_name("body");

        let kind = match owner {
            Some(idx) => DeclarationKind::Method {
                class: out.classes[idx].name.clone(),
            },
            None => DeclarationKind::Function,
        };

        let declaration = Declaration {
            name: parsed.node_text(name).to_string(),
            kind,
            documentation: body.and_then(|b| docstring(parsed, b)),
            body_length: Some(body.map(statement_count).unwrap_or(0)),
            line: def.start_position().row + 1,
        };

        match owner {
            Some(idx) => out.classes[idx].methods.push(declaration),
            None => out.functions.push(declaration),
        }

        if let Some(body) = body {
            self.visit_children(parsed, body, None, out);
        }
    }

    fn visit_class(&self, parsed: &ParsedFile, def: Node, out: &mut Collector) {
        let Some(name) = def.child_by_field_name("name") else {
            return;
        };

        let idx = out.classes.len();
        out.classes.push(ClassInfo {
            name: parsed.node_text(name).to_string(),
            line: def.start_position().row + 1,
            methods: Vec::new(),
        });

        if let Some(body) = def.child_by_field_name("body") {
            self.visit_children(parsed, body, Some(idx), out);
        }
    }
}

/// `@decorator def f(): ...` wraps the definition; return the inner node.
fn unwrap_decorated(node: Node) -> Node {
    if node.kind() == "decorated_definition" {
        if let Some(def) = node.child_by_field_name("definition") {
            return def;
        }
    }
    node
}

/// Statements of a block, skipping comments.
fn statements(block: Node) -> Vec<Node> {
    let mut cursor = block.walk();
    block
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// Number of direct statements in a block (not counted recursively).
fn statement_count(block: Node) -> usize {
    statements(block).len()
}

/// Return the cleaned docstring if the block's first statement is a plain
/// string literal expression.
fn docstring(parsed: &ParsedFile, block: Node) -> Option<String> {
    let first = statements(block).into_iter().next()?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let expr = first.named_child(0)?;

    let raw = match expr.kind() {
        "string" => plain_string_contents(parsed, expr)?,
        "concatenated_string" => {
            let mut cursor = expr.walk();
            let parts: Option<Vec<String>> = expr
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .map(|part| plain_string_contents(parsed, part))
                .collect();
            parts?.concat()
        }
        _ => return None,
    };

    Some(clean_docstring(&raw))
}

/// Body blocks of every function definition lacking a docstring, in
/// source order. Methods and nested functions are included.
pub(crate) fn undocumented_bodies(parsed: &ParsedFile) -> Vec<Node<'_>> {
    fn walk<'t>(parsed: &ParsedFile, node: Node<'t>, out: &mut Vec<Node<'t>>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let def = unwrap_decorated(child);
            match def.kind() {
                "function_definition" | "class_definition" => {
                    let Some(body) = def.child_by_field_name("body") else {
                        continue;
                    };
                    if def.kind() == "function_definition" && docstring(parsed, body).is_none() {
                        out.push(body);
                    }
                    walk(parsed, body, out);
                }
                _ if is_statement_container(child) => walk(parsed, child, out),
                _ => {}
            }
        }
    }

    let mut out = Vec::new();
    walk(parsed, parsed.tree.root_node(), &mut out);
    out
}

/// Contents of a string literal without prefix and quotes.
///
/// Returns None for f-strings and bytes literals, which never count as
/// documentation.
fn plain_string_contents(parsed: &ParsedFile, node: Node) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }

    let mut cursor = node.walk();
    if node
        .named_children(&mut cursor)
        .any(|n| n.kind() == "interpolation")
    {
        return None;
    }

    let text = parsed.node_text(node);
    let quote_at = text.find(['"', '\''])?;
    let prefix = text[..quote_at].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let quoted = &text[quote_at..];
    let delimiter = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|d| quoted.len() >= 2 * d.len() && quoted.starts_with(d) && quoted.ends_with(d))?;

    Some(quoted[delimiter.len()..quoted.len() - delimiter.len()].to_string())
}

/// Normalise docstring whitespace: the first line is stripped, later lines
/// lose their common indentation, and blank edges are dropped.
fn clean_docstring(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned = vec![first.trim().to_string()];
    for line in rest {
        let lead = line.len() - line.trim_start().len();
        let line = line.get(lead.min(indent)..).unwrap_or_else(|| line.trim_start());
        cleaned.push(line.trim_end().to_string());
    }

    cleaned.join("\n").trim().to_string()
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile, ParseError> {
        ParsedFile::parse(Language::Python, &self.grammar, path, source)
    }

    fn extract_inventory(&self, parsed: &ParsedFile) -> FileInventory {
        let mut out = Collector::default();
        self.visit_children(parsed, parsed.tree.root_node(), None, &mut out);

        tracing::debug!(
            path = %parsed.path,
            classes = out.classes.len(),
            functions = out.functions.len(),
            "extracted python inventory"
        );

        FileInventory {
            language: Language::Python,
            classes: out.classes,
            functions: out.functions,
            parse_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> FileInventory {
        PythonAnalyzer::new()
            .analyze("test.py", source.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_extract_classes_and_functions_in_order() {
        let source = r#"
def first():
    pass

class Alpha:
    def one(self):
        pass

    def two(self):
        pass

def second(x, y):
    return x + y

class Beta:
    pass
"#;
        let inv = extract(source);

        let classes: Vec<_> = inv.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(classes, vec!["Alpha", "Beta"]);

        let functions: Vec<_> = inv.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(functions, vec!["first", "second"]);

        let methods: Vec<_> = inv.classes[0].methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["one", "two"]);
        assert!(inv.classes[1].methods.is_empty());
    }

    #[test]
    fn test_methods_are_not_listed_as_functions() {
        let source = r#"
class Service:
    def run(self):
        def helper():
            return 1
        return helper()
"#;
        let inv = extract(source);

        assert_eq!(inv.classes[0].methods.len(), 1);
        assert_eq!(
            inv.classes[0].methods[0].kind,
            DeclarationKind::Method {
                class: "Service".to_string()
            }
        );
        // Nested helpers are free functions, never methods of the class.
        let functions: Vec<_> = inv.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(functions, vec!["helper"]);
    }

    #[test]
    fn test_nested_and_decorated_definitions() {
        let source = r#"
import functools

class Outer:
    class Inner:
        def deep(self):
            pass

    @staticmethod
    def build():
        return Outer()

if True:
    @functools.lru_cache
    def cached():
        return 1
"#;
        let inv = extract(source);

        let classes: Vec<_> = inv.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(classes, vec!["Outer", "Inner"]);
        assert_eq!(inv.classes[0].methods[0].name, "build");
        assert_eq!(inv.classes[1].methods[0].name, "deep");
        assert_eq!(inv.functions[0].name, "cached");
    }

    #[test]
    fn test_definitions_inside_compound_statements() {
        let source = r#"
try:
    def from_try():
        pass
except ImportError:
    def from_except():
        pass

while False:
    def from_while():
        pass

with open("x") as f:
    class FromWith:
        def method(self):
            pass

match command:
    case "go":
        def from_case():
            pass
"#;
        let inv = extract(source);

        let functions: Vec<_> = inv.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            functions,
            vec!["from_try", "from_except", "from_while", "from_case"]
        );
        assert_eq!(inv.classes[0].name, "FromWith");
        assert_eq!(inv.classes[0].methods[0].name, "method");
    }

    #[test]
    fn test_very_long_expression() {
        let terms = vec!["1"; 20_000].join(" + ");
        let source = format!("def total():\n    return {}\n", terms);
        let inv = extract(&source);

        assert_eq!(inv.functions.len(), 1);
        assert_eq!(inv.functions[0].name, "total");
        assert_eq!(inv.functions[0].body_length, Some(1));

        let broken = format!("def total():\n    return {} +\n", terms);
        let err = PythonAnalyzer::new()
            .analyze("long.py", broken.as_bytes())
            .unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_docstring_detection() {
        let source = r#"
def documented():
    """Does something useful."""
    return 1

def single_quoted():
    'Short doc.'

def commented():
    # leading comment
    """Still a docstring."""

def undocumented():
    x = "not a docstring"
    return x

def fstring():
    f"value {1}"

def bytes_literal():
    b"raw"
"#;
        let inv = extract(source);
        let doc = |name: &str| {
            inv.functions
                .iter()
                .find(|f| f.name == name)
                .unwrap()
                .documentation
                .clone()
        };

        assert_eq!(doc("documented").as_deref(), Some("Does something useful."));
        assert_eq!(doc("single_quoted").as_deref(), Some("Short doc."));
        assert_eq!(doc("commented").as_deref(), Some("Still a docstring."));
        assert_eq!(doc("undocumented"), None);
        assert_eq!(doc("fstring"), None);
        assert_eq!(doc("bytes_literal"), None);
    }

    #[test]
    fn test_body_length_counts_direct_statements() {
        let source = r#"
def branchy(x):
    """Doc."""
    if x:
        a = 1
        b = 2
    for i in range(3):
        print(i)
    return x
"#;
        let inv = extract(source);
        // docstring, if, for, return
        assert_eq!(inv.functions[0].body_length, Some(4));
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let err = PythonAnalyzer::new()
            .analyze("broken.py", b"def broken(:\n    pass\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_clean_docstring() {
        let raw = "Summary line.\n\n        Details indented.\n          More.\n    ";
        assert_eq!(
            clean_docstring(raw),
            "Summary line.\n\nDetails indented.\n  More."
        );
    }
}
