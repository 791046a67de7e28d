//! Inventory structures extracted from a parsed source file.

use std::fmt;

use serde::Serialize;

/// Source language of an analyzed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
}

impl Language {
    /// Convert to the language tag used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
        }
    }

    /// What a documentation block is called in this language.
    pub fn doc_term(&self) -> &'static str {
        match self {
            Language::Python => "docstring",
            Language::Java => "Javadoc",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of callable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeclarationKind {
    /// A free function, not owned by any class.
    Function,
    /// A method owned by the named class.
    Method { class: String },
}

impl DeclarationKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Method { .. } => "method",
        }
    }

    /// The owning class, for methods.
    pub fn owning_class(&self) -> Option<&str> {
        match self {
            DeclarationKind::Function => None,
            DeclarationKind::Method { class } => Some(class),
        }
    }
}

/// A function or method extracted from source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// The declaration name.
    pub name: String,
    /// Function or method (with its owning class).
    #[serde(flatten)]
    pub kind: DeclarationKind,
    /// Cleaned docstring / Javadoc text, if present.
    pub documentation: Option<String>,
    /// Number of direct statements in the body.
    ///
    /// `None` when the parser output carries no usable body-size signal
    /// (always the case for Java).
    pub body_length: Option<usize>,
    /// Line of the declaration (1-indexed).
    pub line: usize,
}

impl Declaration {
    /// Whether a docstring or Javadoc block is attached.
    pub fn has_documentation(&self) -> bool {
        self.documentation.is_some()
    }

    /// Get the fully qualified name (`Class.name` for methods).
    pub fn qualified_name(&self) -> String {
        match self.kind.owning_class() {
            Some(class) => format!("{}.{}", class, self.name),
            None => self.name.clone(),
        }
    }
}

/// A class and the methods it declares directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub name: String,
    /// Line of the class declaration (1-indexed).
    pub line: usize,
    /// Methods in source order. Every entry has `DeclarationKind::Method`
    /// naming this class.
    pub methods: Vec<Declaration>,
}

/// Everything extracted from a single file.
///
/// Built once per file and never mutated afterwards; metrics and issues
/// are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInventory {
    pub language: Language,
    /// Classes in source order.
    pub classes: Vec<ClassInfo>,
    /// Free functions in source order.
    pub functions: Vec<Declaration>,
    /// Set when a lenient parser swallowed a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl FileInventory {
    /// Create an empty inventory.
    pub fn empty(language: Language) -> Self {
        Self {
            language,
            classes: Vec::new(),
            functions: Vec::new(),
            parse_error: None,
        }
    }

    /// All methods, class by class, in inventory order.
    pub fn methods(&self) -> impl Iterator<Item = &Declaration> {
        self.classes.iter().flat_map(|c| c.methods.iter())
    }

    /// Methods followed by free functions, in inventory order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.methods().chain(self.functions.iter())
    }

    /// Total number of methods across all classes.
    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }

    /// Whether the file yielded no classes and no functions.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty()
    }
}
