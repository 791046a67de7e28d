//! Style smell detection over a file inventory.
//!
//! Rules are fixed and independent; each declaration is checked against
//! every rule that applies to it:
//! - missing_doc: a function or method without docstring / Javadoc
//! - empty_class: a class that declares no methods
//! - oversized_method: a method body with more than 20 statements
//!   (Python only, Java declarations carry no body size)

use crate::analysis::{ClassInfo, Declaration, FileInventory, Language};

use super::{Issue, IssueCategory};

/// Statement count above which a method is reported as too long.
pub const MAX_METHOD_STATEMENTS: usize = 20;

/// Evaluate all rules against an inventory.
///
/// Issues come out in inventory order: each class, then its methods, then
/// the free functions.
pub fn detect_smells(inventory: &FileInventory) -> Vec<Issue> {
    let mut issues = Vec::new();

    for class in &inventory.classes {
        check_class(class, inventory.language, &mut issues);
    }

    for function in &inventory.functions {
        if !function.has_documentation() {
            issues.push(Issue {
                category: IssueCategory::MissingDoc,
                message: format!(
                    "Function `{}` has no {}.",
                    function.name,
                    inventory.language.doc_term()
                ),
                target: function.qualified_name(),
                line: function.line,
            });
        }
    }

    tracing::debug!(count = issues.len(), "smell detection finished");
    issues
}

fn check_class(class: &ClassInfo, language: Language, issues: &mut Vec<Issue>) {
    if class.methods.is_empty() {
        issues.push(Issue {
            category: IssueCategory::EmptyClass,
            message: format!("Class `{}` has no methods.", class.name),
            target: class.name.clone(),
            line: class.line,
        });
        return;
    }

    for method in &class.methods {
        if !method.has_documentation() {
            issues.push(Issue {
                category: IssueCategory::MissingDoc,
                message: format!(
                    "Method `{}` in class `{}` has no {}.",
                    method.name,
                    class.name,
                    language.doc_term()
                ),
                target: method.qualified_name(),
                line: method.line,
            });
        }

        if is_oversized(method) {
            issues.push(Issue {
                category: IssueCategory::OversizedMethod,
                message: format!(
                    "Method `{}` in class `{}` is too long (>{} lines).",
                    method.name, class.name, MAX_METHOD_STATEMENTS
                ),
                target: method.qualified_name(),
                line: method.line,
            });
        }
    }
}

/// Whether a declaration's body exceeds the statement limit.
///
/// Declarations without a body-size signal are never oversized.
pub fn is_oversized(declaration: &Declaration) -> bool {
    declaration
        .body_length
        .is_some_and(|len| len > MAX_METHOD_STATEMENTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DeclarationKind;

    fn method(class: &str, name: &str, doc: bool, body: Option<usize>) -> Declaration {
        Declaration {
            name: name.to_string(),
            kind: DeclarationKind::Method {
                class: class.to_string(),
            },
            documentation: doc.then(|| "Doc.".to_string()),
            body_length: body,
            line: 1,
        }
    }

    fn function(name: &str, doc: bool) -> Declaration {
        Declaration {
            name: name.to_string(),
            kind: DeclarationKind::Function,
            documentation: doc.then(|| "Doc.".to_string()),
            body_length: Some(1),
            line: 1,
        }
    }

    fn class(name: &str, methods: Vec<Declaration>) -> ClassInfo {
        ClassInfo {
            name: name.to_string(),
            line: 1,
            methods,
        }
    }

    #[test]
    fn test_undocumented_and_oversized_method() {
        let inventory = FileInventory {
            language: Language::Python,
            classes: vec![class(
                "Foo",
                vec![
                    method("Foo", "bar", false, Some(25)),
                    method("Foo", "baz", true, Some(3)),
                ],
            )],
            functions: vec![],
            parse_error: None,
        };

        let messages: Vec<_> = detect_smells(&inventory)
            .into_iter()
            .map(|i| i.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Method `bar` in class `Foo` has no docstring.",
                "Method `bar` in class `Foo` is too long (>20 lines).",
            ]
        );
    }

    #[test]
    fn test_empty_class_yields_single_issue() {
        let inventory = FileInventory {
            language: Language::Python,
            classes: vec![class("Marker", vec![])],
            functions: vec![],
            parse_error: None,
        };

        let issues = detect_smells(&inventory);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::EmptyClass);
        assert_eq!(issues[0].message, "Class `Marker` has no methods.");
    }

    #[test]
    fn test_order_classes_then_functions() {
        let inventory = FileInventory {
            language: Language::Python,
            classes: vec![
                class("A", vec![method("A", "a", false, Some(1))]),
                class("B", vec![]),
            ],
            functions: vec![function("f", false), function("g", true)],
            parse_error: None,
        };

        let targets: Vec<_> = detect_smells(&inventory)
            .into_iter()
            .map(|i| i.target)
            .collect();
        assert_eq!(targets, vec!["A.a", "B", "f"]);
    }

    #[test]
    fn test_java_methods_are_never_oversized() {
        let inventory = FileInventory {
            language: Language::Java,
            classes: vec![class("Account", vec![method("Account", "deposit", false, None)])],
            functions: vec![],
            parse_error: None,
        };

        let issues = detect_smells(&inventory);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Method `deposit` in class `Account` has no Javadoc."
        );
    }

    #[test]
    fn test_boundary_is_exclusive() {
        assert!(!is_oversized(&method("A", "m", true, Some(20))));
        assert!(is_oversized(&method("A", "m", true, Some(21))));
        assert!(!is_oversized(&method("A", "m", true, None)));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let inventory = FileInventory {
            language: Language::Python,
            classes: vec![class("A", vec![method("A", "x", false, Some(30))])],
            functions: vec![function("f", false)],
            parse_error: None,
        };
        assert_eq!(detect_smells(&inventory), detect_smells(&inventory));
    }
}
