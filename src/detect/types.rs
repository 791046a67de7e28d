//! Core types for detection results.

use serde::Serialize;

/// Categories of style issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IssueCategory {
    #[serde(rename = "missing_doc")]
    MissingDoc,
    #[serde(rename = "empty_class")]
    EmptyClass,
    #[serde(rename = "oversized_method")]
    OversizedMethod,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::MissingDoc => "missing_doc",
            IssueCategory::EmptyClass => "empty_class",
            IssueCategory::OversizedMethod => "oversized_method",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub category: IssueCategory,
    /// Rendered, human-readable description.
    pub message: String,
    /// `Class.method`, `Class` or `function`.
    pub target: String,
    /// Line of the offending declaration (1-indexed).
    pub line: usize,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A generic remediation sentence for one issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Recommendation {
    pub category: IssueCategory,
    pub text: &'static str,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_tag() {
        let json = serde_json::to_string(&IssueCategory::OversizedMethod).unwrap();
        assert_eq!(json, "\"oversized_method\"");
    }
}
