//! Remediation advice derived from detected issues.

use std::collections::BTreeSet;

use super::{Issue, IssueCategory, Recommendation};

/// The fixed advisory sentence for a category.
pub fn recommendation_for(category: IssueCategory) -> Recommendation {
    let text = match category {
        IssueCategory::MissingDoc => {
            "Document every function and method with a docstring or Javadoc comment describing its purpose, parameters and return value."
        }
        IssueCategory::EmptyClass => {
            "Review classes without methods: remove them, merge them into a related class, or turn them into a plain data structure."
        }
        IssueCategory::OversizedMethod => {
            "Split long methods into smaller helper functions that each do one thing."
        }
    };
    Recommendation { category, text }
}

/// One recommendation per distinct issue category.
pub fn recommend(issues: &[Issue]) -> BTreeSet<Recommendation> {
    issues
        .iter()
        .map(|issue| recommendation_for(issue.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(category: IssueCategory, target: &str) -> Issue {
        Issue {
            category,
            message: format!("{} on {}", category, target),
            target: target.to_string(),
            line: 1,
        }
    }

    #[test]
    fn test_recommendations_are_deduplicated() {
        let issues = vec![
            issue(IssueCategory::MissingDoc, "a"),
            issue(IssueCategory::MissingDoc, "b"),
        ];
        let recs = recommend(&issues);
        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs.iter().next().unwrap().category,
            IssueCategory::MissingDoc
        );
    }

    #[test]
    fn test_one_per_category() {
        let issues = vec![
            issue(IssueCategory::OversizedMethod, "A.x"),
            issue(IssueCategory::EmptyClass, "B"),
            issue(IssueCategory::MissingDoc, "A.x"),
            issue(IssueCategory::EmptyClass, "C"),
        ];
        let categories: Vec<_> = recommend(&issues).into_iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                IssueCategory::MissingDoc,
                IssueCategory::EmptyClass,
                IssueCategory::OversizedMethod
            ]
        );
    }

    #[test]
    fn test_no_issues_no_recommendations() {
        assert!(recommend(&[]).is_empty());
    }
}
