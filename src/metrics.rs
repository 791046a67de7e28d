//! Simple size and documentation metrics for one file.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::FileInventory;
use crate::detect::is_oversized;

/// Counts derived from the raw source and its inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Non-blank lines in the raw source text.
    pub lines_of_code: usize,
    pub classes: usize,
    pub methods: usize,
    pub functions: usize,
    /// Methods plus functions.
    pub declarations: usize,
    /// Methods and functions without documentation.
    pub undocumented: usize,
    /// Methods over the statement limit.
    pub oversized: usize,
}

impl Metrics {
    /// Label to count mapping, in a stable order.
    pub fn as_map(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("lines_of_code", self.lines_of_code),
            ("classes", self.classes),
            ("methods", self.methods),
            ("functions", self.functions),
            ("declarations", self.declarations),
            ("undocumented", self.undocumented),
            ("oversized", self.oversized),
        ])
    }

    /// Percentage of documented declarations, or None when there are none.
    pub fn documented_percent(&self) -> Option<usize> {
        if self.declarations == 0 {
            return None;
        }
        let documented = self.declarations - self.undocumented;
        Some(documented * 100 / self.declarations)
    }
}

/// Count non-blank lines. Not token-aware: comment lines count too.
pub fn count_lines_of_code(source: &str) -> usize {
    source.lines().filter(|l| !l.trim().is_empty()).count()
}

/// Compute metrics for a file.
///
/// The undocumented count does not depend on smell detection having run.
pub fn compute_metrics(source: &str, inventory: &FileInventory) -> Metrics {
    let methods = inventory.method_count();
    let functions = inventory.functions.len();

    Metrics {
        lines_of_code: count_lines_of_code(source),
        classes: inventory.classes.len(),
        methods,
        functions,
        declarations: methods + functions,
        undocumented: inventory
            .declarations()
            .filter(|d| !d.has_documentation())
            .count(),
        oversized: inventory.methods().filter(|m| is_oversized(m)).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{extract, Language};

    #[test]
    fn test_lines_of_code_ignores_blank_lines() {
        let source = "a = 1\n\n   \n# comment\n\tb = 2\n";
        assert_eq!(count_lines_of_code(source), 3);
        assert_eq!(count_lines_of_code(""), 0);
    }

    #[test]
    fn test_lines_of_code_independent_of_inventory() {
        let source = "x = 1\n\ny = 2\n";
        let python = extract(source, Language::Python).unwrap();
        let empty = crate::analysis::FileInventory::empty(Language::Java);
        assert_eq!(compute_metrics(source, &python).lines_of_code, 2);
        assert_eq!(compute_metrics(source, &empty).lines_of_code, 2);
    }

    #[test]
    fn test_counts_over_inventory() {
        let mut body = String::new();
        for i in 0..25 {
            body.push_str(&format!("        x{} = {}\n", i, i));
        }
        let source = format!(
            "class Foo:\n    def bar(self):\n{}\n    def baz(self):\n        \"\"\"Doc.\"\"\"\n        a = 1\n        return a\n",
            body
        );
        let inventory = extract(&source, Language::Python).unwrap();
        let metrics = compute_metrics(&source, &inventory);

        assert_eq!(metrics.classes, 1);
        assert_eq!(metrics.methods, 2);
        assert_eq!(metrics.functions, 0);
        assert_eq!(metrics.undocumented, 1);
        assert_eq!(metrics.oversized, 1);
        assert_eq!(metrics.documented_percent(), Some(50));

        let map = metrics.as_map();
        assert_eq!(map["classes"], 1);
        assert_eq!(map["methods"], 2);
        assert_eq!(map["undocumented"], 1);
        assert_eq!(map["oversized"], 1);
    }
}
