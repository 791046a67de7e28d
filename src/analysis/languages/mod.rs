//! Language-specific analyzer implementations.

mod java;
mod python;

pub use java::JavaAnalyzer;
pub use python::PythonAnalyzer;
pub(crate) use python::undocumented_bodies;

use super::{Language, LanguageAnalyzer};
use once_cell::sync::OnceCell;

/// Static storage for Java analyzer.
static JAVA_ANALYZER: OnceCell<JavaAnalyzer> = OnceCell::new();

/// Static storage for Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Get the analyzer for a language, creating it on first use.
pub fn get_analyzer(language: Language) -> &'static dyn LanguageAnalyzer {
    match language {
        Language::Java => JAVA_ANALYZER.get_or_init(JavaAnalyzer::new),
        Language::Python => PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new),
    }
}

/// Get an analyzer for the given file extension (without dot).
///
/// Returns None if no analyzer handles the extension.
pub fn get_analyzer_for_extension(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    [Language::Python, Language::Java]
        .into_iter()
        .map(get_analyzer)
        .find(|analyzer| analyzer.handles_extension(ext))
}
