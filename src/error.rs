//! Error types shared across the library.

use thiserror::Error;

use crate::analysis::Language;

/// Errors raised while turning source text into a syntax tree.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to load {language} grammar: {message}")]
    Grammar { language: Language, message: String },
    #[error("{language} parser produced no tree for {path}")]
    NoTree { language: Language, path: String },
    #[error("{path}: invalid {language} syntax near line {line}")]
    Syntax {
        language: Language,
        path: String,
        line: usize,
    },
}

/// Errors raised while collecting source inputs.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid archive {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("{path}: walk failed: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
    #[error("no Python or Java source files found in {0}")]
    NoSourceFiles(String),
    #[error("unsupported input {0}: expected a .py or .java file, a directory, or a .zip archive")]
    Unsupported(String),
}
