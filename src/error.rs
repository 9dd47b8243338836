//! Error type shared by the library and the CLI.

use thiserror::Error;

/// Everything that can go wrong while loading or analyzing a corpus.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No term or pair observations to estimate probabilities from.
    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    /// Dictionary entry shorter than the wildcard prefix length.
    #[error("Dictionary entry {entry:?} is shorter than the prefix size {prefix_size}")]
    DictionaryEntryTooShort { entry: String, prefix_size: usize },

    /// Malformed LIWC dictionary file.
    #[error("Dictionary format error on line {line}: {message}")]
    DictionaryFormat { line: usize, message: String },

    /// Invalid option value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two collections that must be aligned differ in length.
    #[error("Length mismatch: {left} {left_len} vs {right} {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failure reported by a search-index backend.
    #[error("Scroll error: {0}")]
    Scroll(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
