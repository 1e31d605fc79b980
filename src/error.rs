//! Error types for grammar loading

use thiserror::Error;

/// Result type alias for grammar operations
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Grammar error types
///
/// Tokenizing a line never fails; these only come out of building,
/// registering and loading grammars.
#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid grammar file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("error compiling regex '{pattern}': {message} at offset {offset}")]
    Compile {
        pattern: String,
        message: String,
        offset: usize,
    },

    #[error("rule {rule}: {reason}")]
    Spec { rule: usize, reason: String },

    #[error("No such grammar: {0}")]
    UnknownGrammar(String),

    #[error("grammar has no name")]
    MissingName,
}

impl SyntaxError {
    pub(crate) fn spec(rule: usize, reason: impl Into<String>) -> Self {
        SyntaxError::Spec {
            rule,
            reason: reason.into(),
        }
    }
}
