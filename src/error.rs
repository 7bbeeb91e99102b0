use thiserror::Error;

/// Errors raised while validating or executing dance programs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DanceError {
    #[error("invalid instruction {token:?} at index {index}")]
    InvalidToken { token: char, index: usize },

    #[error("unbalanced loops at index {index} ({unclosed} left open)")]
    UnbalancedLoops { index: usize, unclosed: usize },

    #[error("trace tail {tail:?} does not continue the repeating unit {unit:?}")]
    MalformedAutoComplete { unit: String, tail: String },
}

pub type Result<T> = std::result::Result<T, DanceError>;
