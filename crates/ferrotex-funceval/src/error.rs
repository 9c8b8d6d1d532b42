use crate::ir::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("unbalanced `{marker}` at byte {position}")]
    UnbalancedDelimiter { marker: String, position: usize },

    #[error("`{marker}` at byte {position} expects a second argument opening with `{expected}`")]
    MissingArgument {
        marker: String,
        position: usize,
        expected: char,
    },

    #[error("unbalanced parentheses in argument list `{args}`")]
    MalformedArgumentList { args: String },

    #[error("name `{name}` is too long (limit {max})")]
    NameTooLong { name: String, max: usize },

    #[error("`{name}` is not a valid function name")]
    InvalidFunctionName { name: String },
}

impl TranslateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::UnbalancedDelimiter { .. } => ErrorKind::UnbalancedDelimiter,
            TranslateError::MissingArgument { .. } => ErrorKind::MissingArgument,
            TranslateError::MalformedArgumentList { .. } => ErrorKind::MalformedArgumentList,
            TranslateError::NameTooLong { .. } => ErrorKind::NameTooLong,
            TranslateError::InvalidFunctionName { .. } => ErrorKind::InvalidFunctionName,
        }
    }
}

/// Failures reading the function registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read function registry {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected `name - arity - marker`, found `{text}`")]
    MalformedRecord { line: usize, text: String },

    #[error("line {line}: arity `{value}` is not a non-negative integer")]
    InvalidArity { line: usize, value: String },
}
