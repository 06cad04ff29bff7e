//! @ai:module:intent Define the error taxonomy of an evaluation run
//! @ai:module:layer domain
//! @ai:module:public_api EvalError, ErrorKind, Result
//! @ai:module:stateless true

use crate::corpus::ChainType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for record loading and classification
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("malformed input for {package}: {message}")]
    MalformedInput { package: String, message: String },

    #[error("no scanner report for {chain}/{package}")]
    MissingReport { chain: ChainType, package: String },

    #[error(
        "inconsistent counts in {package}->{module}: {message} (benchmark={benchmark}, detected={detected}, total={total})"
    )]
    InconsistentCount {
        package: String,
        module: String,
        benchmark: u64,
        detected: u64,
        total: u64,
        message: String,
    },

    #[error("invalid annotation {package}->{module}::{function} [{category}]: {message}")]
    InvalidAnnotation {
        package: String,
        module: String,
        function: String,
        category: String,
        message: String,
    },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EvalError {
    /// @ai:intent Classify the error for reporting and policy decisions
    /// @ai:effects pure
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::MalformedInput { .. } => ErrorKind::MalformedInput,
            EvalError::MissingReport { .. } => ErrorKind::MissingReport,
            EvalError::InconsistentCount { .. } => ErrorKind::InconsistentCount,
            EvalError::InvalidAnnotation { .. } => ErrorKind::InvalidAnnotation,
            EvalError::FileRead { .. } => ErrorKind::Io,
        }
    }

    /// @ai:intent Whether the error must abort the whole run rather than one unit
    /// @ai:effects pure
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvalError::InvalidAnnotation { .. })
    }

    /// @ai:intent Shorthand for a malformed-input error
    /// @ai:effects pure
    pub fn malformed(package: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::MalformedInput {
            package: package.into(),
            message: message.into(),
        }
    }
}

/// @ai:intent Serializable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MalformedInput,
    MissingReport,
    InconsistentCount,
    InvalidAnnotation,
    Io,
}

impl ErrorKind {
    /// @ai:intent Convert kind to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::MissingReport => "missing_report",
            ErrorKind::InconsistentCount => "inconsistent_count",
            ErrorKind::InvalidAnnotation => "invalid_annotation",
            ErrorKind::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
