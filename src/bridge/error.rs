// Tue Jan 20 2026 - Alex

use thiserror::Error;

/// Failures of a single proxy call
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No object bound with name: {0}")]
    UnboundName(String),

    #[error("No method {method}({signature}) on {object}")]
    MethodNotFound {
        object: String,
        method: String,
        signature: String,
    },

    #[error("Error calling method {method} on {object}: {cause}")]
    DispatchFailure {
        object: String,
        method: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("Invalid call arguments: {0}")]
    BadArguments(String),
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::UnboundName(_) => "UnboundName",
            DispatchError::MethodNotFound { .. } => "MethodNotFound",
            DispatchError::DispatchFailure { .. } => "DispatchFailure",
            DispatchError::BadArguments(_) => "BadArguments",
        }
    }
}

/// Failures of the embedded engine itself
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    #[error("Engine initialization failed: {0}")]
    Init(String),

    #[error("{0}")]
    Exception(String),

    #[error("Runtime is closed")]
    Closed,
}

/// The single failure type `evaluate` surfaces to callers
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("No RESULT marker found in JavaScript output: {output}")]
    NoResultMarker { output: String },

    #[error("Empty result from JavaScript execution")]
    EmptyResult,

    #[error("JSON parsing error: {source} for input: {text}")]
    MalformedResult {
        text: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JavaScript runtime unavailable: {0}")]
    RuntimeSubmissionFailure(#[from] RuntimeError),

    #[error("Bytecode is not valid UTF-8 source: {0}")]
    InvalidBytecode(#[from] std::string::FromUtf8Error),

    #[error("Bridge is closed")]
    Closed,
}

pub type EvaluationResult<T> = Result<T, EvaluationError>;
