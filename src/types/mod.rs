use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

#[derive(Deserialize, Debug)]
pub struct ExecutionPayload {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
    pub input: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ExecutionResult {
    pub output: String,
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

/// Everything that can go wrong between receiving a payload and sending a
/// response. The HTTP layer maps each variant to a status code.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Language and code are required.")]
    InvalidRequest,
    #[error("Unsupported language.")]
    UnsupportedLanguage,
    #[error("failed to stage working files: {0}")]
    StagingError(std::io::Error),
    #[error("{0}")]
    CompileFailed(String),
    #[error("{0}")]
    RuntimeFailed(String),
    #[error("Code execution timed out.")]
    Timeout,
}
