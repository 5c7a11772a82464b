use thiserror::Error;

/// Requests the session refuses without changing any state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),
    #[error("a world is already being generated")]
    GenerationInProgress,
    #[error("there is no current world")]
    NoCurrentWorld,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("content service is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Gemini API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("empty response from content service")]
    EmptyResponse,
    #[error("failed to parse world data: {0}")]
    Parse(#[from] serde_json::Error),
}
