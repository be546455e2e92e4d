use shared::error::ApiException;
use thiserror::Error;

/// Shown when a failed question carries no usable message.
pub const QUESTION_FAILED_MESSAGE: &str = "Sorry, there was an error processing your question.";
/// Shown when the question endpoint answers with a non-2xx status and no `error` field.
pub const QUESTION_STATUS_FALLBACK: &str = "Failed to get answer";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned status {status}")]
    Status { status: u16, message: Option<String> },
    #[error(transparent)]
    Application(#[from] ApiException),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Text written to the answer panel after a failed question.
    pub fn question_failure_message(&self) -> String {
        let message = match self {
            Self::Status { message, .. } => message
                .clone()
                .unwrap_or_else(|| QUESTION_STATUS_FALLBACK.to_string()),
            Self::Application(err) => err.message.clone(),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            QUESTION_FAILED_MESSAGE.to_string()
        } else {
            message
        }
    }
}
