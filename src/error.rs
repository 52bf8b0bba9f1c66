use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// A pattern matcher could not answer.
#[derive(Debug, Error)]
#[error("pattern matcher failed on {pattern}: {message}")]
pub struct MatchError {
    pub pattern: String,
    pub message: String,
}

impl MatchError {
    pub fn new(pattern: impl ToString, message: impl Into<String>) -> Self {
        MatchError { pattern: pattern.to_string(), message: message.into() }
    }
}

/// The action-state provider could not report what is going on.
#[derive(Debug, Error)]
#[error("action state unavailable: {0}")]
pub struct ActionStateError(pub String);

/// Failure of a single resolution attempt. No partial result is produced.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    ActionState(#[from] ActionStateError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResumeError {
    #[error("handler dropped its resume token without resuming")]
    Abandoned,
}
