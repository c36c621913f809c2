use thiserror::Error;

/// Errors produced by the orchestration core.
///
/// `Validation` and `MissingCredential` are raised before any network
/// I/O; `Remote` covers transport failures, non-2xx statuses and
/// malformed or empty responses from either AI service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("Gemini API key is missing. Run `postforge set-key <KEY>` to configure it.")]
    MissingCredential,
    #[error("remote service error: {0}")]
    Remote(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Error::Remote(msg.into())
    }
}
