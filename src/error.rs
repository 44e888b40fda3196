//! Error taxonomy. None of these ever reach the player: fetch errors turn into an
//! offline joke, log and speech errors turn into a no-op. They exist so callers and
//! tests can see *why* a fallback happened.

use thiserror::Error;

/// Why a remote joke could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("simulated chaos failure")]
    ChaosFailure,
}

/// Failure appending to the session log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a text-to-speech backend.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("no speech backend available")]
    Unavailable,

    #[error("speech backend failed: {0}")]
    Backend(String),
}

impl From<std::io::Error> for SpeechError {
    fn from(err: std::io::Error) -> Self {
        SpeechError::Backend(err.to_string())
    }
}
