use reqwest::StatusCode;
use thiserror::Error;

/// The one message the dashboard ever shows for a failed lookup.
pub const LOOKUP_FAILED_MESSAGE: &str = "City not found. Please try again.";

/// Why a weather lookup failed.
///
/// The variants exist for logging only: every one of them is presented to the
/// user as [`LOOKUP_FAILED_MESSAGE`].
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to reach weather provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather provider returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode weather payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("weather payload is missing {0}")]
    Incomplete(&'static str),
}

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        LOOKUP_FAILED_MESSAGE
    }
}
