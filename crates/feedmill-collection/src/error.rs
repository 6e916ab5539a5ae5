//! Collection-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl CollectionError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Url(_) => "Collection service address is misconfigured".to_string(),
            Self::Api { status, .. } => {
                format!("Collection service error ({}). Please try again.", status)
            }
            Self::InvalidResponse(_) => {
                "Collection service returned an unexpected response".to_string()
            }
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }
}
