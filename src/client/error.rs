use thiserror::Error;

use crate::shared::conflict::ConflictReport;

/// Errors returned by [`BoardClient`](super::BoardClient)
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable response body
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body
    #[error("Request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// The server rejected a versioned write
    #[error("Conflict detected at version {}", .0.current_version)]
    Conflict(Box<ConflictReport>),

    /// An authenticated call was made before register or login
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A board event could not be decoded
    #[error("Invalid event payload: {0}")]
    Event(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Conflict(_) => Some(409),
            Self::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
