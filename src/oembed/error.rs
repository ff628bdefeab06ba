use thiserror::Error;

use crate::player::markup::MarkupError;

/// Every way an embed can fail to load. All of them end up as the same
/// "not available" message at the render boundary.
#[derive(Debug, Error)]
pub enum OEmbedError {
    #[error("oEmbed request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("oEmbed endpoint returned an empty body")]
    EmptyResponse,

    #[error("malformed oEmbed response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for OEmbedError {
    fn from(err: serde_json::Error) -> Self {
        OEmbedError::Decode(err.to_string())
    }
}

impl From<MarkupError> for OEmbedError {
    fn from(err: MarkupError) -> Self {
        OEmbedError::Decode(err.to_string())
    }
}
