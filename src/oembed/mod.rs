//! Fetching embed markup from the provider's oEmbed endpoint.

use log::warn;
use serde::Deserialize;

use crate::domain::track::TrackReference;

pub mod error;
pub mod fetcher;
pub mod provider;
#[cfg(test)]
pub(crate) mod stub;

use error::OEmbedError;

pub const DEFAULT_ENDPOINT: &str = "https://soundcloud.com/oembed";

/// Builds the oEmbed request URL for a track.
pub fn request_url(endpoint: &str, track: &TrackReference) -> String {
    format!(
        "{endpoint}?iframe=true&format=json&url={}",
        urlencoding::encode(track.as_str())
    )
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    html: String,
}

/// Extracts the embed fragment from an oEmbed JSON body.
pub fn decode(body: &str) -> Result<String, OEmbedError> {
    if body.trim().is_empty() {
        return Err(OEmbedError::EmptyResponse);
    }
    let response: OEmbedResponse = serde_json::from_str(body)?;
    Ok(response.html)
}

/// Outcome of rendering one embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedResult {
    Success { html: String },
    Unavailable { source_url: String },
}

impl EmbedResult {
    /// Collapses any failure into `Unavailable`, logging the cause.
    pub fn from_outcome(track: &TrackReference, outcome: Result<String, OEmbedError>) -> Self {
        match outcome {
            Ok(html) => EmbedResult::Success { html },
            Err(err) => {
                warn!("embed for {track} is unavailable: {err}");
                EmbedResult::Unavailable {
                    source_url: track.to_string(),
                }
            }
        }
    }
}

/// Synchronous source of embed fragments for the server-side renderer.
pub trait EmbedFetcher {
    /// Returns the provider's embed HTML for `track`.
    fn fetch(&self, track: &TrackReference) -> Result<String, OEmbedError>;
}
