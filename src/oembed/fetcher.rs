use log::debug;

use crate::{config::OEmbedConfig, domain::track::TrackReference};

use super::{EmbedFetcher, decode, error::OEmbedError, request_url};

/// Blocking oEmbed client, one GET per embed and no retries.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpFetcher {
    pub fn new(config: &OEmbedConfig) -> Result<Self, OEmbedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl EmbedFetcher for HttpFetcher {
    fn fetch(&self, track: &TrackReference) -> Result<String, OEmbedError> {
        let url = request_url(&self.endpoint, track);
        debug!("GET {url}");

        let body = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .text()?;

        decode(&body)
    }
}
