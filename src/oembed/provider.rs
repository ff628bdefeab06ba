//! Asynchronous embed provider used by the client-side initializer.

use std::num::NonZeroU32;

use log::{debug, info};

use crate::{
    config::OEmbedConfig,
    domain::{
        settings::{ClientPlayerSettings, Color},
        track::TrackReference,
    },
    render::client::ClientEmbedSettings,
};

use super::{decode, error::OEmbedError, request_url};

/// Player options sent along with a client-side embed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRequest {
    pub auto_play: bool,
    pub maxheight: NonZeroU32,
    pub show_artwork: bool,
    pub show_playcount: bool,
    pub color: Color,
}

impl EmbedRequest {
    pub fn new(settings: &ClientPlayerSettings, maxheight: NonZeroU32) -> Self {
        Self {
            auto_play: settings.autoplay,
            maxheight,
            show_artwork: settings.show_artwork,
            show_playcount: settings.show_playcount,
            color: settings.color.clone(),
        }
    }

    fn query(&self) -> String {
        format!(
            "&auto_play={}&maxheight={}&show_artwork={}&show_playcount={}&color={}",
            self.auto_play, self.maxheight, self.show_artwork, self.show_playcount, self.color
        )
    }
}

impl From<&ClientEmbedSettings> for EmbedRequest {
    fn from(settings: &ClientEmbedSettings) -> Self {
        Self {
            auto_play: settings.autoplay,
            maxheight: settings.maxheight,
            show_artwork: settings.showartwork,
            show_playcount: settings.showplaycount,
            color: settings.color.clone(),
        }
    }
}

/// The provider's embed API as seen from a page.
#[allow(async_fn_in_trait)]
pub trait EmbedProvider {
    /// One-time setup, called before the first embed request.
    fn initialize(&self);

    /// Requests the embed fragment for `track`.
    async fn oembed(
        &self,
        track: &TrackReference,
        request: &EmbedRequest,
    ) -> Result<String, OEmbedError>;
}

/// [`EmbedProvider`] backed by the oEmbed HTTP endpoint.
pub struct AsyncHttpProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl AsyncHttpProvider {
    pub fn new(config: &OEmbedConfig) -> Result<Self, OEmbedError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl EmbedProvider for AsyncHttpProvider {
    fn initialize(&self) {
        info!("embed provider initialized for {}", self.endpoint);
    }

    async fn oembed(
        &self,
        track: &TrackReference,
        request: &EmbedRequest,
    ) -> Result<String, OEmbedError> {
        let url = format!("{}{}", request_url(&self.endpoint, track), request.query());
        debug!("GET {url}");

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oembed::stub::StubEndpoint;

    fn request() -> EmbedRequest {
        EmbedRequest {
            auto_play: true,
            maxheight: NonZeroU32::new(450).unwrap(),
            show_artwork: false,
            show_playcount: true,
            color: Color::parse("336699").unwrap(),
        }
    }

    fn provider(endpoint: &StubEndpoint) -> AsyncHttpProvider {
        AsyncHttpProvider::new(&OEmbedConfig {
            endpoint: endpoint.url.clone(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_from_client_settings() {
        let settings = ClientPlayerSettings {
            autoplay: true,
            show_playcount: true,
            color: Color::parse("336699").unwrap(),
            ..Default::default()
        };

        assert_eq!(
            EmbedRequest::new(&settings, NonZeroU32::new(450).unwrap()),
            request()
        );
    }

    #[tokio::test]
    async fn test_oembed_sends_player_options() {
        let endpoint = StubEndpoint::start(200, r#"{"html":"<iframe src=\"https://w/\"></iframe>"}"#);

        let html = provider(&endpoint)
            .oembed(&"https://soundcloud.com/a/b".into(), &request())
            .await
            .unwrap();

        assert_eq!(html, r#"<iframe src="https://w/"></iframe>"#);
        assert_eq!(
            endpoint.requests(),
            vec![
                "/oembed?iframe=true&format=json&url=https%3A%2F%2Fsoundcloud.com%2Fa%2Fb\
                 &auto_play=true&maxheight=450&show_artwork=false&show_playcount=true&color=336699"
            ]
        );
    }

    #[tokio::test]
    async fn test_oembed_server_error() {
        let endpoint = StubEndpoint::start(500, "boom");

        let result = provider(&endpoint)
            .oembed(&"https://soundcloud.com/a/b".into(), &request())
            .await;

        assert!(matches!(result, Err(OEmbedError::Fetch(_))), "{result:?}");
    }
}
