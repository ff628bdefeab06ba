use log::info;
use rouille::{Request, Response};

use crate::{
    config::HttpConfig,
    domain::track::TrackReference,
    http::error::ApiError,
    oembed::EmbedFetcher,
    render::{client::ClientRenderer, server::ServerRenderer},
};

pub struct HttpServer<F> {
    renderer: ServerRenderer<F>,
    client: ClientRenderer,
    pub config: HttpConfig,
}

impl<F: EmbedFetcher> HttpServer<F> {
    pub fn new(renderer: ServerRenderer<F>, client: ClientRenderer, config: HttpConfig) -> Self {
        Self {
            renderer,
            client,
            config,
        }
    }

    pub fn run(self)
    where
        F: Send + Sync + 'static,
    {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let result = rouille::router!(request,
            (GET) (/embed) => {
                self.handle_embed(request)
            },
            (GET) (/client) => {
                self.handle_client_page(request)
            },
            (GET) (/client/settings) => {
                self.handle_client_settings(request)
            },
            _ => Err(ApiError::NotFound("not found".into()))
        );
        let response = result.unwrap_or_else(ApiError::into_response);

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    /// All `url` query parameters, in order.
    fn tracks(request: &Request) -> Result<Vec<TrackReference>, ApiError> {
        let tracks: Vec<_> = url::form_urlencoded::parse(request.raw_query_string().as_bytes())
            .filter(|(key, _)| key == "url")
            .map(|(_, value)| TrackReference::new(value.into_owned()))
            .filter(|track| !track.as_str().is_empty())
            .collect();

        if tracks.is_empty() {
            return Err(ApiError::BadRequest("missing url parameter".into()));
        }
        Ok(tracks)
    }

    /// Server-rendered players, one block per item.
    fn handle_embed(&self, request: &Request) -> Result<Response, ApiError> {
        let tracks = Self::tracks(request)?;

        let items = self
            .renderer
            .render(&tracks)
            .into_iter()
            .map(|markup| format!(r#"<div class="soundfield-item">{markup}</div>"#))
            .collect::<Vec<_>>()
            .join("\n");

        let template = include_str!("../../html/embed.html");
        Ok(Response::html(template.replace("{{ITEMS}}", &items)))
    }

    /// Placeholders plus the settings payload for the page initializer.
    fn handle_client_page(&self, request: &Request) -> Result<Response, ApiError> {
        let render = self.client.render(&Self::tracks(request)?);

        let template = include_str!("../../html/client.html");
        Ok(Response::html(
            template
                .replace("{{PLACEHOLDERS}}", &render.placeholders.join("\n"))
                .replace("{{SETTINGS}}", &render.settings_script()?),
        ))
    }

    fn handle_client_settings(&self, request: &Request) -> Result<Response, ApiError> {
        let render = self.client.render(&Self::tracks(request)?);
        Ok(Response::json(&render.payload))
    }
}
