use log::debug;
use quick_xml::escape::escape;

use crate::{
    domain::{settings::PlayerSettings, track::TrackReference},
    oembed::{EmbedFetcher, EmbedResult, error::OEmbedError},
    player::{height, rewrite::rewrite_embed},
};

use super::sanitize::retain_iframes;

/// Summary shown next to the formatter settings.
pub const SETTINGS_SUMMARY: &str = "Displays the SoundCloud player.";

/// Text shown in place of a player whose embed could not be loaded.
pub fn unavailable_message(source_url: &str) -> String {
    let url = escape(source_url);
    format!(
        r#"The SoundCloud content at <a href="{url}">{url}</a> is not available, or it is set to private."#
    )
}

/// Renders field items by fetching and rewriting each embed synchronously.
pub struct ServerRenderer<F> {
    fetcher: F,
    settings: PlayerSettings,
}

impl<F: EmbedFetcher> ServerRenderer<F> {
    pub fn new(fetcher: F, settings: PlayerSettings) -> Self {
        Self { fetcher, settings }
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    /// Fetches and rewrites the embed for one item.
    pub fn embed(&self, track: &TrackReference) -> EmbedResult {
        let resolved = height::resolve(track, &self.settings);

        let outcome = self.fetcher.fetch(track).and_then(|html| {
            rewrite_embed(&html, self.settings.width, resolved.height, &self.settings)
                .map_err(OEmbedError::from)
        });

        EmbedResult::from_outcome(track, outcome)
    }

    /// Final markup for one item: the player, or the unavailable message.
    pub fn render_item(&self, track: &TrackReference) -> String {
        match self.embed(track) {
            EmbedResult::Success { html } => retain_iframes(&html),
            EmbedResult::Unavailable { source_url } => unavailable_message(&source_url),
        }
    }

    /// Renders items one after another, in order.
    pub fn render(&self, items: &[TrackReference]) -> Vec<String> {
        debug!("rendering {} item(s) server-side", items.len());
        items.iter().map(|track| self.render_item(track)).collect()
    }
}
