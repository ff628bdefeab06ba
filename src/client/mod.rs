//! Page-side initializer for script-rendered players.
//!
//! Initializes the provider once per page, then fills every placeholder in
//! the attached region with a player. A placeholder is only ever processed
//! once, however many times `attach` runs over it.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use futures_util::future::join_all;
use log::{debug, warn};

use crate::{
    domain::track::TrackReference,
    oembed::{
        error::OEmbedError,
        provider::{EmbedProvider, EmbedRequest},
    },
    player::rewrite::{RewriteParameters, rewrite},
    render::{client::ClientEmbedSettings, sanitize::retain_iframes},
};

/// One-shot gate for provider initialization. Never resets.
#[derive(Debug, Default)]
pub struct InitState(AtomicBool);

impl InitState {
    /// Returns `true` for exactly one caller, the first.
    pub fn begin(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_initialized(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A page region holding placeholder elements.
pub trait PlaceholderSink {
    fn has_placeholder(&self, id: &str) -> bool;

    /// Replaces the content of the placeholder `id`.
    fn replace_content(&self, id: &str, html: String);
}

/// Placeholder contents kept in memory, keyed by element id.
#[derive(Debug, Default)]
pub struct InMemoryPage {
    slots: Mutex<BTreeMap<String, String>>,
}

impl InMemoryPage {
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let slots = ids
            .into_iter()
            .map(|id| (id.to_string(), String::new()))
            .collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    pub fn content(&self, id: &str) -> Option<String> {
        self.slots.lock().ok()?.get(id).cloned()
    }
}

impl PlaceholderSink for InMemoryPage {
    fn has_placeholder(&self, id: &str) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.contains_key(id))
            .unwrap_or(false)
    }

    fn replace_content(&self, id: &str, html: String) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(id.to_string(), html);
        }
    }
}

pub struct ClientInitializer<P> {
    provider: P,
    init: InitState,
    processed: Mutex<HashSet<String>>,
}

impl<P: EmbedProvider> ClientInitializer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            init: InitState::default(),
            processed: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.init.is_initialized()
    }

    /// Marks `id` as processed. Returns `false` if it already was.
    fn claim(&self, id: &str) -> bool {
        self.processed
            .lock()
            .map(|mut processed| processed.insert(id.to_string()))
            .unwrap_or(false)
    }

    /// Embeds a player into every unprocessed placeholder of `region`.
    ///
    /// Requests run concurrently and each placeholder is written as soon as
    /// its own embed arrives. Returns the number of players inserted.
    pub async fn attach<S: PlaceholderSink>(
        &self,
        region: &S,
        items: &[ClientEmbedSettings],
    ) -> usize {
        if self.init.begin() {
            self.provider.initialize();
        }

        let pending = items
            .iter()
            .filter(|settings| region.has_placeholder(&settings.id))
            .filter(|settings| self.claim(&settings.id))
            .map(|settings| self.embed_into(region, settings));

        join_all(pending)
            .await
            .into_iter()
            .filter(|inserted| *inserted)
            .count()
    }

    async fn embed_into<S: PlaceholderSink>(
        &self,
        region: &S,
        settings: &ClientEmbedSettings,
    ) -> bool {
        let track = TrackReference::new(settings.url.as_str());
        debug!("requesting embed for #{} ({track})", settings.id);

        match self.player_markup(&track, settings).await {
            Ok(html) => {
                region.replace_content(&settings.id, retain_iframes(&html));
                true
            }
            Err(err) => {
                warn!("embed for {track} is unavailable: {err}");
                false
            }
        }
    }

    async fn player_markup(
        &self,
        track: &TrackReference,
        settings: &ClientEmbedSettings,
    ) -> Result<String, OEmbedError> {
        let request = EmbedRequest::from(settings);
        let html = self.provider.oembed(track, &request).await?;

        let params = RewriteParameters {
            width: None,
            height: settings.maxheight,
            auto_play: None,
            show_comments: None,
            show_playcount: None,
            show_artwork: None,
            color: Some(settings.color.clone()),
            visual: None,
        };
        Ok(rewrite(&html, &params)?)
    }
}
