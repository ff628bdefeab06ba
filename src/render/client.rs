//! Script-rendered players: a placeholder per item plus a settings payload
//! the page initializer turns into embeds.

use std::{num::NonZeroU32, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{
    settings::{ClientPlayerSettings, Color},
    track::TrackReference,
};

/// Booleans travel as the strings `"true"` / `"false"`.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(D::Error::custom(format!("expected \"true\" or \"false\", got {other:?}"))),
        }
    }
}

/// Per-item payload consumed by the page initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEmbedSettings {
    pub id: String,
    pub url: String,
    #[serde(with = "flag")]
    pub autoplay: bool,
    pub maxheight: NonZeroU32,
    #[serde(with = "flag")]
    pub showartwork: bool,
    #[serde(with = "flag")]
    pub showplaycount: bool,
    pub color: Color,
}

static INVALID_ID_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\x{002D}\x{0030}-\x{0039}\x{0041}-\x{005A}\x{005F}\x{0061}-\x{007A}\x{00A1}-\x{FFFF}]")
        .expect("valid identifier regex")
});

/// Turns a track URL into a usable CSS identifier.
pub fn css_identifier(value: &str) -> String {
    let replaced: String = value
        .chars()
        .filter(|c| *c != ']')
        .map(|c| match c {
            ' ' | '_' | '/' | '[' => '-',
            c => c,
        })
        .collect();
    let cleaned = INVALID_ID_CHARS.replace_all(&replaced, "");

    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", &cleaned[1..])
    } else if cleaned.starts_with("--")
        || (cleaned.starts_with('-') && cleaned[1..].starts_with(|c: char| c.is_ascii_digit()))
    {
        format!("__{}", &cleaned[2..])
    } else {
        cleaned.into_owned()
    }
}

/// Placeholders and payload for a list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRender {
    pub placeholders: Vec<String>,
    pub payload: Vec<ClientEmbedSettings>,
}

impl ClientRender {
    pub fn payload_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.payload)
    }

    /// The payload as an inline JSON script block for the page.
    pub fn settings_script(&self) -> Result<String, serde_json::Error> {
        let json = self.payload_json()?.replace("</", "<\\/");
        Ok(format!(
            r#"<script type="application/json" data-soundfield-settings>{json}</script>"#
        ))
    }
}

pub fn placeholder(id: &str) -> String {
    filled_placeholder(id, "")
}

/// A placeholder after the initializer has written `content` into it.
pub fn filled_placeholder(id: &str, content: &str) -> String {
    format!(r#"<div class="soundfield-js-embed-wrapper"><div id="{id}">{content}</div></div>"#)
}

/// Renders field items as empty placeholders for the page initializer.
pub struct ClientRenderer {
    settings: ClientPlayerSettings,
}

impl ClientRenderer {
    pub fn new(settings: ClientPlayerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ClientPlayerSettings {
        &self.settings
    }

    pub fn embed_settings(&self, track: &TrackReference) -> ClientEmbedSettings {
        ClientEmbedSettings {
            id: css_identifier(track.as_str()),
            url: track.to_string(),
            autoplay: self.settings.autoplay,
            maxheight: self.settings.height_for(track.kind()),
            showartwork: self.settings.show_artwork,
            showplaycount: self.settings.show_playcount,
            color: self.settings.color.clone(),
        }
    }

    pub fn render(&self, items: &[TrackReference]) -> ClientRender {
        let payload: Vec<_> = items.iter().map(|t| self.embed_settings(t)).collect();
        let placeholders = payload.iter().map(|s| placeholder(&s.id)).collect();

        ClientRender {
            placeholders,
            payload,
        }
    }
}
