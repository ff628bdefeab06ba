//! Player settings resolved once per formatter instance.

use std::{fmt::Display, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::track::TrackKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid player color {0:?}, expected 6 hexadecimal digits")]
    InvalidColor(String),

    #[error("unsupported visual player height {height}, expected one of {allowed:?}")]
    UnsupportedHeight {
        height: u32,
        allowed: &'static [u32],
    },

    #[error("player width must be a positive percentage")]
    ZeroWidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    #[default]
    Classic,
    Visual,
}

/// Player color as six hex digits, without a leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub const DEFAULT: &'static str = "ff7700";

    /// An empty value falls back to the default color.
    pub fn parse(value: &str) -> Result<Self, SettingsError> {
        let value = value.trim();
        let hex = value.strip_prefix('#').unwrap_or(value);

        if hex.is_empty() {
            return Ok(Self::default());
        }
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(hex.to_string()))
        } else {
            Err(SettingsError::InvalidColor(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl TryFrom<String> for Color {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.0
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Height of the visual player, limited to the sizes the provider offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct VisualHeight(NonZeroU32);

impl VisualHeight {
    /// Sizes offered by the server-rendered player.
    pub const SERVER_OPTIONS: &'static [u32] = &[300, 450, 600];
    /// Sizes offered by the script-rendered player.
    pub const CLIENT_OPTIONS: &'static [u32] = &[300, 400, 450, 500, 600];

    pub fn new(height: u32, allowed: &'static [u32]) -> Result<Self, SettingsError> {
        match NonZeroU32::new(height) {
            Some(h) if allowed.contains(&height) => Ok(Self(h)),
            _ => Err(SettingsError::UnsupportedHeight { height, allowed }),
        }
    }

    pub fn get(self) -> NonZeroU32 {
        self.0
    }
}

impl Default for VisualHeight {
    fn default() -> Self {
        Self(NonZeroU32::new(300).unwrap_or(NonZeroU32::MIN))
    }
}

impl TryFrom<u32> for VisualHeight {
    type Error = SettingsError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value, Self::CLIENT_OPTIONS)
    }
}

impl From<VisualHeight> for u32 {
    fn from(value: VisualHeight) -> Self {
        value.0.get()
    }
}

fn px(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Settings of the server-rendered HTML5 player.
///
/// `hide_related` is carried for completeness but is not applied to the
/// embed markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerSettings {
    pub player_type: PlayerType,
    /// Width in percent.
    pub width: u32,
    pub height_track: NonZeroU32,
    pub height_set: NonZeroU32,
    pub visual_height: VisualHeight,
    pub autoplay: bool,
    pub color: Color,
    pub hide_related: bool,
    pub show_artwork: bool,
    pub show_comments: bool,
    pub show_playcount: bool,
}

impl PlayerSettings {
    pub const DEFAULT_WIDTH: u32 = 100;
    pub const DEFAULT_HEIGHT_TRACK: u32 = 166;
    pub const DEFAULT_HEIGHT_SET: u32 = 450;

    pub fn is_visual(&self) -> bool {
        self.player_type == PlayerType::Visual
    }

    /// Height of the classic player for the given kind of URL.
    pub fn classic_height(&self, kind: TrackKind) -> NonZeroU32 {
        match kind {
            TrackKind::Set => self.height_set,
            TrackKind::Track => self.height_track,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 {
            return Err(SettingsError::ZeroWidth);
        }
        VisualHeight::new(self.visual_height.get().get(), VisualHeight::SERVER_OPTIONS)?;
        Ok(())
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            player_type: PlayerType::Classic,
            width: Self::DEFAULT_WIDTH,
            height_track: px(Self::DEFAULT_HEIGHT_TRACK),
            height_set: px(Self::DEFAULT_HEIGHT_SET),
            visual_height: VisualHeight::default(),
            autoplay: false,
            color: Color::default(),
            hide_related: false,
            show_artwork: false,
            show_comments: true,
            show_playcount: false,
        }
    }
}

/// Settings of the visual player rendered by the page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientPlayerSettings {
    pub height_track: VisualHeight,
    pub height_set: NonZeroU32,
    pub autoplay: bool,
    pub color: Color,
    pub hide_related: bool,
    pub show_artwork: bool,
    pub show_playcount: bool,
}

impl ClientPlayerSettings {
    pub fn height_for(&self, kind: TrackKind) -> NonZeroU32 {
        match kind {
            TrackKind::Set => self.height_set,
            TrackKind::Track => self.height_track.get(),
        }
    }
}

impl Default for ClientPlayerSettings {
    fn default() -> Self {
        Self {
            height_track: VisualHeight::default(),
            height_set: VisualHeight::default().get(),
            autoplay: false,
            color: Color::default(),
            hide_related: false,
            show_artwork: false,
            show_playcount: false,
        }
    }
}
