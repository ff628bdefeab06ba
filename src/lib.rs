//! Renders configured SoundCloud players from the provider's oEmbed markup.

pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod http;
pub mod oembed;
pub mod player;
pub mod render;
