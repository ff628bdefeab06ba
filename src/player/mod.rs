//! Shaping of the provider's embed markup to the configured player.

pub mod height;
pub mod markup;
pub mod rewrite;
