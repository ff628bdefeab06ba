//! The two ways a field item becomes page markup.

pub mod client;
pub mod sanitize;
pub mod server;
