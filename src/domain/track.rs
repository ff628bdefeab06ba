use std::fmt::Display;

use url::Url;

/// Whether a provider URL points at a single track or at a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Track,
    /// A set (playlist/album) or an artist page.
    Set,
}

/// Represent a track or set URL on the provider, as stored in a field item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackReference(String);

impl TrackReference {
    const SETS_SEGMENT: &'static str = "sets";

    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the URL by its path.
    ///
    /// `/artist/track` is a track, `/artist/sets/album` is a set, and a path
    /// with no third segment (`/artist`) is treated as a set too.
    pub fn kind(&self) -> TrackKind {
        let path = self.path();
        let third = path.split('/').nth(2);

        match third {
            None => TrackKind::Set,
            Some(segment) if segment == Self::SETS_SEGMENT => TrackKind::Set,
            Some(_) => TrackKind::Track,
        }
    }

    /// Path component of the URL. Strings that are not absolute URLs are
    /// treated as a bare path, minus any query or fragment.
    fn path(&self) -> String {
        match Url::parse(&self.0) {
            Ok(url) => url.path().to_string(),
            Err(_) => self
                .0
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl Display for TrackReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_url_is_track() {
        let track = TrackReference::new("https://soundcloud.com/artist/trackname");
        assert_eq!(track.kind(), TrackKind::Track);
    }

    #[test]
    fn test_sets_url_is_set() {
        let track = TrackReference::new("https://soundcloud.com/artist/sets/album");
        assert_eq!(track.kind(), TrackKind::Set);
    }

    #[test]
    fn test_artist_url_is_set() {
        let track = TrackReference::new("https://soundcloud.com/artist");
        assert_eq!(track.kind(), TrackKind::Set);
    }

    #[test]
    fn test_query_does_not_affect_kind() {
        let track = TrackReference::new("https://soundcloud.com/artist/trackname?in=artist/sets/x");
        assert_eq!(track.kind(), TrackKind::Track);
    }

    #[test]
    fn test_url_without_scheme_uses_raw_path() {
        // Without a scheme the host becomes the first path segment.
        let track = TrackReference::new("soundcloud.com/artist/sets");
        assert_eq!(track.kind(), TrackKind::Set);

        let track = TrackReference::new("soundcloud.com/artist/trackname");
        assert_eq!(track.kind(), TrackKind::Track);
    }

    #[test]
    fn test_reference_is_trimmed() {
        let track = TrackReference::new("  https://soundcloud.com/a/b \n");
        assert_eq!(track.as_str(), "https://soundcloud.com/a/b");
        assert_eq!(track.to_string(), "https://soundcloud.com/a/b");
    }
}
