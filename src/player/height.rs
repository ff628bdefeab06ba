use std::num::NonZeroU32;

use log::debug;

use crate::domain::{
    settings::PlayerSettings,
    track::{TrackKind, TrackReference},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedHeight {
    pub height: NonZeroU32,
    pub is_set: bool,
}

/// Picks the player height for a URL.
///
/// The visual player has one height for tracks and sets alike, the classic
/// player distinguishes the two.
pub fn resolve(track: &TrackReference, settings: &PlayerSettings) -> ResolvedHeight {
    let kind = track.kind();
    let height = if settings.is_visual() {
        settings.visual_height.get()
    } else {
        settings.classic_height(kind)
    };

    debug!("resolved height {height} for {track} ({kind:?})");

    ResolvedHeight {
        height,
        is_set: kind == TrackKind::Set,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::{PlayerType, VisualHeight};

    fn classic() -> PlayerSettings {
        PlayerSettings {
            height_track: NonZeroU32::new(166).unwrap(),
            height_set: NonZeroU32::new(450).unwrap(),
            ..Default::default()
        }
    }

    fn visual(height: u32) -> PlayerSettings {
        PlayerSettings {
            player_type: PlayerType::Visual,
            visual_height: VisualHeight::new(height, VisualHeight::SERVER_OPTIONS).unwrap(),
            ..classic()
        }
    }

    #[test]
    fn test_classic_track_uses_track_height() {
        let resolved = resolve(
            &"https://soundcloud.com/artist/trackname".into(),
            &classic(),
        );
        assert_eq!(resolved.height.get(), 166);
        assert!(!resolved.is_set);
    }

    #[test]
    fn test_classic_set_uses_set_height() {
        let resolved = resolve(&"https://soundcloud.com/artist/sets/album".into(), &classic());
        assert_eq!(resolved.height.get(), 450);
        assert!(resolved.is_set);
    }

    #[test]
    fn test_classic_artist_page_uses_set_height() {
        let resolved = resolve(&"https://soundcloud.com/artist".into(), &classic());
        assert_eq!(resolved.height.get(), 450);
        assert!(resolved.is_set);
    }

    #[test]
    fn test_visual_ignores_classification() {
        for url in [
            "https://soundcloud.com/artist/trackname",
            "https://soundcloud.com/artist/sets/album",
            "https://soundcloud.com/artist",
        ] {
            let resolved = resolve(&url.into(), &visual(450));
            assert_eq!(resolved.height.get(), 450, "{url}");
        }
    }

    #[test]
    fn test_visual_still_reports_kind() {
        let resolved = resolve(&"https://soundcloud.com/artist/sets/a".into(), &visual(600));
        assert!(resolved.is_set);
    }
}
