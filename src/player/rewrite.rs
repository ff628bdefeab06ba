//! Rewrites the provider's embed markup to the configured player.
//!
//! Every configured parameter ends up in the player URL exactly once: an
//! existing value is replaced in place, a missing one is appended to the end
//! of the query string. Rewriting the same markup again with the same
//! parameters is a no-op.

use std::num::NonZeroU32;

use crate::domain::settings::{Color, PlayerSettings};

use super::markup::{EmbedMarkup, MarkupError};

pub const AUTO_PLAY: &str = "auto_play";
pub const SHOW_COMMENTS: &str = "show_comments";
pub const SHOW_PLAYCOUNT: &str = "show_playcount";
pub const SHOW_ARTWORK: &str = "show_artwork";
pub const COLOR: &str = "color";
pub const VISUAL: &str = "visual";

/// Values written into the embed markup. `None` leaves the markup as the
/// provider returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteParameters {
    /// Width in percent.
    pub width: Option<u32>,
    pub height: NonZeroU32,
    pub auto_play: Option<bool>,
    pub show_comments: Option<bool>,
    pub show_playcount: Option<bool>,
    pub show_artwork: Option<bool>,
    pub color: Option<Color>,
    pub visual: Option<bool>,
}

impl RewriteParameters {
    /// Full parameter set of the server-rendered player.
    pub fn new(width: u32, height: NonZeroU32, settings: &PlayerSettings) -> Self {
        Self {
            width: Some(width),
            height,
            auto_play: Some(settings.autoplay),
            show_comments: Some(settings.show_comments),
            show_playcount: Some(settings.show_playcount),
            show_artwork: Some(settings.show_artwork),
            color: Some(settings.color.clone()),
            visual: Some(settings.is_visual()),
        }
    }

    /// Query parameters in the order they are applied.
    fn query(&self) -> [(&'static str, Option<String>); 6] {
        let flag = |value: Option<bool>| value.map(|v| v.to_string());
        [
            (AUTO_PLAY, flag(self.auto_play)),
            (SHOW_COMMENTS, flag(self.show_comments)),
            (SHOW_PLAYCOUNT, flag(self.show_playcount)),
            (SHOW_ARTWORK, flag(self.show_artwork)),
            (COLOR, self.color.as_ref().map(|c| c.to_string())),
            (VISUAL, flag(self.visual)),
        ]
    }
}

/// Applies `params` to the first iframe of `html`.
///
/// Fails when the fragment has no iframe or the iframe has no `src`, since
/// there is no player to configure then.
pub fn rewrite(html: &str, params: &RewriteParameters) -> Result<String, MarkupError> {
    let mut markup = EmbedMarkup::parse(html)?;
    let mut source = markup.source()?;

    let iframe = markup.iframe_mut();
    if let Some(width) = params.width {
        iframe.set_attribute("width", format!("{width}%"));
    }
    iframe.set_attribute("height", params.height.to_string());

    for (key, value) in params.query() {
        if let Some(value) = value {
            source.set_param(key, value);
        }
    }
    markup.set_source(&source);

    Ok(markup.to_string())
}

/// Rewrites embed markup for the server-rendered player.
pub fn rewrite_embed(
    html: &str,
    width: u32,
    height: NonZeroU32,
    settings: &PlayerSettings,
) -> Result<String, MarkupError> {
    rewrite(html, &RewriteParameters::new(width, height, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::PlayerType;

    fn height(h: u32) -> NonZeroU32 {
        NonZeroU32::new(h).unwrap()
    }

    fn settings() -> PlayerSettings {
        PlayerSettings {
            width: 80,
            autoplay: true,
            color: Color::parse("336699").unwrap(),
            show_comments: false,
            show_artwork: false,
            show_playcount: true,
            ..Default::default()
        }
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_rewrites_bare_provider_embed() {
        let html = r#"<iframe src="https://w.soundcloud.com/player/?url=https%3A%2F%2Fapi.soundcloud.com%2Ftracks%2F1" width="100%" height="166"></iframe>"#;

        let out = rewrite_embed(html, 80, height(300), &settings()).unwrap();

        for expected in [
            r#"width="80%""#,
            r#"height="300""#,
            "auto_play=true",
            "show_comments=false",
            "show_artwork=false",
            "show_playcount=true",
            "color=336699",
            "visual=false",
        ] {
            assert_eq!(count(&out, expected), 1, "{expected} in {out}");
        }
        assert_eq!(count(&out, "width="), 1);
        assert_eq!(count(&out, "height="), 1);
    }

    #[test]
    fn test_existing_autoplay_is_replaced_in_place() {
        for existing in ["auto_play=true", "auto_play=false"] {
            let html = format!(r#"<iframe width="100%" height="166" src="https://w/?{existing}&url=x"></iframe>"#);
            let settings = PlayerSettings {
                autoplay: false,
                ..settings()
            };

            let out = rewrite_embed(&html, 100, height(166), &settings).unwrap();

            assert_eq!(count(&out, "auto_play="), 1, "{out}");
            assert!(out.contains("?auto_play=false&url=x"), "{out}");
        }
    }

    #[test]
    fn test_missing_color_is_appended_before_closing_quote() {
        let html = r#"<iframe width="100%" height="166" src="https://w/?url=x&visual=true&show_comments=true&show_playcount=true&show_artwork=true&auto_play=true"></iframe>"#;

        let out = rewrite_embed(html, 100, height(166), &settings()).unwrap();

        assert_eq!(count(&out, "color="), 1);
        assert!(out.contains(r#"&color=336699"></iframe>"#), "{out}");
    }

    #[test]
    fn test_parameters_appended_in_fixed_order() {
        let html = r#"<iframe width="100%" height="166" src="https://w/?url=x"></iframe>"#;

        let out = rewrite_embed(html, 100, height(166), &settings()).unwrap();

        assert!(out.contains(
            "?url=x&auto_play=true&show_comments=false&show_playcount=true&show_artwork=false&color=336699&visual=false\""
        ), "{out}");
    }

    #[test]
    fn test_color_token_is_replaced() {
        let html = r#"<iframe width="100%" height="166" src="https://w/?color=ff5500&url=x"></iframe>"#;

        let out = rewrite_embed(html, 100, height(166), &settings()).unwrap();

        assert!(out.contains("?color=336699&url=x"), "{out}");
        assert_eq!(count(&out, "color="), 1);
    }

    #[test]
    fn test_entities_in_source_are_decoded() {
        let html = r#"<iframe width="100%" height="400" src="https://w/?visual=true&amp;url=x&amp;show_artwork=true"></iframe>"#;

        let out = rewrite_embed(html, 100, height(400), &settings()).unwrap();

        assert!(!out.contains("&amp;"), "{out}");
        assert!(out.contains("?visual=false&url=x&show_artwork=false"), "{out}");
    }

    #[test]
    fn test_visual_player_sets_visual_true() {
        let settings = PlayerSettings {
            player_type: PlayerType::Visual,
            ..settings()
        };
        let html = r#"<iframe width="100%" height="166" src="https://w/?url=x&visual=false"></iframe>"#;

        let out = rewrite_embed(html, 100, height(300), &settings).unwrap();

        assert!(out.contains("visual=true"), "{out}");
        assert!(!out.contains("visual=false"), "{out}");
    }

    #[test]
    fn test_missing_dimensions_are_added() {
        let html = r#"<iframe src="https://w/?url=x"></iframe>"#;

        let out = rewrite_embed(html, 50, height(200), &settings()).unwrap();

        assert!(out.contains(r#"width="50%""#), "{out}");
        assert!(out.contains(r#"height="200""#), "{out}");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let html = r#"<iframe width="100%" height="166" scrolling="no" src="https://w/?url=x&amp;auto_play=false"></iframe>"#;

        let once = rewrite_embed(html, 80, height(300), &settings()).unwrap();
        let twice = rewrite_embed(&once, 80, height(300), &settings()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_partial_parameters_leave_rest_untouched() {
        let html = r#"<iframe width="100%" height="400" src="https://w/?url=x&show_comments=true"></iframe>"#;
        let params = RewriteParameters {
            width: None,
            height: height(450),
            auto_play: None,
            show_comments: None,
            show_playcount: None,
            show_artwork: None,
            color: Some(Color::default()),
            visual: None,
        };

        let out = rewrite(html, &params).unwrap();

        assert_eq!(
            out,
            r#"<iframe width="100%" height="450" src="https://w/?url=x&show_comments=true&color=ff7700"></iframe>"#
        );
    }

    #[test]
    fn test_fragment_without_player_is_rejected() {
        assert_eq!(
            rewrite_embed("<p>private</p>", 100, height(166), &settings()),
            Err(MarkupError::MissingIframe)
        );
        assert_eq!(
            rewrite_embed(r#"<iframe width="1"></iframe>"#, 100, height(166), &settings()),
            Err(MarkupError::MissingSource)
        );
    }
}
