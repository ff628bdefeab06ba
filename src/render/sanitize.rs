use std::sync::LazyLock;

use regex::Regex;

use crate::player::markup::{IframeTag, is_web_url};

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|</?([A-Za-z][A-Za-z0-9-]*)\b(?:[^>"']|"[^"]*"|'[^']*')*>"#)
        .expect("valid tag regex")
});

const ALLOWED_TAGS: &[&str] = &["iframe"];

/// Attributes that can carry script: event handlers, `style`, and URL
/// attributes pointing at anything but a web address.
fn is_unsafe_attribute(name: &str, value: Option<&str>) -> bool {
    match name.to_ascii_lowercase().as_str() {
        "srcdoc" | "style" => true,
        "src" | "href" | "longdesc" => !value.is_some_and(is_web_url),
        name => name.starts_with("on"),
    }
}

/// Strips every tag except `iframe` from embed markup, keeping text, and
/// drops script-bearing attributes from the iframes that remain.
pub fn retain_iframes(html: &str) -> String {
    TAG.replace_all(html, |caps: &regex::Captures| {
        let allowed = caps
            .get(1)
            .is_some_and(|name| ALLOWED_TAGS.iter().any(|t| name.as_str().eq_ignore_ascii_case(t)));
        if !allowed {
            return String::new();
        }
        if caps[0].starts_with("</") {
            return caps[0].to_string();
        }

        let mut iframe = IframeTag::parse(&caps[0]);
        iframe.remove_attributes(is_unsafe_attribute);
        iframe.to_string()
    })
    .into_owned()
}
