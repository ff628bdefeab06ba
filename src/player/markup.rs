//! Structured view of the player iframe inside an oEmbed fragment.
//!
//! The fragment is split into the first `<iframe ...>` opening tag and the
//! text around it. The tag is parsed into an ordered attribute list and its
//! `src` into an ordered query parameter list, so values can be upserted and
//! written back without disturbing anything else. Attribute values are
//! entity-decoded on parse and written back with literal `&`.

use std::{borrow::Cow, fmt::Display, sync::LazyLock};

use quick_xml::escape::resolve_html5_entity;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("embed markup contains no iframe")]
    MissingIframe,

    #[error("embed iframe has no src attribute")]
    MissingSource,
}

static IFRAME_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<iframe\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid iframe regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});

/// Longest entity name we try to resolve after a `&`.
const MAX_ENTITY_LEN: usize = 32;

/// Resolves the character reference at the start of `input` (which begins
/// with `&`). Returns the replacement text and the number of bytes consumed.
fn entity_at(input: &str) -> Option<(Cow<'static, str>, usize)> {
    let rest = input.strip_prefix('&')?;
    let end = rest
        .char_indices()
        .take(MAX_ENTITY_LEN)
        .find(|(_, c)| *c == ';')
        .map(|(i, _)| i)?;
    let name = &rest[..end];

    let text = if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        Cow::Owned(char::from_u32(code)?.to_string())
    } else {
        Cow::Borrowed(resolve_html5_entity(name)?)
    };

    Some((text, end + 2))
}

/// Decodes HTML character references. Unknown or unterminated references
/// are kept as literal text.
pub fn decode_entities(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match entity_at(tail) {
            Some((text, len)) => {
                out.push_str(&text);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Escapes a value for a double-quoted attribute, keeping `&` literal unless
/// it would read back as a character reference.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' if entity_at(&value[i..]).is_some() => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Ordered `key[=value]` entries with replace-or-append updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Entries(Vec<(String, Option<String>)>);

impl Entries {
    fn get(&self, key: &str, eq: fn(&str, &str) -> bool) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| eq(k, key))
            .and_then(|(_, v)| v.as_deref())
    }

    fn count(&self, key: &str, eq: fn(&str, &str) -> bool) -> usize {
        self.0.iter().filter(|(k, _)| eq(k, key)).count()
    }

    /// Replaces the first entry for `key` in place and drops any later
    /// duplicates, or appends the entry when there is none.
    fn upsert(&mut self, key: &str, value: String, eq: fn(&str, &str) -> bool) {
        match self.0.iter().position(|(k, _)| eq(k, key)) {
            Some(first) => {
                self.0[first].1 = Some(value);
                let mut index = 0;
                self.0.retain(|(k, _)| {
                    let keep = index <= first || !eq(k, key);
                    index += 1;
                    keep
                });
            }
            None => self.0.push((key.to_string(), Some(value))),
        }
    }
}

/// True for absolute `http`/`https` URLs and for URLs without a scheme.
/// Whitespace and control characters are ignored the way browsers do.
pub fn is_web_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    match compact.find([':', '/', '?', '#']) {
        Some(i) if compact[i..].starts_with(':') => {
            let scheme = &compact[..i];
            scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
        }
        _ => true,
    }
}

fn same_attribute(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn same_param(a: &str, b: &str) -> bool {
    a == b
}

/// Player URL from the iframe `src`, with its query string kept in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSource {
    base: String,
    params: Entries,
    fragment: Option<String>,
}

impl PlayerSource {
    pub fn parse(src: &str) -> Self {
        let (rest, fragment) = match src.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (src, None),
        };
        let (base, query) = rest.split_once('?').unwrap_or((rest, ""));

        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_string(), Some(value.to_string())),
                None => (pair.to_string(), None),
            })
            .collect();

        Self {
            base: base.to_string(),
            params: Entries(params),
            fragment,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key, same_param)
    }

    pub fn param_count(&self, key: &str) -> usize {
        self.params.count(key, same_param)
    }

    pub fn set_param(&mut self, key: &str, value: impl Into<String>) {
        self.params.upsert(key, value.into(), same_param);
    }
}

impl Display for PlayerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)?;
        for (i, (key, value)) in self.params.0.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            match value {
                Some(value) => write!(f, "{key}={value}")?,
                None => write!(f, "{key}")?,
            }
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// The opening `<iframe>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IframeTag {
    attributes: Entries,
    self_closing: bool,
}

impl IframeTag {
    /// Parses an opening tag as matched in the fragment, `<iframe ...>`.
    pub(crate) fn parse(tag: &str) -> Self {
        let inner = tag
            .get("<iframe".len()..tag.len() - 1)
            .unwrap_or_default()
            .trim_end();
        // A trailing `/` only closes the tag when it is not the end of an
        // unquoted value.
        let (inner, self_closing) = match inner.strip_suffix('/') {
            Some(rest)
                if rest.is_empty()
                    || rest.ends_with(|c: char| c.is_ascii_whitespace() || c == '"' || c == '\'') =>
            {
                (rest, true)
            }
            _ => (inner, false),
        };

        let attributes = ATTRIBUTE
            .captures_iter(inner)
            .map(|caps| {
                let name = caps[1].to_string();
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|v| decode_entities(v.as_str()).into_owned());
                (name, value)
            })
            .collect();

        Self {
            attributes: Entries(attributes),
            self_closing,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name, same_attribute)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.upsert(name, value.into(), same_attribute);
    }

    /// Drops every attribute for which `reject(name, value)` holds.
    pub fn remove_attributes(&mut self, reject: impl Fn(&str, Option<&str>) -> bool) {
        self.attributes
            .0
            .retain(|(name, value)| !reject(name, value.as_deref()));
    }
}

impl Display for IframeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<iframe")?;
        for (name, value) in &self.attributes.0 {
            match value {
                Some(value) => write!(f, " {name}=\"{}\"", escape_attribute(value))?,
                None => write!(f, " {name}")?,
            }
        }
        f.write_str(if self.self_closing { " />" } else { ">" })
    }
}

/// An oEmbed fragment split around its player iframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedMarkup {
    prefix: String,
    iframe: IframeTag,
    suffix: String,
}

impl EmbedMarkup {
    pub fn parse(html: &str) -> Result<Self, MarkupError> {
        let found = IFRAME_TAG.find(html).ok_or(MarkupError::MissingIframe)?;

        Ok(Self {
            prefix: html[..found.start()].to_string(),
            iframe: IframeTag::parse(found.as_str()),
            suffix: html[found.end()..].to_string(),
        })
    }

    pub fn iframe(&self) -> &IframeTag {
        &self.iframe
    }

    pub fn iframe_mut(&mut self) -> &mut IframeTag {
        &mut self.iframe
    }

    /// The player URL. A `src` with a scheme other than `http`/`https`
    /// counts as missing.
    pub fn source(&self) -> Result<PlayerSource, MarkupError> {
        self.iframe
            .attribute("src")
            .filter(|src| is_web_url(src))
            .map(PlayerSource::parse)
            .ok_or(MarkupError::MissingSource)
    }

    pub fn set_source(&mut self, source: &PlayerSource) {
        self.iframe.set_attribute("src", source.to_string());
    }
}

impl Display for EmbedMarkup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.iframe, self.suffix)
    }
}
