use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::model::LinkItem;
use crate::search::normalize;

pub const LOCAL_LABEL: &str = "本地";
const FOLDER_ICON: &str = "📁";
const LINK_ICON: &str = "🔗";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IconKind {
    Image(String),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Icon {
    pub kind: IconKind,
    pub hue: u32,
}

/// Resolves `url` against the page location when one is known, so relative
/// links behave the way the browser would follow them.
fn parse_url(url: &str, base: Option<&Url>) -> Option<Url> {
    if url.is_empty() {
        return None;
    }
    match base {
        Some(base) => base.join(url).ok(),
        None => Url::parse(url).ok(),
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

pub fn host_label(url: &str, base: Option<&Url>) -> String {
    match parse_url(url, base) {
        Some(parsed) if parsed.scheme() == "file" => LOCAL_LABEL.to_string(),
        Some(parsed) => strip_www(parsed.host_str().unwrap_or("")).to_string(),
        None => String::new(),
    }
}

pub fn icon_text(item: &LinkItem, base: Option<&Url>) -> String {
    if let Some(icon) = item.icon.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return icon.to_string();
    }
    match parse_url(item.url(), base) {
        Some(parsed) if parsed.scheme() == "file" => FOLDER_ICON.to_string(),
        Some(parsed) => strip_www(parsed.host_str().unwrap_or(""))
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| LINK_ICON.to_string()),
        None => LINK_ICON.to_string(),
    }
}

fn is_image_ref(icon: &str) -> bool {
    static RE_IMAGE: OnceLock<Regex> = OnceLock::new();
    let re = RE_IMAGE.get_or_init(|| Regex::new(r"(?i)^(https?:|data:|file:)").unwrap());
    re.is_match(icon)
}

/// Stable 0..360 hue from a polynomial hash over UTF-16 code units.
pub fn hash_to_hue(text: &str) -> u32 {
    let hash = normalize(text)
        .encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)));
    hash % 360
}

pub fn resolve_icon(item: &LinkItem, base: Option<&Url>) -> Icon {
    let text = icon_text(item, base);
    let hue = match item.url() {
        "" => hash_to_hue(&text),
        url => hash_to_hue(url),
    };
    let kind = if is_image_ref(&text) {
        IconKind::Image(text)
    } else {
        IconKind::Text(text)
    };
    Icon { kind, hue }
}

/// Local files open in place; browsers refuse new-tab navigation to them.
pub fn link_target(url: &str) -> &'static str {
    if url.is_empty() || url.starts_with("file:") {
        "_self"
    } else {
        "_blank"
    }
}

pub fn link_href(url: &str) -> String {
    if url.is_empty() {
        "#".to_string()
    } else {
        url.to_string()
    }
}
