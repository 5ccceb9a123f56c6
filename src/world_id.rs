/// World identifier and site URL rules for World Shelf
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub const WORLD_PREFIX: &str = "wrld_";
pub const ENTRY_PREFIX: &str = "fvrt_";

/// Scroll key the site puts on cards it has not filled in yet
pub const SCROLL_KEY_PLACEHOLDER: &str = "???";

static WORLD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^wrld_[A-Za-z0-9-]+$").expect("valid regex"));

static WORLD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/home/world/(wrld_[A-Za-z0-9-]+)").expect("valid regex"));

/// Which site view a location points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Favorites,
}

pub fn is_world_id(candidate: &str) -> bool {
    WORLD_ID.is_match(candidate)
}

pub fn is_entry_id(candidate: &str) -> bool {
    candidate.len() > ENTRY_PREFIX.len() && candidate.starts_with(ENTRY_PREFIX)
}

/// Read a world ID out of a card's scroll key, ignoring the placeholder
pub fn world_id_from_scroll_key(key: &str) -> Option<String> {
    let key = key.trim();
    is_world_id(key).then(|| key.to_string())
}

/// Extract a world ID from a link target
///
/// Works for absolute and relative hrefs:
/// - https://vrchat.com/home/world/wrld_1234/info → wrld_1234
/// - /home/world/wrld_1234 → wrld_1234
pub fn world_id_from_link(href: &str) -> Option<String> {
    WORLD_LINK
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Classify a page location as one of the views that need a card reset
pub fn view_kind(location: &str) -> Option<ViewKind> {
    let url = Url::parse(location).ok()?;
    let path = url.path().trim_end_matches('/');

    if path == "/home" {
        return Some(ViewKind::Home);
    }

    let mut segments = path.trim_start_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("home"), Some("favorites"), Some("world")) => Some(ViewKind::Favorites),
        _ => None,
    }
}

/// Canonical share link for a world
pub fn canonical_world_url(origin: &str, world_id: &str) -> String {
    format!("{}/home/world/{}", origin.trim_end_matches('/'), world_id)
}
