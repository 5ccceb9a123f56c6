/// Classification and parsing of network responses tapped from the host page
///
/// The bridge wraps the page's `fetch`; for every request it asks `classify`
/// whether the response is interesting, clones it if so, and hands the body
/// text back. Nothing here can alter what the page itself receives.
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::world_data::{FavoriteEntry, WorldRecord};

static WORLD_DETAIL_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/api/1/worlds/(wrld_[A-Za-z0-9-]+)/?$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum Tap {
    FavoritesList,
    WorldDetail(String),
}

/// What a tapped body turned into
#[derive(Debug, Clone, PartialEq)]
pub enum Tapped {
    Favorites(Vec<FavoriteEntry>),
    World(WorldRecord),
}

/// Decide whether a request URL is one we want to read
///
/// Relative URLs are resolved against `base` the way the page would.
pub fn classify(request_url: &str, base: &str) -> Option<Tap> {
    let url = Url::parse(request_url)
        .or_else(|_| Url::parse(base).and_then(|b| b.join(request_url)))
        .ok()?;
    let path = url.path();

    if path.trim_end_matches('/').ends_with("/api/1/favorites") {
        let is_world = url
            .query_pairs()
            .any(|(key, value)| key == "type" && value == "world");
        return is_world.then_some(Tap::FavoritesList);
    }

    WORLD_DETAIL_PATH
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| Tap::WorldDetail(m.as_str().to_string()))
}

/// Parse a tapped body; `None` for anything we cannot read
pub fn parse(tap: &Tap, body: &str) -> Option<Tapped> {
    match tap {
        Tap::FavoritesList => serde_json::from_str::<Vec<FavoriteEntry>>(body)
            .map(Tapped::Favorites)
            .map_err(|e| log::debug!("ignoring favorites payload: {}", e))
            .ok(),
        Tap::WorldDetail(id) => serde_json::from_str::<WorldRecord>(body)
            .map_err(|e| log::debug!("ignoring world payload for {}: {}", id, e))
            .ok()
            .filter(|record| &record.id == id)
            .map(Tapped::World),
    }
}
