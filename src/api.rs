/// Client for the site's own REST API, called with the page's session cookie
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::Serialize;
use url::Url;
use web_sys::RequestCredentials;

use crate::error::ShelfError;
use crate::world_data::{FavoriteEntry, WorldRecord};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateFavorite {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub favorite_id: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpdateFavoriteTags {
    pub tags: Vec<String>,
}

/// Header carried by every request this client makes; the fetch tap skips them
pub const OWN_REQUEST_HEADER: &str = "X-World-Shelf";

/// Upper bound on favorites pages read in one listing
const MAX_PAGES: u32 = 50;

/// Offset bookkeeping for a paged listing
///
/// A listing keeps going until an empty page, a page identical to the last
/// one (the server ignored `offset`), or `MAX_PAGES`. Short pages do not end
/// it, since the server may cap `n` below the requested page size.
#[derive(Debug, Default)]
pub struct Pager {
    offset: u32,
    pages: u32,
    last_first: Option<String>,
}

impl Pager {
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Returns false when the page should not be kept and listing should stop
    pub fn accept(&mut self, page: &[FavoriteEntry]) -> bool {
        let Some(first) = page.first() else {
            return false;
        };
        if self.pages >= MAX_PAGES {
            log::warn!("favorites listing stopped after {} pages", MAX_PAGES);
            return false;
        }
        if self.last_first.as_deref() == Some(first.id.as_str()) {
            log::warn!("favorites page at offset {} repeats the previous one", self.offset);
            return false;
        }

        self.last_first = Some(first.id.clone());
        self.pages += 1;
        self.offset += page.len() as u32;
        true
    }
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    base: String,
    page_size: u32,
}

impl RemoteClient {
    pub fn new(api_base: &str, page_size: u32) -> Self {
        RemoteClient {
            base: api_base.trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
        }
    }

    pub fn favorites_url(&self, tag: Option<&str>, offset: u32) -> String {
        let mut url = match Url::parse(&format!("{}/favorites", self.base)) {
            Ok(url) => url,
            Err(_) => return format!("{}/favorites?type=world", self.base),
        };
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("type", "world")
                .append_pair("n", &self.page_size.to_string())
                .append_pair("offset", &offset.to_string());
            if let Some(tag) = tag {
                query.append_pair("tag", tag);
            }
        }
        url.to_string()
    }

    pub fn world_url(&self, world_id: &str) -> String {
        format!("{}/worlds/{}", self.base, world_id)
    }

    pub fn favorite_url(&self, entry_id: &str) -> String {
        format!("{}/favorites/{}", self.base, entry_id)
    }

    /// One page of world favorites, optionally restricted to one group
    pub async fn list_favorites_page(
        &self,
        tag: Option<&str>,
        offset: u32,
    ) -> Result<Vec<FavoriteEntry>, ShelfError> {
        let response = send(with_session(Request::get(&self.favorites_url(tag, offset)))).await?;
        read_json(response).await
    }

    /// Every world favorite, following pages until the listing runs out
    pub async fn list_favorites(&self, tag: Option<&str>) -> Result<Vec<FavoriteEntry>, ShelfError> {
        let mut all = Vec::new();
        let mut pager = Pager::default();

        loop {
            let page = self.list_favorites_page(tag, pager.offset()).await?;
            if !pager.accept(&page) {
                break;
            }
            all.extend(page);
        }

        Ok(all)
    }

    pub async fn fetch_world(&self, world_id: &str) -> Result<Option<WorldRecord>, ShelfError> {
        let response = send(with_session(Request::get(&self.world_url(world_id)))).await?;
        if response.status() == 404 {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    pub async fn add_favorite(&self, world_id: &str, tag: &str) -> Result<FavoriteEntry, ShelfError> {
        let body = CreateFavorite {
            kind: "world",
            favorite_id: world_id.to_string(),
            tags: vec![tag.to_string()],
        };
        let request = with_session(Request::post(&format!("{}/favorites", self.base)))
            .json(&body)
            .map_err(|e| ShelfError::Decode(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| ShelfError::Network(e.to_string()))?;
        read_json(response).await
    }

    /// Move a favorite to another group
    pub async fn update_favorite_tag(&self, entry_id: &str, tag: &str) -> Result<(), ShelfError> {
        let body = UpdateFavoriteTags {
            tags: vec![tag.to_string()],
        };
        let request = with_session(Request::put(&self.favorite_url(entry_id)))
            .json(&body)
            .map_err(|e| ShelfError::Decode(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| ShelfError::Network(e.to_string()))?;
        check_status(&response)
    }

    pub async fn remove_favorite(&self, entry_id: &str) -> Result<(), ShelfError> {
        let response = send(with_session(Request::delete(&self.favorite_url(entry_id)))).await?;
        check_status(&response)
    }
}

/// Send the page's session cookie and mark the request as our own
pub fn with_session(builder: RequestBuilder) -> RequestBuilder {
    builder
        .credentials(RequestCredentials::Include)
        .header(OWN_REQUEST_HEADER, "1")
}

async fn send(builder: RequestBuilder) -> Result<Response, ShelfError> {
    builder
        .send()
        .await
        .map_err(|e| ShelfError::Network(e.to_string()))
}

fn check_status(response: &Response) -> Result<(), ShelfError> {
    if response.ok() {
        Ok(())
    } else {
        Err(ShelfError::Status(response.status()))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ShelfError> {
    check_status(&response)?;
    response
        .json::<T>()
        .await
        .map_err(|e| ShelfError::Decode(e.to_string()))
}
