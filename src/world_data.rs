/// Data structures for World Shelf
use serde::{Deserialize, Serialize};

pub const DELETED_WORLD_NAME: &str = "Deleted world";

/// A resolved world, as returned by the site's world detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorldRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub thumbnail_image_url: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub release_status: Option<String>,
    #[serde(skip)]
    pub deleted: bool,
}

impl WorldRecord {
    /// Bare record for a world we could not look up
    pub fn named(id: &str, name: &str) -> WorldRecord {
        WorldRecord {
            id: id.to_string(),
            name: name.to_string(),
            image_url: None,
            thumbnail_image_url: None,
            author_name: None,
            release_status: None,
            deleted: false,
        }
    }

    /// Placeholder for a world the site no longer knows about
    pub fn deleted(id: &str) -> WorldRecord {
        WorldRecord {
            deleted: true,
            ..WorldRecord::named(id, DELETED_WORLD_NAME)
        }
    }

    /// Thumbnail first, full image as fallback
    pub fn preview_image(&self) -> Option<&str> {
        self.thumbnail_image_url
            .as_deref()
            .or(self.image_url.as_deref())
    }
}

/// One row of the site's favorites list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub favorite_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl FavoriteEntry {
    pub fn tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

/// Which folder universe a folder belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FolderKind {
    Unfiled,
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FolderDescriptor {
    pub id: String,
    pub name: String,
    pub kind: FolderKind,
}

impl FolderDescriptor {
    pub const UNFILED_ID: &'static str = "none";

    pub fn unfiled() -> FolderDescriptor {
        FolderDescriptor {
            id: Self::UNFILED_ID.to_string(),
            name: "Unfiled".to_string(),
            kind: FolderKind::Unfiled,
        }
    }
}

/// Both folder universes, as reported by the extension
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FolderLists {
    #[serde(default)]
    pub local_folders: Vec<FolderDescriptor>,
    #[serde(default)]
    pub remote_folders: Vec<FolderDescriptor>,
}

/// A world as the extension's local store keeps it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorld {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_image_url: Option<String>,
    pub folder_id: String,
}

impl SavedWorld {
    pub fn from_record(record: &WorldRecord, folder_id: &str) -> SavedWorld {
        SavedWorld {
            id: record.id.clone(),
            name: record.name.clone(),
            author_name: record.author_name.clone(),
            release_status: record.release_status.clone(),
            thumbnail_image_url: record.preview_image().map(str::to_string),
            folder_id: folder_id.to_string(),
        }
    }
}

/// How the extension answered an `addWorld` request
#[derive(Debug, Clone, PartialEq)]
pub enum AddWorldOutcome {
    Added,
    AlreadyExists { world_name: Option<String> },
    PrivateWorld { world_name: Option<String> },
    Failed(String),
}
