/// Local mirrors of the two favorite stores, plus the extension message contract

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::world_data::{AddWorldOutcome, FavoriteEntry, FolderLists, SavedWorld};

/// Worlds known to be in the extension's local store, with their folder when known
#[derive(Debug, Clone, Default)]
pub struct SavedWorlds {
    folders: HashMap<String, Option<String>>,
}

impl SavedWorlds {
    pub fn new() -> Self {
        SavedWorlds::default()
    }

    pub fn from_worlds(worlds: &[SavedWorld]) -> Self {
        SavedWorlds {
            folders: worlds
                .iter()
                .map(|w| (w.id.clone(), Some(w.folder_id.clone())))
                .collect(),
        }
    }

    pub fn contains(&self, world_id: &str) -> bool {
        self.folders.contains_key(world_id)
    }

    pub fn folder_of(&self, world_id: &str) -> Option<&str> {
        self.folders.get(world_id).and_then(|f| f.as_deref())
    }

    /// `None` folder: the store has the world but did not say where
    pub fn insert(&mut self, world_id: &str, folder_id: Option<&str>) {
        self.folders
            .insert(world_id.to_string(), folder_id.map(str::to_string));
    }

    pub fn remove(&mut self, world_id: &str) -> bool {
        self.folders.remove(world_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

/// A world's place in the site's own favorites
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFavorite {
    pub entry_id: String,
    pub tag: Option<String>,
}

/// Shadow of the site's favorites, keyed by world ID
#[derive(Debug, Clone, Default)]
pub struct RemoteFavorites {
    by_world: HashMap<String, RemoteFavorite>,
}

impl RemoteFavorites {
    pub fn new() -> Self {
        RemoteFavorites::default()
    }

    pub fn absorb(&mut self, entries: &[FavoriteEntry]) {
        for entry in entries {
            if entry.id.is_empty() || entry.favorite_id.is_empty() {
                continue;
            }
            self.by_world.insert(
                entry.favorite_id.clone(),
                RemoteFavorite {
                    entry_id: entry.id.clone(),
                    tag: entry.tag().map(str::to_string),
                },
            );
        }
    }

    /// Take a complete listing as the new truth
    pub fn replace(&mut self, entries: &[FavoriteEntry]) {
        self.by_world.clear();
        self.absorb(entries);
    }

    /// Record that a world's favorite now lives in another group
    pub fn retag(&mut self, world_id: &str, tag: &str) -> bool {
        match self.by_world.get_mut(world_id) {
            Some(favorite) => {
                favorite.tag = Some(tag.to_string());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, world_id: &str) -> Option<&RemoteFavorite> {
        self.by_world.get(world_id)
    }

    pub fn is_favorited(&self, world_id: &str) -> bool {
        self.by_world.contains_key(world_id)
    }

    /// Drop whichever world the entry pointed at; returns that world
    pub fn remove_entry(&mut self, entry_id: &str) -> Option<String> {
        let world_id = self
            .by_world
            .iter()
            .find(|(_, fav)| fav.entry_id == entry_id)
            .map(|(world, _)| world.clone())?;
        self.by_world.remove(&world_id);
        Some(world_id)
    }

    pub fn remove_world(&mut self, world_id: &str) -> Option<RemoteFavorite> {
        self.by_world.remove(world_id)
    }
}

/// Requests understood by the extension's background script
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShelfMessage {
    GetAllWorlds,
    GetFolders,
    #[serde(rename_all = "camelCase")]
    AddWorld { world: SavedWorld },
    #[serde(rename_all = "camelCase")]
    RemoveWorld { world_id: String, folder_id: String },
    GetSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldsReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub worlds: Vec<SavedWorld>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldersReply {
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub folders: FolderLists,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWorldReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub world_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AddWorldReply {
    pub fn outcome(self) -> AddWorldOutcome {
        if self.success {
            return AddWorldOutcome::Added;
        }
        match self.reason.as_deref() {
            Some("already_exists") => AddWorldOutcome::AlreadyExists {
                world_name: self.world_name,
            },
            Some("private_world") => AddWorldOutcome::PrivateWorld {
                world_name: self.world_name,
            },
            other => AddWorldOutcome::Failed(
                self.error
                    .or_else(|| other.map(str::to_string))
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveWorldReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}
