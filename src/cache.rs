/// Resolution cache: world ID → record, plus favorite entry ID → world ID
use std::collections::HashMap;
use std::rc::Rc;

use crate::world_data::{FavoriteEntry, WorldRecord};

#[derive(Debug, Default)]
pub struct ResolutionCache {
    records: HashMap<String, Rc<WorldRecord>>,
    entries: HashMap<String, String>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        ResolutionCache::default()
    }

    /// Store every entry → world mapping and return the worlds still unresolved
    pub fn record_favorite_entries(&mut self, entries: &[FavoriteEntry]) -> Vec<String> {
        let mut unresolved = Vec::new();

        for entry in entries {
            if entry.id.is_empty() || entry.favorite_id.is_empty() {
                continue;
            }
            self.entries
                .insert(entry.id.clone(), entry.favorite_id.clone());

            if !self.records.contains_key(&entry.favorite_id)
                && !unresolved.contains(&entry.favorite_id)
            {
                unresolved.push(entry.favorite_id.clone());
            }
        }

        unresolved
    }

    pub fn resolve(&self, world_id: &str) -> Option<Rc<WorldRecord>> {
        self.records.get(world_id).cloned()
    }

    pub fn contains(&self, world_id: &str) -> bool {
        self.records.contains_key(world_id)
    }

    pub fn world_for_entry(&self, entry_id: &str) -> Option<String> {
        self.entries.get(entry_id).cloned()
    }

    /// Insert or replace a record; the newest resolution always wins
    pub fn insert(&mut self, record: WorldRecord) -> Rc<WorldRecord> {
        let record = Rc::new(record);
        self.records.insert(record.id.clone(), Rc::clone(&record));
        record
    }

    /// View reset: the entry mapping belongs to the view that just went away
    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, world: &str) -> FavoriteEntry {
        FavoriteEntry {
            id: id.to_string(),
            favorite_id: world.to_string(),
            tags: vec!["worlds1".to_string()],
            kind: Some("world".to_string()),
        }
    }

    fn record(id: &str, name: &str) -> WorldRecord {
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

    #[test]
    fn test_record_entries_reports_unresolved_once() {
        let mut cache = ResolutionCache::new();
        cache.insert(record("wrld_known", "Known"));

        let unresolved = cache.record_favorite_entries(&[
            entry("fvrt_1", "wrld_a"),
            entry("fvrt_2", "wrld_known"),
            entry("fvrt_3", "wrld_a"),
        ]);

        assert_eq!(unresolved, vec!["wrld_a".to_string()]);
        assert_eq!(cache.world_for_entry("fvrt_2"), Some("wrld_known".to_string()));
        assert_eq!(cache.world_for_entry("fvrt_3"), Some("wrld_a".to_string()));
    }

    #[test]
    fn test_record_entries_skips_incomplete() {
        let mut cache = ResolutionCache::new();

        let unresolved = cache.record_favorite_entries(&[entry("", "wrld_a"), entry("fvrt_1", "")]);

        assert!(unresolved.is_empty());
        assert_eq!(cache.world_for_entry("fvrt_1"), None);
    }

    #[test]
    fn test_newer_resolution_replaces() {
        let mut cache = ResolutionCache::new();
        cache.insert(record("wrld_a", "Old"));
        cache.insert(record("wrld_a", "New"));

        assert_eq!(cache.resolve("wrld_a").unwrap().name, "New");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_entries_keeps_records() {
        let mut cache = ResolutionCache::new();
        cache.insert(record("wrld_a", "Alpha"));
        cache.record_favorite_entries(&[entry("fvrt_1", "wrld_a")]);

        cache.clear_entries();

        assert_eq!(cache.world_for_entry("fvrt_1"), None);
        assert!(cache.contains("wrld_a"));
    }
}
