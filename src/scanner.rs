/// Card discovery bookkeeping: per-epoch membership and view-change detection
use std::collections::HashSet;
use std::hash::Hash;

use crate::world_id::view_kind;

/// The set of cards already decorated since the last reset
#[derive(Debug)]
pub struct ScanEpoch<K> {
    epoch: u64,
    processed: HashSet<K>,
}

impl<K: Eq + Hash> ScanEpoch<K> {
    pub fn new() -> Self {
        ScanEpoch {
            epoch: 0,
            processed: HashSet::new(),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_processed(&self, key: &K) -> bool {
        self.processed.contains(key)
    }

    /// Returns false if the card was already processed in this epoch
    pub fn mark(&mut self, key: K) -> bool {
        self.processed.insert(key)
    }

    /// Let a card be picked up again within the current epoch
    pub fn forget(&mut self, key: &K) -> bool {
        self.processed.remove(key)
    }

    /// Start a new epoch; old membership is discarded, never merged
    pub fn reset(&mut self) {
        self.processed = HashSet::new();
        self.epoch += 1;
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

impl<K: Eq + Hash> Default for ScanEpoch<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResetReason {
    Navigated(String),
    ViewSwitched(String),
}

/// Remembers the last location and view-selector text seen by the poller
#[derive(Debug, Default)]
pub struct ViewWatch {
    last_url: Option<String>,
    last_selector: Option<String>,
}

impl ViewWatch {
    pub fn new() -> Self {
        ViewWatch::default()
    }

    pub fn observe(&mut self, url: &str, selector_text: Option<&str>) -> Option<ResetReason> {
        let url_changed = self.last_url.as_deref() != Some(url);
        if url_changed {
            self.last_url = Some(url.to_string());
        }

        let selector_text = selector_text.map(str::trim).filter(|t| !t.is_empty());
        let selector_changed = match (self.last_selector.as_deref(), selector_text) {
            (Some(previous), Some(current)) => previous != current,
            _ => false,
        };
        if let Some(current) = selector_text {
            self.last_selector = Some(current.to_string());
        }

        if url_changed && view_kind(url).is_some() {
            // A navigation also replaces the selector, so start its history over
            self.last_selector = selector_text.map(str::to_string);
            return Some(ResetReason::Navigated(url.to_string()));
        }
        if selector_changed {
            return selector_text.map(|t| ResetReason::ViewSwitched(t.to_string()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_idempotent_within_epoch() {
        let mut scan = ScanEpoch::new();

        assert!(scan.mark("card-1"));
        assert!(!scan.mark("card-1"));
        assert!(scan.is_processed(&"card-1"));
        assert_eq!(scan.len(), 1);
    }

    #[test]
    fn test_reset_discards_membership() {
        let mut scan = ScanEpoch::new();
        scan.mark("card-1");

        scan.reset();

        assert_eq!(scan.epoch(), 1);
        assert!(scan.is_empty());
        assert!(!scan.is_processed(&"card-1"));
        assert!(scan.mark("card-1"));
    }

    #[test]
    fn test_forget_allows_one_card_again() {
        let mut scan = ScanEpoch::new();
        scan.mark("card-1");
        scan.mark("card-2");

        assert!(scan.forget(&"card-1"));
        assert!(!scan.forget(&"card-1"));

        assert_eq!(scan.epoch(), 0);
        assert!(!scan.is_processed(&"card-1"));
        assert!(scan.is_processed(&"card-2"));
    }

    #[test]
    fn test_first_observation_of_favorites_view_resets() {
        let mut watch = ViewWatch::new();

        assert_eq!(
            watch.observe("https://vrchat.com/home/favorites/world", Some("Group 1")),
            Some(ResetReason::Navigated("https://vrchat.com/home/favorites/world".to_string()))
        );
        assert_eq!(watch.observe("https://vrchat.com/home/favorites/world", Some("Group 1")), None);
    }

    #[test]
    fn test_navigation_elsewhere_does_not_reset() {
        let mut watch = ViewWatch::new();

        assert_eq!(watch.observe("https://vrchat.com/home/avatars", None), None);
        assert_eq!(
            watch.observe("https://vrchat.com/home", None),
            Some(ResetReason::Navigated("https://vrchat.com/home".to_string()))
        );
    }

    #[test]
    fn test_selector_text_change_resets() {
        let mut watch = ViewWatch::new();
        let url = "https://vrchat.com/home/favorites/world";
        watch.observe(url, Some("Group 1"));

        assert_eq!(
            watch.observe(url, Some("Group 2")),
            Some(ResetReason::ViewSwitched("Group 2".to_string()))
        );
        assert_eq!(watch.observe(url, Some("Group 2")), None);
    }

    #[test]
    fn test_selector_disappearing_is_not_a_switch() {
        let mut watch = ViewWatch::new();
        let url = "https://vrchat.com/home/favorites/world";
        watch.observe(url, Some("Group 1"));

        assert_eq!(watch.observe(url, None), None);
        assert_eq!(watch.observe(url, Some("  ")), None);
        assert_eq!(watch.observe(url, Some("Group 1")), None);
    }
}
