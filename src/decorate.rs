/// Card context classification and the registry of decorated cards
use std::rc::Rc;

use crate::cache::ResolutionCache;
use crate::controls::CardModel;
use crate::world_id::{is_entry_id, world_id_from_link, world_id_from_scroll_key};

/// Read-only view of a card element
///
/// The browser implementation reads DOM attributes; tests use plain structs.
pub trait CardProbe {
    /// Entry ID carried by the card's remove-favorite control, if it has one
    fn remove_favorite_entry_id(&self) -> Option<String>;
    fn scroll_key(&self) -> Option<String>;
    fn link_targets(&self) -> Vec<String>;

    /// Whether the card is still part of the page
    fn is_attached(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardContext {
    /// A row of the favorites list; the world is found through the entry mapping
    List { entry_id: String },
    /// A world card anywhere else; the world ID is on the card itself
    Profile { world_id: String },
}

impl CardContext {
    pub fn is_list(&self) -> bool {
        matches!(self, CardContext::List { .. })
    }

    /// Current world ID for the card, if it can be known yet
    pub fn world_id(&self, cache: &ResolutionCache) -> Option<String> {
        match self {
            CardContext::List { entry_id } => cache.world_for_entry(entry_id),
            CardContext::Profile { world_id } => Some(world_id.clone()),
        }
    }

    pub fn entry_id(&self) -> Option<&str> {
        match self {
            CardContext::List { entry_id } => Some(entry_id),
            CardContext::Profile { .. } => None,
        }
    }
}

/// World ID readable straight off the card: scroll key first, then links
pub fn world_id_from_probe(probe: &dyn CardProbe) -> Option<String> {
    probe
        .scroll_key()
        .and_then(|key| world_id_from_scroll_key(&key))
        .or_else(|| {
            probe
                .link_targets()
                .iter()
                .find_map(|href| world_id_from_link(href))
        })
}

/// Decide how a card should be decorated, or `None` to retry on a later sweep
pub fn classify_card(probe: &dyn CardProbe) -> Option<CardContext> {
    if let Some(entry_id) = probe
        .remove_favorite_entry_id()
        .filter(|id| is_entry_id(id))
    {
        return Some(CardContext::List { entry_id });
    }

    world_id_from_probe(probe).map(|world_id| CardContext::Profile { world_id })
}

/// Every card decorated in the current epoch
#[derive(Default)]
pub struct CardRegistry {
    cards: Vec<Rc<CardModel>>,
}

impl CardRegistry {
    pub fn new() -> Self {
        CardRegistry::default()
    }

    pub fn register(&mut self, card: Rc<CardModel>) {
        self.cards.push(card);
    }

    /// Cards currently showing the given world, directly or via their entry
    pub fn cards_for(&self, world_id: &str, cache: &ResolutionCache) -> Vec<Rc<CardModel>> {
        self.cards
            .iter()
            .filter(|card| card.context().world_id(cache).as_deref() == Some(world_id))
            .cloned()
            .collect()
    }

    /// Drop cards that left the page; returns their keys
    pub fn prune_detached(&mut self) -> Vec<String> {
        let (kept, gone): (Vec<_>, Vec<_>) = self
            .cards
            .drain(..)
            .partition(|card| card.probe().is_attached());
        self.cards = kept;
        gone.iter().map(|card| card.key().to_string()).collect()
    }

    pub fn all(&self) -> Vec<Rc<CardModel>> {
        self.cards.clone()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default, Clone)]
    pub(crate) struct FakeCard {
        pub remove_id: Option<String>,
        pub scroll_key: Option<String>,
        pub links: Vec<String>,
        /// Shared so a test can detach a card after handing it over
        pub detached: Rc<Cell<bool>>,
    }

    impl CardProbe for FakeCard {
        fn remove_favorite_entry_id(&self) -> Option<String> {
            self.remove_id.clone()
        }

        fn scroll_key(&self) -> Option<String> {
            self.scroll_key.clone()
        }

        fn link_targets(&self) -> Vec<String> {
            self.links.clone()
        }

        fn is_attached(&self) -> bool {
            !self.detached.get()
        }
    }

    #[test]
    fn test_list_context_wins() {
        let card = FakeCard {
            remove_id: Some("fvrt_1".to_string()),
            scroll_key: Some("wrld_a".to_string()),
            ..FakeCard::default()
        };

        assert_eq!(
            classify_card(&card),
            Some(CardContext::List { entry_id: "fvrt_1".to_string() })
        );
    }

    #[test]
    fn test_profile_context_from_scroll_key_or_link() {
        let by_key = FakeCard {
            scroll_key: Some("wrld_a".to_string()),
            ..FakeCard::default()
        };
        let by_link = FakeCard {
            scroll_key: Some("???".to_string()),
            links: vec!["/home/user/usr_1".to_string(), "/home/world/wrld_b".to_string()],
            ..FakeCard::default()
        };

        assert_eq!(
            classify_card(&by_key),
            Some(CardContext::Profile { world_id: "wrld_a".to_string() })
        );
        assert_eq!(
            classify_card(&by_link),
            Some(CardContext::Profile { world_id: "wrld_b".to_string() })
        );
    }

    #[test]
    fn test_unidentifiable_card_is_skipped() {
        let card = FakeCard {
            remove_id: Some("not-an-entry".to_string()),
            scroll_key: Some("???".to_string()),
            ..FakeCard::default()
        };

        assert_eq!(classify_card(&card), None);
    }

    #[test]
    fn test_list_context_world_comes_from_mapping() {
        let mut cache = ResolutionCache::new();
        let context = CardContext::List { entry_id: "fvrt_1".to_string() };
        assert_eq!(context.world_id(&cache), None);

        cache.record_favorite_entries(&[crate::world_data::FavoriteEntry {
            id: "fvrt_1".to_string(),
            favorite_id: "wrld_a".to_string(),
            tags: Vec::new(),
            kind: None,
        }]);

        assert_eq!(context.world_id(&cache), Some("wrld_a".to_string()));
        assert_eq!(context.entry_id(), Some("fvrt_1"));
    }

    #[test]
    fn test_prune_detached_cards() {
        let attached = FakeCard {
            scroll_key: Some("wrld_a".to_string()),
            ..FakeCard::default()
        };
        let leaving = FakeCard {
            scroll_key: Some("wrld_b".to_string()),
            ..FakeCard::default()
        };
        let detached = Rc::clone(&leaving.detached);

        let mut registry = CardRegistry::new();
        for (key, card) in [("k1", attached), ("k2", leaving)] {
            let context = classify_card(&card).unwrap();
            registry.register(CardModel::new(key.to_string(), context, Rc::new(card)));
        }

        assert!(registry.prune_detached().is_empty());
        assert_eq!(registry.len(), 2);

        detached.set(true);
        assert_eq!(registry.prune_detached(), vec!["k2".to_string()]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.all()[0].key(), "k1");
    }
}
