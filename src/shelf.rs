/// The shared context: caches, mirrors and decorated cards, plus the
/// environment every asynchronous action goes through
use std::cell::RefCell;
use std::rc::Rc;

use futures::future::join_all;

use crate::cache::ResolutionCache;
use crate::config::ShelfConfig;
use crate::controls::{CardModel, DeleteState, Scheduled};
use crate::decorate::{classify_card, CardProbe, CardRegistry};
use crate::error::ShelfError;
use crate::interceptor::Tapped;
use crate::modal::FolderRequest;
use crate::saved::{RemoteFavorites, SavedWorlds};
use crate::scanner::ScanEpoch;
use crate::world_data::{
    AddWorldOutcome, FavoriteEntry, FolderLists, SavedWorld, WorldRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// The extension's background script
#[allow(async_fn_in_trait)]
pub trait Collaborator {
    async fn get_all_worlds(&self) -> Result<Vec<SavedWorld>, ShelfError>;
    async fn get_folders(&self) -> Result<FolderLists, ShelfError>;
    async fn add_world(&self, world: SavedWorld) -> Result<AddWorldOutcome, ShelfError>;
    async fn remove_world(&self, world_id: &str, folder_id: &str) -> Result<(), ShelfError>;
}

/// The site's own API
#[allow(async_fn_in_trait)]
pub trait RemoteApi {
    /// Every world favorite, all pages
    async fn list_favorites(&self) -> Result<Vec<FavoriteEntry>, ShelfError>;
    /// `Ok(None)` when the site says the world does not exist
    async fn fetch_world(&self, world_id: &str) -> Result<Option<WorldRecord>, ShelfError>;
    async fn add_favorite(&self, world_id: &str, tag: &str) -> Result<FavoriteEntry, ShelfError>;
    /// Move an existing favorite to another group
    async fn update_favorite_tag(&self, entry_id: &str, tag: &str) -> Result<(), ShelfError>;
    async fn remove_favorite(&self, entry_id: &str) -> Result<(), ShelfError>;
}

/// Everything that talks to the user or the clock
#[allow(async_fn_in_trait)]
pub trait Interaction {
    /// Resolves with the chosen folder ID or `ShelfError::Cancelled`
    async fn pick_folder(&self, request: FolderRequest) -> Result<String, ShelfError>;
    async fn write_clipboard(&self, text: &str) -> Result<(), ShelfError>;
    fn notify(&self, kind: NoticeKind, message: &str);
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Scheduled;
}

pub trait ShelfEnv: Collaborator + RemoteApi + Interaction {}

impl<T: Collaborator + RemoteApi + Interaction> ShelfEnv for T {}

pub struct Shelf<E> {
    pub(crate) env: E,
    pub(crate) config: ShelfConfig,
    pub(crate) cache: RefCell<ResolutionCache>,
    pub(crate) saved: RefCell<SavedWorlds>,
    pub(crate) remote: RefCell<RemoteFavorites>,
    pub(crate) cards: RefCell<CardRegistry>,
    scan: RefCell<ScanEpoch<String>>,
}

impl<E: ShelfEnv> Shelf<E> {
    pub fn new(env: E, config: ShelfConfig) -> Rc<Shelf<E>> {
        Rc::new(Shelf {
            env,
            config,
            cache: RefCell::new(ResolutionCache::new()),
            saved: RefCell::new(SavedWorlds::new()),
            remote: RefCell::new(RemoteFavorites::new()),
            cards: RefCell::new(CardRegistry::new()),
            scan: RefCell::new(ScanEpoch::new()),
        })
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn config(&self) -> &ShelfConfig {
        &self.config
    }

    pub fn resolve(&self, world_id: &str) -> Option<Rc<WorldRecord>> {
        self.cache.borrow().resolve(world_id)
    }

    pub fn is_saved(&self, world_id: &str) -> bool {
        self.saved.borrow().contains(world_id)
    }

    pub fn is_remote_favorite(&self, world_id: &str) -> bool {
        self.remote.borrow().is_favorited(world_id)
    }

    pub fn epoch(&self) -> u64 {
        self.scan.borrow().epoch()
    }

    pub fn decorated_count(&self) -> usize {
        self.cards.borrow().len()
    }

    /// Seed the saved set from the extension's store
    pub async fn load_saved(&self) {
        match self.env.get_all_worlds().await {
            Ok(worlds) => {
                log::debug!("{} worlds in the local store", worlds.len());
                *self.saved.borrow_mut() = SavedWorlds::from_worlds(&worlds);
                self.refresh_all();
            }
            Err(e) => log::warn!("could not load saved worlds: {}", e),
        }
    }

    /// Fetch the site's full favorites list and feed it through the entry mapping
    ///
    /// The full list replaces the favorites shadow, so entries removed by the
    /// page itself disappear here too.
    pub async fn load_remote_favorites(&self) {
        match self.env.list_favorites().await {
            Ok(entries) => {
                self.remote.borrow_mut().replace(&entries);
                self.observe_favorites(entries).await
            }
            Err(e) => log::warn!("could not list favorites: {}", e),
        }
    }

    /// Record entries, then resolve every world that is still unknown
    pub async fn observe_favorites(&self, entries: Vec<FavoriteEntry>) {
        let unresolved = self.record_favorite_entries(&entries);
        join_all(unresolved.iter().map(|id| self.fetch_and_cache(id))).await;
    }

    /// Store entry mappings and the favorite shadow; returns unresolved worlds
    pub fn record_favorite_entries(&self, entries: &[FavoriteEntry]) -> Vec<String> {
        let unresolved = self.cache.borrow_mut().record_favorite_entries(entries);
        self.remote.borrow_mut().absorb(entries);
        self.refresh_all();
        unresolved
    }

    /// Resolve a world unless it is already cached; failures stay unresolved
    pub async fn fetch_and_cache(&self, world_id: &str) {
        if self.cache.borrow().contains(world_id) {
            return;
        }
        match self.env.fetch_world(world_id).await {
            Ok(Some(record)) => {
                self.apply_record(record);
            }
            Ok(None) => {
                log::debug!("{} no longer exists", world_id);
                self.apply_record(WorldRecord::deleted(world_id));
            }
            Err(e) => log::warn!("could not resolve {}: {}", world_id, e),
        }
    }

    /// Cache a record and push it to every card showing that world
    pub fn apply_record(&self, record: WorldRecord) -> Rc<WorldRecord> {
        let world_id = record.id.clone();
        let record = self.cache.borrow_mut().insert(record);
        self.refresh_world(&world_id);
        record
    }

    /// Handle a body the interceptor managed to parse
    pub async fn ingest(&self, tapped: Tapped) {
        match tapped {
            Tapped::Favorites(entries) => self.observe_favorites(entries).await,
            Tapped::World(record) => {
                self.apply_record(record);
            }
        }
    }

    /// Forget everything scoped to the current view
    pub fn reset(&self) {
        self.scan.borrow_mut().reset();
        self.cache.borrow_mut().clear_entries();
        self.cards.borrow_mut().clear();
        log::info!("view reset, epoch {}", self.epoch());
    }

    /// Decorate every candidate not yet processed in this epoch
    ///
    /// Candidates are `(key, probe)` pairs; the key is stable for one element.
    /// Cards whose world cannot be identified yet are left for a later sweep.
    pub fn sweep<I>(&self, candidates: I) -> Vec<Rc<CardModel>>
    where
        I: IntoIterator<Item = (String, Rc<dyn CardProbe>)>,
    {
        let detached = self.cards.borrow_mut().prune_detached();
        if !detached.is_empty() {
            let mut scan = self.scan.borrow_mut();
            for key in &detached {
                scan.forget(key);
            }
            log::debug!("dropped {} detached cards", detached.len());
        }

        let mut decorated = Vec::new();

        for (key, probe) in candidates {
            if self.scan.borrow().is_processed(&key) {
                continue;
            }
            let Some(context) = classify_card(probe.as_ref()) else {
                continue;
            };
            self.scan.borrow_mut().mark(key.clone());

            let card = CardModel::new(key, context, probe);
            self.refresh_card(&card);
            self.cards.borrow_mut().register(Rc::clone(&card));
            decorated.push(card);
        }

        if !decorated.is_empty() {
            log::debug!("decorated {} cards", decorated.len());
        }
        decorated
    }

    /// Re-derive a card's view of the caches and mirrors
    pub(crate) fn refresh_card(&self, card: &CardModel) {
        let known = card.state().world_id.clone();
        let world_id = card
            .context()
            .world_id(&self.cache.borrow())
            .or(known);
        let record = world_id
            .as_deref()
            .and_then(|id| self.cache.borrow().resolve(id));
        let saved = world_id
            .as_deref()
            .is_some_and(|id| self.saved.borrow().contains(id));
        let favorite_entry = world_id
            .as_deref()
            .and_then(|id| self.remote.borrow().get(id).map(|f| f.entry_id.clone()));

        let context = card.context();
        card.update(|state| {
            state.world_id = world_id;
            state.record = record;
            state.saved = saved;
            state.favorite_entry = favorite_entry;
            // An armed delete with nothing left to remove must not linger
            if state.delete == DeleteState::Confirming && state.removable_entry(context).is_none() {
                state.delete = DeleteState::Idle;
            }
        });
        if card.state().delete != DeleteState::Confirming {
            card.set_confirm_timer(None);
        }
    }

    pub(crate) fn refresh_world(&self, world_id: &str) {
        let cards = self
            .cards
            .borrow()
            .cards_for(world_id, &self.cache.borrow());
        for card in cards {
            self.refresh_card(&card);
        }
    }

    pub(crate) fn refresh_all(&self) {
        let cards = self.cards.borrow().all();
        for card in cards {
            self.refresh_card(&card);
        }
    }
}
