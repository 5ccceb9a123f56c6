/// Content script for World Shelf: wires the page, the extension and the shelf together

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, MutationObserver, MutationObserverInit};

use crate::api::{RemoteClient, OWN_REQUEST_HEADER};
use crate::config::ShelfConfig;
use crate::controls::Scheduled;
use crate::decorate::CardProbe;
use crate::error::ShelfError;
use crate::interceptor;
use crate::modal::FolderRequest;
use crate::saved::{
    AddWorldReply, FoldersReply, RemoveWorldReply, ShelfMessage, WorldsReply,
};
use crate::scanner::ViewWatch;
use crate::shelf::{Collaborator, Interaction, NoticeKind, RemoteApi, Shelf};
use crate::world_data::{AddWorldOutcome, FavoriteEntry, FolderLists, SavedWorld, WorldRecord};

use super::card_view::{self, DomCard};
use super::components::{open_folder_modal, show_toast};

// Import JS bridge functions
#[wasm_bindgen(module = "/content.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendShelfMessage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn writeClipboard(text: &str) -> Result<(), JsValue>;

    fn installFetchTap(should_tap: &js_sys::Function, on_body: &js_sys::Function, own_header: &str);
}

type PageShelf = Shelf<PageEnv>;

/// Browser implementation of the shelf's environment
pub struct PageEnv {
    client: RemoteClient,
    toast_ms: u32,
}

impl PageEnv {
    pub fn new(config: &ShelfConfig) -> Self {
        PageEnv {
            client: RemoteClient::new(&config.api_base(), config.page_size),
            toast_ms: config.toast_ms,
        }
    }
}

fn js_error(e: JsValue) -> ShelfError {
    let message = e
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(&e, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", e));
    ShelfError::from_runtime_message(&message)
}

async fn request<T: DeserializeOwned>(message: &ShelfMessage) -> Result<T, ShelfError> {
    let message_js = serde_wasm_bindgen::to_value(message)
        .map_err(|e| ShelfError::Decode(format!("Failed to serialize: {:?}", e)))?;

    let reply = sendShelfMessage(message_js).await.map_err(js_error)?;
    if reply.is_null() || reply.is_undefined() {
        return Err(ShelfError::Rejected("no reply from the extension".to_string()));
    }

    serde_wasm_bindgen::from_value(reply)
        .map_err(|e| ShelfError::Decode(format!("Failed to parse reply: {:?}", e)))
}

fn rejected(error: Option<String>) -> ShelfError {
    ShelfError::Rejected(error.unwrap_or_else(|| "unknown error".to_string()))
}

impl Collaborator for PageEnv {
    async fn get_all_worlds(&self) -> Result<Vec<SavedWorld>, ShelfError> {
        let reply: WorldsReply = request(&ShelfMessage::GetAllWorlds).await?;
        if !reply.success {
            return Err(rejected(reply.error));
        }
        Ok(reply.worlds)
    }

    async fn get_folders(&self) -> Result<FolderLists, ShelfError> {
        let reply: FoldersReply = request(&ShelfMessage::GetFolders).await?;
        if !reply.success {
            return Err(rejected(reply.error));
        }
        Ok(reply.folders)
    }

    async fn add_world(&self, world: SavedWorld) -> Result<AddWorldOutcome, ShelfError> {
        let reply: AddWorldReply = request(&ShelfMessage::AddWorld { world }).await?;
        Ok(reply.outcome())
    }

    async fn remove_world(&self, world_id: &str, folder_id: &str) -> Result<(), ShelfError> {
        let reply: RemoveWorldReply = request(&ShelfMessage::RemoveWorld {
            world_id: world_id.to_string(),
            folder_id: folder_id.to_string(),
        })
        .await?;
        if !reply.success {
            return Err(rejected(reply.error));
        }
        Ok(())
    }
}

impl RemoteApi for PageEnv {
    async fn list_favorites(&self) -> Result<Vec<FavoriteEntry>, ShelfError> {
        self.client.list_favorites(None).await
    }

    async fn fetch_world(&self, world_id: &str) -> Result<Option<WorldRecord>, ShelfError> {
        self.client.fetch_world(world_id).await
    }

    async fn add_favorite(&self, world_id: &str, tag: &str) -> Result<FavoriteEntry, ShelfError> {
        self.client.add_favorite(world_id, tag).await
    }

    async fn update_favorite_tag(&self, entry_id: &str, tag: &str) -> Result<(), ShelfError> {
        self.client.update_favorite_tag(entry_id, tag).await
    }

    async fn remove_favorite(&self, entry_id: &str) -> Result<(), ShelfError> {
        self.client.remove_favorite(entry_id).await
    }
}

impl Interaction for PageEnv {
    async fn pick_folder(&self, request: FolderRequest) -> Result<String, ShelfError> {
        open_folder_modal(request).await
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), ShelfError> {
        writeClipboard(text).await.map_err(js_error)
    }

    fn notify(&self, kind: NoticeKind, message: &str) {
        show_toast(kind, message, self.toast_ms);
    }

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Scheduled {
        Scheduled::new(Timeout::new(delay_ms, task))
    }
}

fn location_href() -> Option<String> {
    web_sys::window().and_then(|w| w.location().href().ok())
}

/// Find card candidates on the page and decorate the new ones
fn sweep(shelf: &Rc<PageShelf>) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let selectors = &shelf.config().selectors;
    let nodes = match document.query_selector_all(&selectors.card) {
        Ok(nodes) => nodes,
        Err(e) => {
            log::warn!("bad card selector {}: {:?}", selectors.card, e);
            return;
        }
    };

    let mut found: Vec<(String, Rc<DomCard>)> = Vec::new();
    for i in 0..nodes.length() {
        if let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            let key = card_view::card_key(&element);
            found.push((key, Rc::new(DomCard::new(element, selectors.clone()))));
        }
    }

    let candidates = found
        .iter()
        .map(|(key, dom)| (key.clone(), Rc::clone(dom) as Rc<dyn CardProbe>));
    let decorated = shelf.sweep(candidates);

    for card in decorated {
        let Some((_, dom)) = found.iter().find(|(key, _)| key == card.key()) else {
            continue;
        };
        if let Err(e) = card_view::mount(shelf, &card, dom) {
            log::warn!("could not decorate card: {:?}", e);
        }
    }
}

/// Re-run the sweep whenever the page's markup changes
fn observe_mutations(shelf: &Rc<PageShelf>) -> Result<(), JsValue> {
    let body = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .ok_or_else(|| JsValue::from_str("page has no body"))?;

    let shelf = Rc::clone(shelf);
    let callback = Closure::wrap(Box::new(move |_records: js_sys::Array, _observer: MutationObserver| {
        sweep(&shelf);
    }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

    let filter = js_sys::Array::new();
    for name in ["data-scrollkey", "href", "id"] {
        filter.push(&JsValue::from_str(name));
    }
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    options.set_attributes(true);
    options.set_attribute_filter(&filter);

    observer.observe_with_options(&body, &options)?;

    // Observes for the lifetime of the page
    callback.forget();
    Ok(())
}

/// Poll for navigation and favorite-group switches, resetting on either
fn watch_view(shelf: &Rc<PageShelf>) {
    let watch = RefCell::new(ViewWatch::new());
    let shelf = Rc::clone(shelf);
    let interval_ms = shelf.config().poll_interval_ms;

    Interval::new(interval_ms, move || {
        let Some(url) = location_href() else {
            return;
        };
        let selector_text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.query_selector(&shelf.config().selectors.view_selector).ok().flatten())
            .and_then(|e| e.text_content());

        let Some(reason) = watch.borrow_mut().observe(&url, selector_text.as_deref()) else {
            return;
        };
        log::info!("{:?}", reason);
        shelf.reset();

        let shelf = Rc::clone(&shelf);
        Timeout::new(shelf.config().settle_delay_ms, move || {
            sweep(&shelf);
            spawn_local(async move {
                shelf.load_remote_favorites().await;
                sweep(&shelf);
            });
        })
        .forget();
    })
    .forget();
}

/// Route the page's own favorites and world detail responses into the shelf
fn tap_fetches(shelf: &Rc<PageShelf>) {
    let should_tap = Closure::wrap(Box::new(|url: String, base: String| {
        interceptor::classify(&url, &base).is_some()
    }) as Box<dyn Fn(String, String) -> bool>);

    let shelf = Rc::clone(shelf);
    let on_body = Closure::wrap(Box::new(move |url: String, base: String, body: String| {
        let Some(tap) = interceptor::classify(&url, &base) else {
            return;
        };
        log::debug!("tapped {:?}", tap);
        let Some(tapped) = interceptor::parse(&tap, &body) else {
            return;
        };
        let shelf = Rc::clone(&shelf);
        spawn_local(async move {
            shelf.ingest(tapped).await;
        });
    }) as Box<dyn Fn(String, String, String)>);

    // Our own requests carry OWN_REQUEST_HEADER and are left alone
    installFetchTap(
        should_tap.as_ref().unchecked_ref(),
        on_body.as_ref().unchecked_ref(),
        OWN_REQUEST_HEADER,
    );

    // The page keeps calling these for as long as it lives
    should_tap.forget();
    on_body.forget();
}

async fn load_config() -> ShelfConfig {
    match request::<ShelfConfig>(&ShelfMessage::GetSettings).await {
        Ok(config) => config,
        Err(e) => {
            log::info!("using default settings: {}", e);
            ShelfConfig::default()
        }
    }
}

/// Boot the shelf on the current page
pub fn start() {
    spawn_local(async move {
        let config = load_config().await;
        log::set_max_level(config.log_filter());

        let env = PageEnv::new(&config);
        let shelf = Shelf::new(env, config);

        tap_fetches(&shelf);
        sweep(&shelf);

        if let Err(e) = observe_mutations(&shelf) {
            log::error!("could not observe the page: {:?}", e);
        }
        watch_view(&shelf);

        shelf.load_saved().await;
        shelf.load_remote_favorites().await;
        sweep(&shelf);

        log::info!("World Shelf ready, {} cards decorated", shelf.decorated_count());
    });
}
