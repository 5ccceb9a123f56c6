/// DOM side of a decorated card: probing the element and rendering its controls
use std::rc::{Rc, Weak};

use gloo_events::{EventListener, EventListenerOptions};
use uuid::Uuid;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlButtonElement, HtmlElement};

use crate::config::Selectors;
use crate::controls::{CardModel, CardState, Slot};
use crate::decorate::CardProbe;
use crate::shelf::{Shelf, ShelfEnv};
use crate::world_id::canonical_world_url;

pub const KEY_ATTRIBUTE: &str = "data-world-shelf-key";
pub const CONTROLS_CLASS: &str = "world-shelf-controls";

/// Grey tile shown in place of a deleted world's image
const FALLBACK_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='16' height='9'%3E%3Crect width='16' height='9' fill='%23444'/%3E%3C/svg%3E";

/// Stable key for a card element, stamped on first sight
pub fn card_key(element: &Element) -> String {
    if let Some(key) = element.get_attribute(KEY_ATTRIBUTE) {
        return key;
    }
    let key = Uuid::new_v4().to_string();
    if let Err(e) = element.set_attribute(KEY_ATTRIBUTE, &key) {
        log::debug!("could not stamp card: {:?}", e);
    }
    key
}

/// A card element read through the configured selectors
pub struct DomCard {
    element: Element,
    selectors: Selectors,
}

impl DomCard {
    pub fn new(element: Element, selectors: Selectors) -> Self {
        DomCard { element, selectors }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    fn find(&self, selector: &str) -> Option<Element> {
        self.element.query_selector(selector).ok().flatten()
    }
}

impl CardProbe for DomCard {
    fn remove_favorite_entry_id(&self) -> Option<String> {
        self.find(&self.selectors.remove_favorite)
            .and_then(|button| button.get_attribute("id"))
    }

    fn scroll_key(&self) -> Option<String> {
        self.element.get_attribute("data-scrollkey")
    }

    fn link_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.element.get_attribute("href").into_iter().collect();
        if let Ok(anchors) = self.element.query_selector_all("a[href]") {
            for i in 0..anchors.length() {
                let href = anchors
                    .item(i)
                    .and_then(|node| node.dyn_into::<Element>().ok())
                    .and_then(|anchor| anchor.get_attribute("href"));
                targets.extend(href);
            }
        }
        targets
    }

    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }
}

fn slot_name(slot: Slot) -> &'static str {
    match slot {
        Slot::Save => "save",
        Slot::CopyLink => "copy",
        Slot::Favorite => "favorite",
        Slot::Delete => "delete",
    }
}

/// Append the control row to a freshly decorated card
///
/// A row left over from an earlier epoch is replaced. Listeners live as long
/// as the card model stays registered.
pub fn mount<E: ShelfEnv + 'static>(
    shelf: &Rc<Shelf<E>>,
    card: &Rc<CardModel>,
    dom: &DomCard,
) -> Result<(), wasm_bindgen::JsValue> {
    let element = dom.element().clone();
    let document = element
        .owner_document()
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("card is detached"))?;

    if let Ok(Some(stale)) = element.query_selector(&format!(":scope > .{}", CONTROLS_CLASS)) {
        stale.remove();
    }

    let row = document.create_element("div")?;
    row.set_class_name(CONTROLS_CLASS);
    row.set_attribute(
        "style",
        "position: absolute; left: 8px; right: 8px; bottom: 8px; display: flex; gap: 6px; z-index: 2;",
    )?;

    let mut buttons = Vec::new();
    let mut listeners = Vec::new();
    for slot in Slot::ALL {
        let button: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
        button.set_type("button");
        button.set_attribute("data-slot", slot_name(slot))?;
        listeners.push(click_listener(shelf, card, &button, slot));
        row.append_child(&button)?;
        buttons.push((slot, button));
    }

    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let style = html.style();
        style.set_property("position", "relative")?;
        style.set_property("padding-bottom", "44px")?;
    }
    element.append_child(&row)?;

    let selectors = shelf.config().selectors.clone();
    let origin = shelf.config().site_origin.clone();
    card.subscribe(move |state| {
        // Keeps the click listeners attached for the model's lifetime
        let _ = &listeners;
        render_controls(&buttons, state);
        render_card(&element, &selectors, &origin, state);
    });

    Ok(())
}

fn click_listener<E: ShelfEnv + 'static>(
    shelf: &Rc<Shelf<E>>,
    card: &Rc<CardModel>,
    button: &HtmlButtonElement,
    slot: Slot,
) -> EventListener {
    let shelf: Weak<Shelf<E>> = Rc::downgrade(shelf);
    let card: Weak<CardModel> = Rc::downgrade(card);
    let options = EventListenerOptions::enable_prevent_default();

    EventListener::new_with_options(button, "click", options, move |event| {
        // The card itself is often a link
        event.prevent_default();
        event.stop_propagation();

        let (Some(shelf), Some(card)) = (shelf.upgrade(), card.upgrade()) else {
            return;
        };
        spawn_local(async move {
            shelf.click(&card, slot).await;
        });
    })
}

fn render_controls(buttons: &[(Slot, HtmlButtonElement)], state: &CardState) {
    for (slot, button) in buttons {
        let view = state.view(*slot);
        button.set_text_content(Some(&view.label));
        button.set_title(&view.title);
        button.set_disabled(view.busy || view.placeholder || state.removed);
        if let Err(e) = button.set_attribute("style", &super::components::control_style(&view)) {
            log::debug!("could not style control: {:?}", e);
        }
    }
}

fn set_if_changed(element: &Element, name: &str, value: &str) {
    if element.get_attribute(name).as_deref() != Some(value) {
        if let Err(e) = element.set_attribute(name, value) {
            log::debug!("could not set {} on card: {:?}", name, e);
        }
    }
}

/// Push resolved world details into the card's own markup
fn render_card(element: &Element, selectors: &Selectors, origin: &str, state: &CardState) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let opacity = if state.removed { "0.4" } else { "" };
        if let Err(e) = html.style().set_property("opacity", opacity) {
            log::debug!("could not fade card: {:?}", e);
        }
    }

    let Some(record) = &state.record else {
        return;
    };

    if let Ok(Some(title)) = element.query_selector(&selectors.title) {
        if title.text_content().as_deref() != Some(record.name.as_str()) && !record.name.is_empty() {
            title.set_text_content(Some(&record.name));
        }
    }

    if let Ok(Some(image)) = element.query_selector(&selectors.image) {
        let src = if record.deleted {
            Some(FALLBACK_IMAGE)
        } else {
            record.preview_image()
        };
        if let Some(src) = src {
            set_if_changed(&image, "src", src);
        }
    }

    if let Ok(Some(link)) = element.query_selector(&selectors.link) {
        set_if_changed(&link, "href", &canonical_world_url(origin, &record.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names_are_distinct() {
        let names: std::collections::HashSet<&str> = Slot::ALL.iter().map(|s| slot_name(*s)).collect();
        assert_eq!(names.len(), Slot::ALL.len());
    }

    #[test]
    fn test_fallback_image_is_inline() {
        assert!(FALLBACK_IMAGE.starts_with("data:image/svg+xml,"));
    }
}
