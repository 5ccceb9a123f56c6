//! Browser tests for the DOM side of card decoration
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use web_sys::Element;

use gloo_net::http::Request;
use world_shelf::api::{with_session, OWN_REQUEST_HEADER};
use world_shelf::config::Selectors;
use world_shelf::decorate::{classify_card, CardContext, CardProbe};
use world_shelf::ui::card_view::{card_key, DomCard, KEY_ATTRIBUTE};

wasm_bindgen_test_configure!(run_in_browser);

fn element(html: &str) -> Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let host = document.create_element("div").unwrap();
    host.set_inner_html(html);
    document.body().unwrap().append_child(&host).unwrap();
    host.first_element_child().unwrap()
}

#[wasm_bindgen_test]
fn test_list_card_classified_by_remove_button() {
    let card = element(
        r#"<div data-scrollkey="???">
             <h4>Loading</h4>
             <button aria-label="Remove Favorite" id="fvrt_123"></button>
           </div>"#,
    );
    let dom = DomCard::new(card, Selectors::default());

    assert_eq!(dom.remove_favorite_entry_id().as_deref(), Some("fvrt_123"));
    assert_eq!(
        classify_card(&dom),
        Some(CardContext::List {
            entry_id: "fvrt_123".to_string()
        })
    );
}

#[wasm_bindgen_test]
fn test_profile_card_classified_by_link() {
    let card = element(
        r#"<div data-scrollkey="???">
             <a href="/home/world/wrld_abc-123/info">Alpha</a>
           </div>"#,
    );
    let dom = DomCard::new(card, Selectors::default());

    assert_eq!(
        classify_card(&dom),
        Some(CardContext::Profile {
            world_id: "wrld_abc-123".to_string()
        })
    );
}

#[wasm_bindgen_test]
fn test_unidentifiable_card_is_left_alone() {
    let card = element(r#"<div data-scrollkey="???"><h4>Nothing yet</h4></div>"#);
    let dom = DomCard::new(card, Selectors::default());

    assert_eq!(classify_card(&dom), None);
}

#[wasm_bindgen_test]
fn test_card_key_is_stable() {
    let card = element(r#"<div data-scrollkey="wrld_a"></div>"#);

    let first = card_key(&card);
    let second = card_key(&card);

    assert_eq!(first, second);
    assert_eq!(card.get_attribute(KEY_ATTRIBUTE), Some(first));
}

#[wasm_bindgen_test]
fn test_removed_card_is_detached() {
    let card = element(r#"<div data-scrollkey="wrld_abc"></div>"#);
    let dom = DomCard::new(card.clone(), Selectors::default());
    assert!(dom.is_attached());

    card.remove();
    assert!(!dom.is_attached());
}

#[wasm_bindgen_test]
fn test_shelf_requests_are_marked_as_own() {
    let request = with_session(Request::get("https://vrchat.com/api/1/worlds/wrld_abc"))
        .build()
        .unwrap();

    assert_eq!(request.headers().get(OWN_REQUEST_HEADER).as_deref(), Some("1"));
}
