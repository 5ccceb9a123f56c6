/// World Shelf - save, copy and manage VRChat favorite worlds from the page itself
/// Built with Rust + WASM + Yew

pub mod actions;
pub mod api;
pub mod cache;
pub mod config;
pub mod controls;
pub mod decorate;
pub mod error;
pub mod interceptor;
pub mod modal;
pub mod saved;
pub mod scanner;
pub mod shelf;
pub mod world_data;
pub mod world_id;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export world ID parsing for the JS side
#[wasm_bindgen]
pub fn world_id_from_link(href: &str) -> Option<String> {
    world_id::world_id_from_link(href)
}

// Decorate world cards on the current page
#[wasm_bindgen]
pub fn start_content_script() {
    ui::content::start();
}
