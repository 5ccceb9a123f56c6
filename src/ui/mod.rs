/// UI module exports
pub mod card_view;
pub mod components;
pub mod content;
