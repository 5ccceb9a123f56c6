/// Per-card control state and the view models derived from it
///
/// Each decorated card owns one `CardModel`. All four controls read the same
/// `CardState`, so an action on one control is visible to its siblings as
/// soon as observers are notified.
use std::any::Any;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::decorate::{CardContext, CardProbe};
use crate::world_data::WorldRecord;

/// Color scheme of an injected control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlScheme {
    Neutral,
    Affirmative,
    Destructive,
    Confirming,
}

/// The four control slots, in the order they are appended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Save,
    CopyLink,
    Favorite,
    Delete,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Save, Slot::CopyLink, Slot::Favorite, Slot::Delete];
}

/// Short-lived outcome color on a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteState {
    Idle,
    Confirming,
    Executing,
}

/// What a click on the delete control should do right now
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteStep {
    StartConfirm,
    Execute { entry_id: String },
    FallbackUnsave,
    NothingToRemove,
    Ignore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlView {
    pub label: String,
    pub title: String,
    pub scheme: ControlScheme,
    pub busy: bool,
    /// Placeholder slot: takes up space but has no control
    pub placeholder: bool,
}

impl ControlView {
    fn new(label: &str, title: &str, scheme: ControlScheme) -> ControlView {
        ControlView {
            label: label.to_string(),
            title: title.to_string(),
            scheme,
            busy: false,
            placeholder: false,
        }
    }

    fn busy(mut self) -> ControlView {
        self.busy = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct CardState {
    pub list_context: bool,
    pub world_id: Option<String>,
    pub record: Option<Rc<WorldRecord>>,
    /// In the extension's local store
    pub saved: bool,
    pub saving: bool,
    /// Entry ID in the site's favorites, when favorited there
    pub favorite_entry: Option<String>,
    pub favoriting: bool,
    pub delete: DeleteState,
    /// A list card whose favorite was deleted
    pub removed: bool,
    pub flashes: HashMap<Slot, Flash>,
}

impl CardState {
    fn new(context: &CardContext) -> CardState {
        CardState {
            list_context: context.is_list(),
            world_id: None,
            record: None,
            saved: false,
            saving: false,
            favorite_entry: None,
            favoriting: false,
            delete: DeleteState::Idle,
            removed: false,
            flashes: HashMap::new(),
        }
    }

    pub fn flash(&self, slot: Slot) -> Option<Flash> {
        self.flashes.get(&slot).copied()
    }

    pub fn save_view(&self) -> ControlView {
        let view = match (self.saving, self.saved) {
            (true, _) => ControlView::new("⏳", "Working...", ControlScheme::Neutral).busy(),
            (false, true) => ControlView::new("💾 Saved", "Remove from World Shelf", ControlScheme::Affirmative),
            (false, false) => ControlView::new("💾 Save", "Save to World Shelf", ControlScheme::Neutral),
        };
        with_flash(view, self.flash(Slot::Save))
    }

    pub fn copy_view(&self) -> ControlView {
        match self.flash(Slot::CopyLink) {
            Some(Flash::Success) => ControlView::new("✓ Copied", "Link copied", ControlScheme::Affirmative),
            Some(Flash::Error) => ControlView::new("🔗 Copy", "Copy failed", ControlScheme::Destructive),
            None => ControlView::new("🔗 Copy", "Copy world link", ControlScheme::Neutral),
        }
    }

    pub fn favorite_view(&self) -> ControlView {
        if self.list_context {
            return ControlView {
                placeholder: true,
                ..ControlView::new("", "", ControlScheme::Neutral)
            };
        }
        let view = match (self.favoriting, &self.favorite_entry) {
            (true, _) => ControlView::new("⏳", "Working...", ControlScheme::Neutral).busy(),
            (false, Some(_)) => ControlView::new("★ Favorited", "Remove from VRChat favorites", ControlScheme::Affirmative),
            (false, None) => ControlView::new("☆ Favorite", "Add to VRChat favorites", ControlScheme::Neutral),
        };
        with_flash(view, self.flash(Slot::Favorite))
    }

    pub fn delete_view(&self) -> ControlView {
        let view = match self.delete {
            DeleteState::Idle => ControlView::new("🗑️", "Remove favorite", ControlScheme::Destructive),
            DeleteState::Confirming => ControlView::new("Confirm?", "Click again to remove", ControlScheme::Confirming),
            DeleteState::Executing => ControlView::new("⏳", "Removing...", ControlScheme::Confirming).busy(),
        };
        with_flash(view, self.flash(Slot::Delete))
    }

    pub fn view(&self, slot: Slot) -> ControlView {
        match slot {
            Slot::Save => self.save_view(),
            Slot::CopyLink => self.copy_view(),
            Slot::Favorite => self.favorite_view(),
            Slot::Delete => self.delete_view(),
        }
    }

    /// Entry ID the delete control would remove
    pub fn removable_entry(&self, context: &CardContext) -> Option<String> {
        match context {
            CardContext::List { entry_id } => Some(entry_id.clone()),
            CardContext::Profile { .. } => self.favorite_entry.clone(),
        }
    }

    pub fn delete_step(&self, context: &CardContext) -> DeleteStep {
        if self.delete == DeleteState::Executing || self.removed {
            return DeleteStep::Ignore;
        }
        let Some(entry_id) = self.removable_entry(context) else {
            // Not a remote favorite: deleting only touches the local store
            return if self.saved {
                DeleteStep::FallbackUnsave
            } else {
                DeleteStep::NothingToRemove
            };
        };
        match self.delete {
            DeleteState::Idle => DeleteStep::StartConfirm,
            DeleteState::Confirming => DeleteStep::Execute { entry_id },
            DeleteState::Executing => DeleteStep::Ignore,
        }
    }
}

fn with_flash(mut view: ControlView, flash: Option<Flash>) -> ControlView {
    match flash {
        Some(Flash::Success) => view.scheme = ControlScheme::Affirmative,
        Some(Flash::Error) => view.scheme = ControlScheme::Destructive,
        None => {}
    }
    view
}

/// Handle to a scheduled task; dropping it cancels the task
pub struct Scheduled {
    _guard: Box<dyn Any>,
}

impl Scheduled {
    pub fn new<G: Any>(guard: G) -> Scheduled {
        Scheduled {
            _guard: Box::new(guard),
        }
    }
}

type Observer = Rc<dyn Fn(&CardState)>;

pub struct CardModel {
    key: String,
    context: CardContext,
    probe: Rc<dyn CardProbe>,
    state: RefCell<CardState>,
    observers: RefCell<Vec<Observer>>,
    confirm_timer: RefCell<Option<Scheduled>>,
    flash_timers: RefCell<HashMap<Slot, Scheduled>>,
}

impl CardModel {
    pub fn new(key: String, context: CardContext, probe: Rc<dyn CardProbe>) -> Rc<CardModel> {
        Rc::new(CardModel {
            key,
            state: RefCell::new(CardState::new(&context)),
            context,
            probe,
            observers: RefCell::new(Vec::new()),
            confirm_timer: RefCell::new(None),
            flash_timers: RefCell::new(HashMap::new()),
        })
    }

    /// Stable key of the element this card was built from
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn context(&self) -> &CardContext {
        &self.context
    }

    pub fn probe(&self) -> &dyn CardProbe {
        self.probe.as_ref()
    }

    pub fn state(&self) -> Ref<'_, CardState> {
        self.state.borrow()
    }

    /// Register a renderer; it is called right away and after every update
    pub fn subscribe(&self, observer: impl Fn(&CardState) + 'static) {
        let observer: Observer = Rc::new(observer);
        observer(&self.state.borrow());
        self.observers.borrow_mut().push(observer);
    }

    pub fn update(&self, change: impl FnOnce(&mut CardState)) {
        change(&mut self.state.borrow_mut());
        self.notify();
    }

    fn notify(&self) {
        let observers = self.observers.borrow().clone();
        let state = self.state.borrow();
        for observer in observers {
            observer(&state);
        }
    }

    pub fn set_confirm_timer(&self, timer: Option<Scheduled>) {
        *self.confirm_timer.borrow_mut() = timer;
    }

    pub fn set_flash_timer(&self, slot: Slot, timer: Scheduled) {
        self.flash_timers.borrow_mut().insert(slot, timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorate::tests::FakeCard;
    use std::cell::Cell;

    fn profile() -> CardContext {
        CardContext::Profile { world_id: "wrld_a".to_string() }
    }

    fn list() -> CardContext {
        CardContext::List { entry_id: "fvrt_1".to_string() }
    }

    fn model(context: CardContext) -> Rc<CardModel> {
        CardModel::new("card-1".to_string(), context, Rc::new(FakeCard::default()))
    }

    #[test]
    fn test_save_view_follows_state() {
        let card = model(profile());
        assert_eq!(card.state().save_view().scheme, ControlScheme::Neutral);

        card.update(|s| s.saving = true);
        assert!(card.state().save_view().busy);

        card.update(|s| {
            s.saving = false;
            s.saved = true;
        });
        assert_eq!(card.state().save_view().scheme, ControlScheme::Affirmative);

        card.update(|s| {
            s.flashes.insert(Slot::Save, Flash::Error);
        });
        assert_eq!(card.state().save_view().scheme, ControlScheme::Destructive);
    }

    #[test]
    fn test_list_context_third_slot_is_placeholder() {
        let card = model(list());
        assert!(card.state().favorite_view().placeholder);

        let card = model(profile());
        assert!(!card.state().favorite_view().placeholder);
    }

    #[test]
    fn test_delete_step_in_list_context() {
        let card = model(list());
        assert_eq!(card.state().delete_step(card.context()), DeleteStep::StartConfirm);

        card.update(|s| s.delete = DeleteState::Confirming);
        assert_eq!(
            card.state().delete_step(card.context()),
            DeleteStep::Execute { entry_id: "fvrt_1".to_string() }
        );

        card.update(|s| s.delete = DeleteState::Executing);
        assert_eq!(card.state().delete_step(card.context()), DeleteStep::Ignore);
    }

    #[test]
    fn test_delete_step_in_profile_context_follows_shadow() {
        let card = model(profile());
        assert_eq!(card.state().delete_step(card.context()), DeleteStep::NothingToRemove);

        card.update(|s| s.saved = true);
        assert_eq!(card.state().delete_step(card.context()), DeleteStep::FallbackUnsave);

        card.update(|s| s.favorite_entry = Some("fvrt_9".to_string()));
        assert_eq!(card.state().delete_step(card.context()), DeleteStep::StartConfirm);
    }

    #[test]
    fn test_delete_view_confirming() {
        let card = model(list());
        card.update(|s| s.delete = DeleteState::Confirming);

        let view = card.state().delete_view();
        assert_eq!(view.scheme, ControlScheme::Confirming);
        assert_eq!(view.label, "Confirm?");
    }

    #[test]
    fn test_observers_see_every_update() {
        let card = model(profile());
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        card.subscribe(move |_| seen.set(seen.get() + 1));

        card.update(|s| s.saved = true);
        card.update(|s| s.saved = false);

        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_dropping_scheduled_drops_guard() {
        struct Guard(Rc<Cell<bool>>);
        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let card = model(list());
        card.set_confirm_timer(Some(Scheduled::new(Guard(Rc::clone(&dropped)))));
        assert!(!dropped.get());

        card.set_confirm_timer(None);
        assert!(dropped.get());
    }
}
