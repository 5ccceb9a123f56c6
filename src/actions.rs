/// Click handlers for the injected controls
///
/// Every handler catches its own errors: failures become a toast plus a
/// short error color on the control, cancellations become nothing at all.
use std::rc::Rc;

use crate::controls::{CardModel, DeleteState, DeleteStep, Flash, Slot};
use crate::decorate::world_id_from_probe;
use crate::error::ShelfError;
use crate::modal::FolderRequest;
use crate::shelf::{NoticeKind, Shelf, ShelfEnv};
use crate::world_data::{AddWorldOutcome, FolderDescriptor, FolderLists, SavedWorld, WorldRecord};
use crate::world_id::canonical_world_url;

impl<E: ShelfEnv> Shelf<E> {
    pub async fn click(&self, card: &Rc<CardModel>, slot: Slot) {
        match slot {
            Slot::Save => self.toggle_saved(card).await,
            Slot::CopyLink => self.copy_link(card).await,
            Slot::Favorite => self.toggle_favorite(card).await,
            Slot::Delete => self.activate_delete(card).await,
        }
    }

    /// World ID for a card: known mapping first, then the card's own attributes
    fn card_world_id(&self, card: &CardModel) -> Option<String> {
        let known = card.state().world_id.clone();
        known
            .or_else(|| card.context().world_id(&self.cache.borrow()))
            .or_else(|| world_id_from_probe(card.probe()))
    }

    fn display_name(&self, world_id: &str) -> String {
        self.resolve(world_id)
            .map(|r| r.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| world_id.to_string())
    }

    pub async fn toggle_saved(&self, card: &Rc<CardModel>) {
        if card.state().saving {
            return;
        }
        let Some(world_id) = self.card_world_id(card) else {
            self.fail(card, Slot::Save, "Save", &ShelfError::Unresolvable);
            return;
        };

        let was_saved = self.is_saved(&world_id);
        card.update(|s| {
            s.saving = true;
            s.world_id = Some(world_id.clone());
            s.flashes.remove(&Slot::Save);
        });

        let result = if was_saved {
            self.unsave(&world_id).await
        } else {
            self.save(&world_id).await
        };

        card.update(|s| s.saving = false);
        self.refresh_card(card);
        self.refresh_world(&world_id);

        match result {
            Ok((kind, message)) => {
                self.env.notify(kind, &message);
                self.flash(card, Slot::Save, Flash::Success);
            }
            Err(e) => {
                let action = if was_saved { "Remove" } else { "Save" };
                self.fail(card, Slot::Save, action, &e);
            }
        }
    }

    async fn save(&self, world_id: &str) -> Result<(NoticeKind, String), ShelfError> {
        let folders = self.env.get_folders().await.unwrap_or_else(|e| {
            log::error!("could not load folders: {}", e);
            Default::default()
        });

        let name = self.display_name(world_id);
        let folder_id = self
            .env
            .pick_folder(FolderRequest::for_local_save(&name, &folders))
            .await?;

        // Best effort: a fresh record makes the stored entry richer
        let record = match self.env.fetch_world(world_id).await {
            Ok(Some(record)) => self.apply_record(record),
            Ok(None) => self.apply_record(WorldRecord::deleted(world_id)),
            Err(e) => {
                log::debug!("detail fetch for {} failed: {}", world_id, e);
                self.resolve(world_id)
                    .unwrap_or_else(|| Rc::new(WorldRecord::named(world_id, &name)))
            }
        };

        let world = SavedWorld::from_record(&record, &folder_id);
        match self.env.add_world(world).await? {
            AddWorldOutcome::Added => {
                self.saved.borrow_mut().insert(world_id, Some(&folder_id));
                let mut message = format!("Saved \"{}\"", record.name);
                match self.move_remote_favorite(world_id, &folder_id, &folders).await {
                    Ok(Some(group)) => message = format!("{}, favorite moved to {}", message, group),
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!("could not move favorite for {}: {}", world_id, e);
                        self.env
                            .notify(NoticeKind::Error, &e.user_message("Move favorite"));
                    }
                }
                Ok((NoticeKind::Success, message))
            }
            AddWorldOutcome::AlreadyExists { world_name } => {
                self.saved.borrow_mut().insert(world_id, None);
                let name = world_name.unwrap_or_else(|| record.name.clone());
                Ok((NoticeKind::Info, format!("\"{}\" is already saved", name)))
            }
            AddWorldOutcome::PrivateWorld { world_name } => {
                let name = world_name.unwrap_or_else(|| record.name.clone());
                Err(ShelfError::Rejected(format!(
                    "\"{}\" is private and cannot be saved",
                    name
                )))
            }
            AddWorldOutcome::Failed(reason) => Err(ShelfError::Rejected(reason)),
        }
    }

    /// Saving into a site group moves a favorite that lives in another group
    async fn move_remote_favorite(
        &self,
        world_id: &str,
        folder_id: &str,
        folders: &FolderLists,
    ) -> Result<Option<String>, ShelfError> {
        let Some(group) = folders.remote_folders.iter().find(|f| f.id == folder_id) else {
            return Ok(None);
        };
        let current = self.remote.borrow().get(world_id).cloned();
        let Some(current) = current else {
            return Ok(None);
        };
        if current.tag.as_deref() == Some(folder_id) {
            return Ok(None);
        }

        self.env.update_favorite_tag(&current.entry_id, folder_id).await?;
        self.remote.borrow_mut().retag(world_id, folder_id);
        Ok(Some(group.name.clone()))
    }

    async fn unsave(&self, world_id: &str) -> Result<(NoticeKind, String), ShelfError> {
        let known = self.saved.borrow().folder_of(world_id).map(str::to_string);
        let folder_id = match known {
            Some(folder_id) => folder_id,
            None => {
                let worlds = self.env.get_all_worlds().await?;
                match worlds.into_iter().find(|w| w.id == world_id) {
                    Some(world) => world.folder_id,
                    None => {
                        // The store no longer has it; just catch the mirror up
                        self.saved.borrow_mut().remove(world_id);
                        return Ok((NoticeKind::Info, "World was already removed".to_string()));
                    }
                }
            }
        };

        self.env.remove_world(world_id, &folder_id).await?;
        self.saved.borrow_mut().remove(world_id);
        Ok((
            NoticeKind::Success,
            format!("Removed \"{}\" from World Shelf", self.display_name(world_id)),
        ))
    }

    pub async fn copy_link(&self, card: &Rc<CardModel>) {
        let Some(world_id) = self.card_world_id(card) else {
            self.fail(card, Slot::CopyLink, "Copy link", &ShelfError::Unresolvable);
            return;
        };

        let link = canonical_world_url(&self.config.site_origin, &world_id);
        match self.env.write_clipboard(&link).await {
            Ok(()) => self.flash(card, Slot::CopyLink, Flash::Success),
            Err(e) => self.fail(card, Slot::CopyLink, "Copy link", &e),
        }
    }

    pub async fn toggle_favorite(&self, card: &Rc<CardModel>) {
        if card.context().is_list() || card.state().favoriting {
            return;
        }
        let Some(world_id) = self.card_world_id(card) else {
            self.fail(card, Slot::Favorite, "Favorite", &ShelfError::Unresolvable);
            return;
        };

        let existing = self.remote.borrow().get(&world_id).cloned();
        card.update(|s| {
            s.favoriting = true;
            s.flashes.remove(&Slot::Favorite);
        });

        let result = match existing {
            Some(favorite) => self
                .env
                .remove_favorite(&favorite.entry_id)
                .await
                .map(|()| {
                    self.remote.borrow_mut().remove_world(&world_id);
                    "Removed from VRChat favorites".to_string()
                }),
            None => self.add_remote_favorite(&world_id).await,
        };

        card.update(|s| s.favoriting = false);
        self.refresh_world(&world_id);

        match result {
            Ok(message) => {
                self.env.notify(NoticeKind::Success, &message);
                self.flash(card, Slot::Favorite, Flash::Success);
            }
            Err(e) => self.fail(card, Slot::Favorite, "Favorite", &e),
        }
    }

    async fn add_remote_favorite(&self, world_id: &str) -> Result<String, ShelfError> {
        let folders = self.env.get_folders().await.unwrap_or_else(|e| {
            log::error!("could not load folders: {}", e);
            Default::default()
        });
        if folders.remote_folders.is_empty() {
            return Err(ShelfError::Rejected(
                "no VRChat favorite groups available".to_string(),
            ));
        }

        let request = FolderRequest::for_remote_favorite(&self.display_name(world_id), &folders);
        let tag = self.env.pick_folder(request).await?;
        let entry = self.env.add_favorite(world_id, &tag).await?;
        self.remote.borrow_mut().absorb(std::slice::from_ref(&entry));

        let group = folders
            .remote_folders
            .iter()
            .find(|f| f.id == tag)
            .map(|f: &FolderDescriptor| f.name.clone())
            .unwrap_or(tag);
        Ok(format!("Added to {}", group))
    }

    /// Two-phase delete: first click arms, second click within the window removes
    pub async fn activate_delete(&self, card: &Rc<CardModel>) {
        let step = card.state().delete_step(card.context());

        match step {
            DeleteStep::Ignore => {}
            DeleteStep::NothingToRemove => {
                self.env
                    .notify(NoticeKind::Error, "This world is not in any favorites");
            }
            DeleteStep::FallbackUnsave => self.toggle_saved(card).await,
            DeleteStep::StartConfirm => self.arm_delete(card),
            DeleteStep::Execute { entry_id } => self.execute_delete(card, &entry_id).await,
        }
    }

    fn arm_delete(&self, card: &Rc<CardModel>) {
        card.update(|s| {
            s.delete = DeleteState::Confirming;
            s.flashes.remove(&Slot::Delete);
        });

        let weak = Rc::downgrade(card);
        let timer = self.env.schedule(
            self.config.confirm_window_ms,
            Box::new(move || {
                if let Some(card) = weak.upgrade() {
                    card.update(|s| {
                        if s.delete == DeleteState::Confirming {
                            s.delete = DeleteState::Idle;
                        }
                    });
                }
            }),
        );
        card.set_confirm_timer(Some(timer));
    }

    async fn execute_delete(&self, card: &Rc<CardModel>, entry_id: &str) {
        card.set_confirm_timer(None);
        card.update(|s| s.delete = DeleteState::Executing);

        match self.env.remove_favorite(entry_id).await {
            Ok(()) => {
                let world_id = self
                    .remote
                    .borrow_mut()
                    .remove_entry(entry_id)
                    .or_else(|| self.card_world_id(card));

                let is_list = card.context().is_list();
                card.update(|s| {
                    s.delete = DeleteState::Idle;
                    s.removed = is_list;
                });
                match world_id {
                    Some(world_id) => self.refresh_world(&world_id),
                    None => self.refresh_card(card),
                }
                self.env
                    .notify(NoticeKind::Success, "Removed from VRChat favorites");
            }
            Err(e) => {
                card.update(|s| s.delete = DeleteState::Idle);
                self.fail(card, Slot::Delete, "Remove favorite", &e);
            }
        }
    }

    fn fail(&self, card: &Rc<CardModel>, slot: Slot, action: &str, error: &ShelfError) {
        if error.is_cancelled() {
            return;
        }
        log::warn!("{} failed: {}", action, error);
        self.env.notify(NoticeKind::Error, &error.user_message(action));
        self.flash(card, slot, Flash::Error);
    }

    /// Color a control for `feedback_ms`, then fall back to its derived scheme
    fn flash(&self, card: &Rc<CardModel>, slot: Slot, flash: Flash) {
        card.update(|s| {
            s.flashes.insert(slot, flash);
        });

        let weak = Rc::downgrade(card);
        let timer = self.env.schedule(
            self.config.feedback_ms,
            Box::new(move || {
                if let Some(card) = weak.upgrade() {
                    card.update(|s| {
                        s.flashes.remove(&slot);
                    });
                }
            }),
        );
        card.set_flash_timer(slot, timer);
    }
}
