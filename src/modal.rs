/// Folder selection: what a picker is asked for and how clicks turn into a choice
use crate::world_data::{FolderDescriptor, FolderKind, FolderLists};

/// How a selection is finalized; chosen by the caller, not stored on folders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Click selects; double-click or the confirm button finalizes
    Explicit,
    /// A single click selects and finalizes
    OnClick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderRequest {
    pub title: String,
    pub description: String,
    pub folders: Vec<FolderDescriptor>,
    pub mode: ConfirmMode,
}

impl FolderRequest {
    /// Saving to the local store: unfiled, local folders, then mirrored remote folders
    pub fn for_local_save(world_name: &str, lists: &FolderLists) -> FolderRequest {
        let mut folders = vec![FolderDescriptor::unfiled()];
        folders.extend(lists.local_folders.iter().cloned());
        folders.extend(lists.remote_folders.iter().cloned());

        FolderRequest {
            title: "Save to World Shelf".to_string(),
            description: format!("Choose a folder for \"{}\"", world_name),
            folders,
            mode: ConfirmMode::Explicit,
        }
    }

    /// Favoriting on the site: only the site's own groups are valid targets
    pub fn for_remote_favorite(world_name: &str, lists: &FolderLists) -> FolderRequest {
        FolderRequest {
            title: "Add to VRChat favorites".to_string(),
            description: format!("Choose a favorite group for \"{}\"", world_name),
            folders: lists.remote_folders.clone(),
            mode: ConfirmMode::OnClick,
        }
    }

    /// Folders split into display classes, in display order
    pub fn grouped(&self) -> Vec<(FolderKind, Vec<&FolderDescriptor>)> {
        [FolderKind::Unfiled, FolderKind::Local, FolderKind::Remote]
            .into_iter()
            .map(|kind| {
                let members: Vec<&FolderDescriptor> =
                    self.folders.iter().filter(|f| f.kind == kind).collect();
                (kind, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect()
    }
}

pub fn kind_heading(kind: FolderKind) -> &'static str {
    match kind {
        FolderKind::Unfiled => "No folder",
        FolderKind::Local => "World Shelf folders",
        FolderKind::Remote => "VRChat favorite groups",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Selected(String),
    Confirmed(String),
    Ignored,
}

/// Click handling for one open picker
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    mode: ConfirmMode,
    selected: Option<String>,
}

impl Selection {
    pub fn new(mode: ConfirmMode) -> Self {
        Selection { mode, selected: None }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn click(&mut self, folder_id: &str) -> SelectionEvent {
        self.selected = Some(folder_id.to_string());
        match self.mode {
            ConfirmMode::OnClick => SelectionEvent::Confirmed(folder_id.to_string()),
            ConfirmMode::Explicit => SelectionEvent::Selected(folder_id.to_string()),
        }
    }

    pub fn double_click(&mut self, folder_id: &str) -> SelectionEvent {
        self.selected = Some(folder_id.to_string());
        SelectionEvent::Confirmed(folder_id.to_string())
    }

    /// The confirm button; does nothing until something is selected
    pub fn confirm(&self) -> SelectionEvent {
        match &self.selected {
            Some(id) => SelectionEvent::Confirmed(id.clone()),
            None => SelectionEvent::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, kind: FolderKind) -> FolderDescriptor {
        FolderDescriptor {
            id: id.to_string(),
            name: id.to_uppercase(),
            kind,
        }
    }

    fn lists() -> FolderLists {
        FolderLists {
            local_folders: vec![folder("chill", FolderKind::Local)],
            remote_folders: vec![
                folder("worlds1", FolderKind::Remote),
                folder("worlds2", FolderKind::Remote),
            ],
        }
    }

    #[test]
    fn test_local_save_request_includes_every_universe() {
        let request = FolderRequest::for_local_save("Alpha", &lists());

        let ids: Vec<&str> = request.folders.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["none", "chill", "worlds1", "worlds2"]);
        assert_eq!(request.mode, ConfirmMode::Explicit);

        let groups = request.grouped();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, FolderKind::Unfiled);
        assert_eq!(groups[2].1.len(), 2);
    }

    #[test]
    fn test_remote_favorite_request_is_remote_only() {
        let request = FolderRequest::for_remote_favorite("Alpha", &lists());

        assert_eq!(request.mode, ConfirmMode::OnClick);
        assert!(request.folders.iter().all(|f| f.kind == FolderKind::Remote));
        assert_eq!(request.grouped().len(), 1);
    }

    #[test]
    fn test_explicit_mode_needs_confirmation() {
        let mut selection = Selection::new(ConfirmMode::Explicit);

        assert_eq!(selection.confirm(), SelectionEvent::Ignored);
        assert_eq!(selection.click("chill"), SelectionEvent::Selected("chill".to_string()));
        assert_eq!(selection.click("none"), SelectionEvent::Selected("none".to_string()));
        assert_eq!(selection.selected(), Some("none"));
        assert_eq!(selection.confirm(), SelectionEvent::Confirmed("none".to_string()));
        assert_eq!(
            selection.double_click("chill"),
            SelectionEvent::Confirmed("chill".to_string())
        );
    }

    #[test]
    fn test_on_click_mode_confirms_immediately() {
        let mut selection = Selection::new(ConfirmMode::OnClick);

        assert_eq!(
            selection.click("worlds2"),
            SelectionEvent::Confirmed("worlds2".to_string())
        );
    }
}
