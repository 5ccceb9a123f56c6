/// Error taxonomy shared by every asynchronous action
use thiserror::Error;

const CONTEXT_INVALIDATED_MARKER: &str = "extension context invalidated";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShelfError {
    #[error("network request failed: {0}")]
    Network(String),

    #[error("request returned HTTP {0}")]
    Status(u16),

    #[error("could not determine the world ID")]
    Unresolvable,

    #[error("selection cancelled")]
    Cancelled,

    #[error("extension context invalidated")]
    ContextInvalidated,

    #[error("malformed payload: {0}")]
    Decode(String),

    #[error("{0}")]
    Rejected(String),
}

impl ShelfError {
    /// Classify a failure reported by the extension runtime or the bridge
    pub fn from_runtime_message(message: &str) -> ShelfError {
        if message.to_lowercase().contains(CONTEXT_INVALIDATED_MARKER) {
            ShelfError::ContextInvalidated
        } else {
            ShelfError::Rejected(message.to_string())
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ShelfError::Cancelled)
    }

    /// Text for the toast shown to the user
    pub fn user_message(&self, action: &str) -> String {
        match self {
            ShelfError::ContextInvalidated => {
                "World Shelf was updated or reloaded. Please reload the page.".to_string()
            }
            ShelfError::Unresolvable => format!("{}: could not determine the world ID", action),
            other => format!("{} failed: {}", action, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_invalidated_detection() {
        assert_eq!(
            ShelfError::from_runtime_message("Error: Extension context invalidated."),
            ShelfError::ContextInvalidated
        );
        assert_eq!(
            ShelfError::from_runtime_message("quota exceeded"),
            ShelfError::Rejected("quota exceeded".to_string())
        );
    }

    #[test]
    fn test_user_messages() {
        assert!(ShelfError::ContextInvalidated
            .user_message("Save")
            .contains("reload the page"));
        assert_eq!(
            ShelfError::Status(500).user_message("Save"),
            "Save failed: request returned HTTP 500"
        );
        assert_eq!(
            ShelfError::Unresolvable.user_message("Copy link"),
            "Copy link: could not determine the world ID"
        );
    }

    #[test]
    fn test_cancelled_is_distinguished() {
        assert!(ShelfError::Cancelled.is_cancelled());
        assert!(!ShelfError::Network("offline".to_string()).is_cancelled());
    }
}
