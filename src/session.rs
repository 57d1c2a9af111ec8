//! In-memory session store: user identifier → active label.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

/// A submitted label was empty after trimming surrounding whitespace.
///
/// Recovered locally by re-prompting the user; never propagated as a fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("label must not be empty")]
pub struct InvalidLabel;

/// In-memory store: user identifier → currently active label.
///
/// A label, once set, stays active until explicitly overwritten. Entries are
/// never evicted; growth is proportional to distinct users and is an accepted
/// resource characteristic. State lives for the process lifetime only.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    /// Create a new empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active label for a user, replacing any prior value.
    ///
    /// Surrounding whitespace is trimmed before storing. Last write wins for
    /// concurrent calls with the same user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidLabel`] if the label is empty after trimming; any
    /// prior label for the user is left unchanged.
    pub async fn set_label(&self, user_id: &str, raw: &str) -> Result<(), InvalidLabel> {
        let label = raw.trim();
        if label.is_empty() {
            return Err(InvalidLabel);
        }
        let mut g = self.inner.write().await;
        g.insert(user_id.to_string(), label.to_string());
        tracing::debug!(
            event = "session.label.set",
            user_id,
            label,
            "active label updated"
        );
        Ok(())
    }

    /// Get the currently active label for a user, if one was ever set.
    pub async fn get_label(&self, user_id: &str) -> Option<String> {
        let g = self.inner.read().await;
        g.get(user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_trimmed_label() {
        let store = SessionStore::new();
        store.set_label("42", "  Shoes  ").await.unwrap();
        assert_eq!(store.get_label("42").await.as_deref(), Some("Shoes"));
    }

    #[tokio::test]
    async fn get_without_set_returns_none() {
        let store = SessionStore::new();
        assert_eq!(store.get_label("42").await, None);
    }

    #[tokio::test]
    async fn empty_and_whitespace_labels_are_rejected() {
        let store = SessionStore::new();
        store.set_label("42", "Shoes").await.unwrap();

        assert_eq!(store.set_label("42", "").await, Err(InvalidLabel));
        assert_eq!(store.set_label("42", "   ").await, Err(InvalidLabel));
        // Prior label survives rejected assignments.
        assert_eq!(store.get_label("42").await.as_deref(), Some("Shoes"));
    }

    #[tokio::test]
    async fn later_assignment_overwrites() {
        let store = SessionStore::new();
        store.set_label("42", "Shoes").await.unwrap();
        store.set_label("42", "Hats").await.unwrap();
        assert_eq!(store.get_label("42").await.as_deref(), Some("Hats"));
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = SessionStore::new();
        store.set_label("1", "Shoes").await.unwrap();
        store.set_label("2", "Hats").await.unwrap();
        assert_eq!(store.get_label("1").await.as_deref(), Some("Shoes"));
        assert_eq!(store.get_label("2").await.as_deref(), Some("Hats"));
    }
}
