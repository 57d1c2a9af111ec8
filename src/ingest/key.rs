//! Storage key derivation.

use std::fmt;

use crate::channels::ImageRef;

/// Deterministic object path for one uploaded image:
/// `{user_id}/{label}/{unique_image_ref}.jpg`.
///
/// The unique image reference comes from the transport, so two distinct
/// images under the same label never collide, while re-sending the same image
/// derives the same key (idempotent overwrite).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive the key for `image` uploaded by `user_id` under `label`.
    #[must_use]
    pub fn derive(user_id: &str, label: &str, image: &ImageRef) -> Self {
        Self(format!("{user_id}/{label}/{}.jpg", image.unique_id))
    }

    /// The key as a path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
