use std::sync::Arc;

use indexmap::IndexSet;

use crate::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "favorite_poems";

/// Favorite poem IDs, persisted as a JSON array, plus the session-only reading mode.
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    ids: IndexSet<String>,
    reading_mode: bool,
}

impl Favorites {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ids: IndexSet::new(),
            reading_mode: false,
        }
    }

    /// Replaces the in-memory set with the persisted one.
    ///
    /// Missing or unreadable data leaves the set empty.
    pub fn load(&mut self) {
        let raw = match self.store.get(FAVORITES_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(?err, "failed to read favorites");
                None
            }
        };
        self.ids = raw
            .and_then(|raw| match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => Some(ids),
                Err(err) => {
                    tracing::warn!(?err, "ignoring malformed favorites");
                    None
                }
            })
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default();
    }

    /// Returns whether `id` is a favorite after the toggle.
    pub fn toggle(&mut self, id: &str) -> bool {
        let now_favorite = if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        };
        self.persist();
        now_favorite
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn reading_mode(&self) -> bool {
        self.reading_mode
    }

    pub fn toggle_reading_mode(&mut self) -> bool {
        self.reading_mode = !self.reading_mode;
        self.reading_mode
    }

    // Write failures are logged only.
    fn persist(&self) {
        let ids: Vec<&String> = self.ids.iter().collect();
        let encoded = match serde_json::to_string(&ids) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::error!(?err, "failed to encode favorites");
                return;
            }
        };
        if let Err(err) = self.store.set(FAVORITES_KEY, &encoded) {
            tracing::error!(?err, "failed to persist favorites");
        }
    }
}
