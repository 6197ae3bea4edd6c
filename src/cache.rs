//! Per-show episode cache.
//!
//! Episode lists are fetched lazily the first time a show is opened and kept
//! for the rest of the session. Nothing is ever evicted or invalidated.

use crate::types::{Episode, ShowId};
use std::collections::HashMap;

/// Mapping from show to its normalized, sorted episode list.
#[derive(Debug, Default)]
pub struct EpisodeCache {
    entries: HashMap<ShowId, Vec<Episode>>,
}

impl EpisodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached episodes for a show, if it has been fetched before.
    pub fn get(&self, show_id: ShowId) -> Option<&[Episode]> {
        self.entries.get(&show_id).map(Vec::as_slice)
    }

    /// Store the episodes of a show.
    ///
    /// The first list stored for a show wins; returns `false` when the show
    /// was already cached and `episodes` was dropped.
    pub fn put(&mut self, show_id: ShowId, episodes: Vec<Episode>) -> bool {
        if self.entries.contains_key(&show_id) {
            return false;
        }
        self.entries.insert(show_id, episodes);
        true
    }

    pub fn contains(&self, show_id: ShowId) -> bool {
        self.entries.contains_key(&show_id)
    }

    /// Number of shows with cached episodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
