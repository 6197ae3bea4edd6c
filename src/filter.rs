//! Free-text filtering of show and episode collections.
//!
//! Matching is a case-insensitive substring test. Filters keep the relative
//! order of their input and never re-sort.

use crate::types::{Episode, Show};

/// Shows whose name, genres, or summary contain `query`.
///
/// An empty query keeps every show.
pub fn filter_shows<'a>(shows: &'a [Show], query: &str) -> Vec<&'a Show> {
    if query.is_empty() {
        return shows.iter().collect();
    }
    let needle = query.to_lowercase();
    shows
        .iter()
        .filter(|show| {
            show.name.to_lowercase().contains(&needle)
                || show.genres_joined().to_lowercase().contains(&needle)
                || show.summary_text().to_lowercase().contains(&needle)
        })
        .collect()
}

/// Episodes whose name or summary contain `query`.
///
/// An empty query keeps every episode.
pub fn filter_episodes<'a>(episodes: &'a [Episode], query: &str) -> Vec<&'a Episode> {
    if query.is_empty() {
        return episodes.iter().collect();
    }
    let needle = query.to_lowercase();
    episodes
        .iter()
        .filter(|episode| {
            episode.name.to_lowercase().contains(&needle)
                || episode.summary_text().to_lowercase().contains(&needle)
        })
        .collect()
}
