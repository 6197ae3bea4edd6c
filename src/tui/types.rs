//! TUI type definitions for pickers and actions.

use crate::state::JumpTarget;
use crate::types::{EpisodeCode, ShowId};

/// Popup selector currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Picker {
    /// Pick any show to browse
    Shows,
    /// Jump to an episode of the current listing
    Episodes,
}

/// Actions that can be returned from the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Replace the filter text with the given query
    Search(String),
    /// Empty the filter text
    ClearSearch,
    /// Browse the episodes of a show
    SelectShow(ShowId),
    /// Return to the shows listing
    BackToShows,
    /// Highlight an episode or clear the highlight
    Jump(JumpTarget),
    /// Open the detail page of an episode
    Watch(EpisodeCode),
    /// Re-run the failed operation
    Retry,
}
