//! View state: what the application is currently showing.
//!
//! [`ViewState`] is owned by the coordinator and only mutated through its
//! methods. It records the navigation mode, the active filter text, the
//! highlighted episode, and whether data is loading or failed.

use crate::error::CatalogError;
use crate::types::{EpisodeCode, ShowId};

/// Message for transport failures.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection and try again.";

/// Message for non-success HTTP responses.
pub const SERVER_MESSAGE: &str =
    "The show data could not be loaded from the server. Please try again later.";

/// Message for empty payloads.
pub const NO_DATA_MESSAGE: &str = "No data was found for this listing.";

/// Fallback message for anything else.
pub const UNEXPECTED_MESSAGE: &str =
    "Something went wrong while loading the data. Please try again.";

/// Navigation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ShowsListing,
    EpisodesListing(ShowId),
}

/// User-facing classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connectivity,
    Server { status: u16 },
    NoData,
    Unexpected,
}

impl FailureKind {
    /// Classify a catalog error. Cancellation is not a failure and yields `None`.
    pub fn from_error(err: &CatalogError) -> Option<Self> {
        match err {
            CatalogError::Network(_) => Some(FailureKind::Connectivity),
            CatalogError::Http { status } => Some(FailureKind::Server { status: *status }),
            CatalogError::EmptyResult => Some(FailureKind::NoData),
            CatalogError::Decode(_) => Some(FailureKind::Unexpected),
            CatalogError::Cancelled => None,
        }
    }

    /// The fixed message shown for this kind of failure.
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::Connectivity => CONNECTIVITY_MESSAGE,
            FailureKind::Server { .. } => SERVER_MESSAGE,
            FailureKind::NoData => NO_DATA_MESSAGE,
            FailureKind::Unexpected => UNEXPECTED_MESSAGE,
        }
    }
}

/// Operation re-run by the retry action of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryTarget {
    InitialLoad,
    Episodes(ShowId),
}

/// A failed fetch as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub retry: RetryTarget,
}

impl Failure {
    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

/// Progress of the initial show load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Failed(Failure),
    Ready,
}

/// Progress of the episode pane in [`Mode::EpisodesListing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    Idle,
    Loading,
    Failed(Failure),
}

/// Target of the episode jump selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpTarget {
    /// Clear the highlight and go back to the top of the list.
    All,
    Episode(EpisodeCode),
}

/// Single source of truth for what is on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    phase: Phase,
    mode: Mode,
    query: String,
    highlighted: Option<EpisodeCode>,
    episode_status: EpisodeStatus,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            mode: Mode::ShowsListing,
            query: String::new(),
            highlighted: None,
            episode_status: EpisodeStatus::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlighted(&self) -> Option<EpisodeCode> {
        self.highlighted
    }

    pub fn episode_status(&self) -> EpisodeStatus {
        self.episode_status
    }

    /// The show being browsed, if any.
    pub fn selected_show(&self) -> Option<ShowId> {
        match self.mode {
            Mode::EpisodesListing(id) => Some(id),
            Mode::ShowsListing => None,
        }
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Switch to the shows listing, discarding the filter and highlight.
    pub(crate) fn enter_shows(&mut self) {
        self.mode = Mode::ShowsListing;
        self.query.clear();
        self.highlighted = None;
        self.episode_status = EpisodeStatus::Idle;
    }

    /// Switch to the episode listing of a show with a fresh filter.
    pub(crate) fn enter_episodes(&mut self, show_id: ShowId, status: EpisodeStatus) {
        self.mode = Mode::EpisodesListing(show_id);
        self.query.clear();
        self.highlighted = None;
        self.episode_status = status;
    }

    pub(crate) fn set_episode_status(&mut self, status: EpisodeStatus) {
        self.episode_status = status;
    }

    pub(crate) fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub(crate) fn set_highlighted(&mut self, code: Option<EpisodeCode>) {
        self.highlighted = code;
    }
}
