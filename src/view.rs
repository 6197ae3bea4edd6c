//! Render contract between the coordinator and the user interface.
//!
//! A [`View`] is an immutable snapshot of everything a renderer needs to
//! draw: the filtered cards, the count header, the selector options, and the
//! loading, error, or empty message in effect. Renderers only read it.

use crate::state::{EpisodeStatus, Failure, JumpTarget, RetryTarget};
use crate::types::{Episode, EpisodeCode, Show, ShowId};

pub const LOADING_SHOWS_MESSAGE: &str = "Loading shows...";
pub const LOADING_EPISODES_MESSAGE: &str = "Loading episodes...";
pub const EMPTY_SHOWS_MESSAGE: &str = "No shows match your search.";
pub const EMPTY_EPISODES_MESSAGE: &str = "No episodes match your search.";
pub const NO_EPISODES_MESSAGE: &str = "This show has no regular episodes.";

/// Label of the jump option that clears the episode highlight.
pub const ALL_EPISODES_LABEL: &str = "All episodes";

/// Entry of the shows selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowOption<'a> {
    pub id: ShowId,
    pub label: &'a str,
}

/// Entry of the episode jump selector.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpOption {
    pub target: JumpTarget,
    pub label: String,
}

/// What to draw.
#[derive(Debug)]
pub enum View<'a> {
    /// The initial show load is in flight.
    Loading { message: &'static str },
    /// The initial show load failed.
    Failed { message: &'static str, retry: RetryTarget },
    Shows(ShowsView<'a>),
    Episodes(EpisodesView<'a>),
}

impl View<'_> {
    /// Active filter text; empty outside the listings.
    pub fn query(&self) -> &str {
        match self {
            View::Shows(v) => v.query,
            View::Episodes(v) => v.query,
            _ => "",
        }
    }
}

/// The shows listing.
#[derive(Debug)]
pub struct ShowsView<'a> {
    pub query: &'a str,
    /// Shows passing the filter, in display order.
    pub cards: Vec<&'a Show>,
    /// Number of shows before filtering.
    pub total: usize,
}

impl<'a> ShowsView<'a> {
    pub fn count_header(&self) -> String {
        format!("Displaying {}/{} shows", self.cards.len(), self.total)
    }

    /// Message to show instead of the grid when nothing passes the filter.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.cards.is_empty().then_some(EMPTY_SHOWS_MESSAGE)
    }

    pub fn options(&self) -> Vec<ShowOption<'a>> {
        self.cards
            .iter()
            .map(|show| ShowOption {
                id: show.id,
                label: show.name.as_str(),
            })
            .collect()
    }
}

/// State of the episode pane.
#[derive(Debug)]
pub enum EpisodesContent<'a> {
    Loading { message: &'static str },
    Failed(Failure),
    Loaded {
        /// Episodes passing the filter, in season/number order.
        cards: Vec<&'a Episode>,
        /// Number of episodes before filtering.
        total: usize,
        highlighted: Option<EpisodeCode>,
    },
}

/// The episode listing of one show.
#[derive(Debug)]
pub struct EpisodesView<'a> {
    pub show_id: ShowId,
    pub show: Option<&'a Show>,
    pub query: &'a str,
    pub content: EpisodesContent<'a>,
    /// Every show, for switching shows from the episode listing.
    pub shows: &'a [Show],
}

impl<'a> EpisodesView<'a> {
    pub fn cards(&self) -> &[&'a Episode] {
        match &self.content {
            EpisodesContent::Loaded { cards, .. } => cards.as_slice(),
            _ => &[],
        }
    }

    pub fn highlighted(&self) -> Option<EpisodeCode> {
        match &self.content {
            EpisodesContent::Loaded { highlighted, .. } => *highlighted,
            _ => None,
        }
    }

    /// Position of the highlighted episode among the cards.
    pub fn highlighted_index(&self) -> Option<usize> {
        let code = self.highlighted()?;
        self.cards().iter().position(|e| e.code() == code)
    }

    pub fn count_header(&self) -> String {
        match &self.content {
            EpisodesContent::Loaded { cards, total, .. } => {
                format!("Got {}/{} episode(s)", cards.len(), total)
            }
            _ => String::new(),
        }
    }

    /// Message to show instead of the list when it has no cards.
    ///
    /// A show whose episodes were all specials has nothing to clear, so it
    /// gets its own message rather than the search one.
    pub fn empty_message(&self) -> Option<&'static str> {
        match &self.content {
            EpisodesContent::Loaded { cards, total, .. } if cards.is_empty() => {
                if *total == 0 {
                    Some(NO_EPISODES_MESSAGE)
                } else {
                    Some(EMPTY_EPISODES_MESSAGE)
                }
            }
            _ => None,
        }
    }

    /// "All episodes" followed by one option per filtered episode.
    pub fn options(&self) -> Vec<JumpOption> {
        let mut options = vec![JumpOption {
            target: JumpTarget::All,
            label: ALL_EPISODES_LABEL.to_string(),
        }];
        options.extend(self.cards().iter().map(|e| JumpOption {
            target: JumpTarget::Episode(e.code()),
            label: e.to_display(),
        }));
        options
    }

    pub fn show_options(&self) -> Vec<ShowOption<'a>> {
        self.shows
            .iter()
            .map(|show| ShowOption {
                id: show.id,
                label: show.name.as_str(),
            })
            .collect()
    }

    pub fn title(&self) -> String {
        match self.show {
            Some(show) => show.name.clone(),
            None => format!("Show {}", self.show_id),
        }
    }
}

impl EpisodesContent<'_> {
    pub(crate) fn from_status(status: EpisodeStatus) -> Self {
        match status {
            EpisodeStatus::Failed(failure) => EpisodesContent::Failed(failure),
            EpisodeStatus::Idle | EpisodeStatus::Loading => EpisodesContent::Loading {
                message: LOADING_EPISODES_MESSAGE,
            },
        }
    }
}
