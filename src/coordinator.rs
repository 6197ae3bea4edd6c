//! Orchestration of fetching, caching, filtering, and view state.
//!
//! The [`Coordinator`] handles every user action. Fetches run as spawned
//! tasks that own no UI state; they report back through a channel and the
//! event loop hands each [`FetchOutcome`] to [`Coordinator::apply`] on the
//! UI task. At most one episode fetch is active at a time: selecting a show
//! or leaving the episode listing cancels it, and an outcome that does not
//! belong to the active fetch is discarded.

use crate::api::CatalogSource;
use crate::cache::EpisodeCache;
use crate::error::CatalogError;
use crate::filter::{filter_episodes, filter_shows};
use crate::state::{
    EpisodeStatus, Failure, FailureKind, JumpTarget, Mode, Phase, RetryTarget, ViewState,
};
use crate::types::{Episode, EpisodeCode, Show, ShowId};
use crate::view::{EpisodesContent, EpisodesView, ShowsView, View, LOADING_SHOWS_MESSAGE};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Identity of one episode fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

/// Result of a fetch task, delivered back to the UI task.
#[derive(Debug)]
pub enum FetchOutcome {
    Shows(Result<Vec<Show>, CatalogError>),
    Episodes {
        request: RequestId,
        show_id: ShowId,
        result: Result<Vec<Episode>, CatalogError>,
    },
}

#[derive(Debug)]
struct ActiveFetch {
    request: RequestId,
    show_id: ShowId,
    token: CancellationToken,
}

/// Owner of the view state, the show list, and the episode cache.
pub struct Coordinator {
    catalog: Arc<dyn CatalogSource>,
    outcomes: mpsc::UnboundedSender<FetchOutcome>,
    state: ViewState,
    shows: Vec<Show>,
    cache: EpisodeCache,
    active_fetch: Option<ActiveFetch>,
    next_request: u64,
}

impl Coordinator {
    /// Create a coordinator and the receiver its fetch outcomes arrive on.
    ///
    /// Nothing is fetched until [`Coordinator::load_shows`] is called.
    pub fn new(catalog: Arc<dyn CatalogSource>) -> (Self, mpsc::UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            catalog,
            outcomes: tx,
            state: ViewState::new(),
            shows: Vec::new(),
            cache: EpisodeCache::new(),
            active_fetch: None,
            next_request: 0,
        };
        (coordinator, rx)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    pub fn cache(&self) -> &EpisodeCache {
        &self.cache
    }

    pub fn show(&self, show_id: ShowId) -> Option<&Show> {
        self.shows.iter().find(|s| s.id == show_id)
    }

    /// Whether an episode fetch is outstanding.
    pub fn is_fetching_episodes(&self) -> bool {
        self.active_fetch.is_some()
    }

    /// Start (or restart) the initial show load.
    pub fn load_shows(&mut self) {
        info!("Loading shows");
        self.state.set_phase(Phase::Loading);

        let catalog = Arc::clone(&self.catalog);
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let result = catalog.fetch_shows().await;
            let _ = outcomes.send(FetchOutcome::Shows(result));
        });
    }

    /// Re-run whatever operation produced the failure on screen.
    pub fn retry(&mut self) {
        let failure = match (self.state.phase(), self.state.episode_status()) {
            (Phase::Failed(failure), _) => Some(failure),
            (Phase::Ready, EpisodeStatus::Failed(failure)) => Some(failure),
            _ => None,
        };

        match failure.map(|f| f.retry) {
            Some(RetryTarget::InitialLoad) => self.load_shows(),
            Some(RetryTarget::Episodes(show_id)) => self.select_show(show_id),
            None => debug!("Nothing to retry"),
        }
    }

    /// Open the episode listing of a show.
    ///
    /// Cancels any outstanding episode fetch for another show. Cached
    /// episodes are shown immediately; otherwise a fetch is started and the
    /// pane shows a loading message until it completes.
    pub fn select_show(&mut self, show_id: ShowId) {
        if self.state.phase() != Phase::Ready {
            debug!("Ignoring selection of show {} before shows are loaded", show_id);
            return;
        }

        if self
            .active_fetch
            .as_ref()
            .is_some_and(|fetch| fetch.show_id == show_id)
        {
            debug!("Episodes for show {} already loading", show_id);
            self.state.enter_episodes(show_id, EpisodeStatus::Loading);
            return;
        }
        self.cancel_active_fetch();

        if self.cache.contains(show_id) {
            debug!("Episodes for show {} served from cache", show_id);
            self.state.enter_episodes(show_id, EpisodeStatus::Idle);
            return;
        }

        self.state.enter_episodes(show_id, EpisodeStatus::Loading);

        let request = RequestId(self.next_request);
        self.next_request += 1;
        let token = CancellationToken::new();
        self.active_fetch = Some(ActiveFetch {
            request,
            show_id,
            token: token.clone(),
        });

        info!("Fetching episodes for show {}", show_id);
        let catalog = Arc::clone(&self.catalog);
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let result = catalog.fetch_episodes(show_id, &token).await;
            let _ = outcomes.send(FetchOutcome::Episodes {
                request,
                show_id,
                result,
            });
        });
    }

    /// Leave the episode listing, discarding its filter.
    pub fn back_to_shows(&mut self) {
        if self.state.phase() != Phase::Ready {
            return;
        }
        self.cancel_active_fetch();
        self.state.enter_shows();
    }

    /// Replace the filter text of the current listing.
    pub fn set_query(&mut self, query: impl Into<String>) {
        if self.state.phase() != Phase::Ready {
            return;
        }
        self.state.set_query(query.into());
    }

    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    /// Highlight one episode of the current listing, or clear the highlight.
    pub fn jump_to(&mut self, target: JumpTarget) {
        let Some(episodes) = self.current_episodes() else {
            return;
        };

        match target {
            JumpTarget::All => self.state.set_highlighted(None),
            JumpTarget::Episode(code) => {
                if episodes.iter().any(|e| e.code() == code) {
                    self.state.set_highlighted(Some(code));
                } else {
                    debug!("No episode {} in current listing", code);
                }
            }
        }
    }

    /// Detail page of an episode of the current listing.
    pub fn watch_url(&self, code: EpisodeCode) -> Option<&str> {
        self.current_episodes()?
            .iter()
            .find(|e| e.code() == code)
            .and_then(|e| e.url.as_deref())
    }

    /// Fold a finished fetch into the state.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Shows(result) => self.apply_shows(result),
            FetchOutcome::Episodes {
                request,
                show_id,
                result,
            } => self.apply_episodes(request, show_id, result),
        }
    }

    /// Snapshot of what should be drawn.
    pub fn view(&self) -> View<'_> {
        match self.state.phase() {
            Phase::Loading => View::Loading {
                message: LOADING_SHOWS_MESSAGE,
            },
            Phase::Failed(failure) => View::Failed {
                message: failure.message(),
                retry: failure.retry,
            },
            Phase::Ready => {
                let query = self.state.query();
                match self.state.mode() {
                    Mode::ShowsListing => View::Shows(ShowsView {
                        query,
                        cards: filter_shows(&self.shows, query),
                        total: self.shows.len(),
                    }),
                    Mode::EpisodesListing(show_id) => {
                        let content = match self.cache.get(show_id) {
                            Some(episodes) => EpisodesContent::Loaded {
                                cards: filter_episodes(episodes, query),
                                total: episodes.len(),
                                highlighted: self.state.highlighted(),
                            },
                            None => EpisodesContent::from_status(self.state.episode_status()),
                        };
                        View::Episodes(EpisodesView {
                            show_id,
                            show: self.show(show_id),
                            query,
                            content,
                            shows: &self.shows,
                        })
                    }
                }
            }
        }
    }

    fn current_episodes(&self) -> Option<&[Episode]> {
        let show_id = self.state.selected_show()?;
        self.cache.get(show_id)
    }

    fn cancel_active_fetch(&mut self) {
        if let Some(fetch) = self.active_fetch.take() {
            debug!(
                "Cancelling episode fetch {:?} for show {}",
                fetch.request, fetch.show_id
            );
            fetch.token.cancel();
        }
    }

    fn apply_shows(&mut self, result: Result<Vec<Show>, CatalogError>) {
        if self.state.phase() != Phase::Loading {
            debug!("Ignoring show listing outside of the initial load");
            return;
        }

        match result {
            Ok(shows) => {
                info!("Loaded {} shows", shows.len());
                self.shows = shows;
                self.state.set_phase(Phase::Ready);
                self.state.enter_shows();
            }
            Err(err) => match FailureKind::from_error(&err) {
                Some(kind) => {
                    warn!("Failed to load shows: {}", err);
                    self.state.set_phase(Phase::Failed(Failure {
                        kind,
                        retry: RetryTarget::InitialLoad,
                    }));
                }
                None => debug!("Show load cancelled"),
            },
        }
    }

    fn apply_episodes(
        &mut self,
        request: RequestId,
        show_id: ShowId,
        result: Result<Vec<Episode>, CatalogError>,
    ) {
        let is_active = self
            .active_fetch
            .as_ref()
            .is_some_and(|fetch| fetch.request == request);
        if !is_active {
            debug!(
                "Discarding superseded episode fetch {:?} for show {}",
                request, show_id
            );
            return;
        }
        self.active_fetch = None;

        let on_screen = self.state.selected_show() == Some(show_id);
        match result {
            Ok(episodes) => {
                info!("Loaded {} episodes for show {}", episodes.len(), show_id);
                self.cache.put(show_id, episodes);
                if on_screen {
                    self.state.set_episode_status(EpisodeStatus::Idle);
                }
            }
            Err(err) => match FailureKind::from_error(&err) {
                Some(kind) => {
                    warn!("Failed to load episodes for show {}: {}", show_id, err);
                    if on_screen {
                        self.state.set_episode_status(EpisodeStatus::Failed(Failure {
                            kind,
                            retry: RetryTarget::Episodes(show_id),
                        }));
                    }
                }
                None => debug!("Episode fetch for show {} cancelled", show_id),
            },
        }
    }
}
