//! Integration tests for tv-browser.
//!
//! These tests drive the coordinator end to end against mock catalogs,
//! static catalog files, and a minimal local HTTP server.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tv_browser::api::{with_cancellation, CatalogSource, FileCatalog, TvMazeClient};
use tv_browser::coordinator::{Coordinator, FetchOutcome};
use tv_browser::error::CatalogError;
use tv_browser::state::{JumpTarget, Mode, SERVER_MESSAGE};
use tv_browser::types::{Episode, EpisodeCode, Rating, Show, ShowId};
use tv_browser::view::{EpisodesContent, View, EMPTY_SHOWS_MESSAGE};

fn show(id: u64, name: &str) -> Show {
    Show {
        id: ShowId(id),
        name: name.to_string(),
        rating: Rating::Unknown,
        genres: Vec::new(),
        status: "Running".to_string(),
        runtime: None,
        summary: String::new(),
        image: None,
    }
}

fn episode(season: u32, number: u32, name: &str) -> Episode {
    Episode {
        id: (season * 100 + number) as u64,
        name: name.to_string(),
        season,
        number,
        summary: String::new(),
        image: None,
        url: Some(format!("https://example.test/episodes/{}", name)),
    }
}

/// Wait for the next fetch outcome and apply it.
async fn apply_next(coordinator: &mut Coordinator, outcomes: &mut mpsc::UnboundedReceiver<FetchOutcome>) {
    let outcome = tokio::time::timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .expect("timed out waiting for fetch outcome")
        .expect("outcome channel closed");
    coordinator.apply(outcome);
}

fn episode_names(view: &View<'_>) -> Vec<String> {
    match view {
        View::Episodes(episodes) => episodes.cards().iter().map(|e| e.name.clone()).collect(),
        other => panic!("expected episode listing, got {:?}", other),
    }
}

/// Catalog whose episode responses are released by the test.
///
/// Episode fetches ignore cancellation unless `honor_cancellation` is set,
/// like a transport that cannot abort an in-flight request.
struct GatedCatalog {
    shows: Vec<Show>,
    gates: Mutex<HashMap<ShowId, oneshot::Receiver<Vec<Episode>>>>,
    honor_cancellation: bool,
}

impl GatedCatalog {
    fn new(shows: Vec<Show>, honor_cancellation: bool) -> Self {
        Self {
            shows,
            gates: Mutex::new(HashMap::new()),
            honor_cancellation,
        }
    }

    fn gate(&self, show_id: ShowId) -> oneshot::Sender<Vec<Episode>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(show_id, rx);
        tx
    }
}

#[async_trait]
impl CatalogSource for GatedCatalog {
    async fn fetch_shows(&self) -> Result<Vec<Show>, CatalogError> {
        Ok(self.shows.clone())
    }

    async fn fetch_episodes(
        &self,
        show_id: ShowId,
        token: &CancellationToken,
    ) -> Result<Vec<Episode>, CatalogError> {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .remove(&show_id)
            .ok_or(CatalogError::EmptyResult)?;
        let released = async { gate.await.map_err(|_| CatalogError::EmptyResult) };
        if self.honor_cancellation {
            with_cancellation(token, released).await
        } else {
            released.await
        }
    }
}

/// Catalog that counts the episode fetches reaching it.
struct CountingCatalog<C> {
    inner: C,
    episode_calls: AtomicUsize,
}

#[async_trait]
impl<C: CatalogSource> CatalogSource for CountingCatalog<C> {
    async fn fetch_shows(&self) -> Result<Vec<Show>, CatalogError> {
        self.inner.fetch_shows().await
    }

    async fn fetch_episodes(
        &self,
        show_id: ShowId,
        token: &CancellationToken,
    ) -> Result<Vec<Episode>, CatalogError> {
        self.episode_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_episodes(show_id, token).await
    }
}

fn write_catalog(dir: &Path) {
    fs::write(
        dir.join("shows.json"),
        r#"[
            {"id": 1, "name": "Breaking Bad", "genres": ["Drama", "Crime"],
             "rating": {"average": 9.2}, "status": "Ended", "runtime": 60,
             "summary": "<p>A chemistry teacher turns to crime.</p>",
             "image": {"medium": "bb-medium.jpg", "original": "bb.jpg"}},
            {"id": 2, "name": "Archer", "genres": ["Comedy"],
             "rating": {"average": null}, "status": "Ended",
             "summary": "<p>Spies behaving badly.</p>", "image": null}
        ]"#,
    )
    .unwrap();

    fs::create_dir(dir.join("episodes")).unwrap();
    fs::write(
        dir.join("episodes").join("1.json"),
        r#"[
            {"id": 12, "name": "B", "season": 1, "number": 2, "summary": null,
             "url": "https://example.test/bb/1x02"},
            {"id": 11, "name": "A", "season": 1, "number": 1,
             "summary": "<p>The <b>pilot</b>.</p>", "url": "https://example.test/bb/1x01"},
            {"id": 99, "name": "Special", "season": 1, "number": null}
        ]"#,
    )
    .unwrap();
}

#[tokio::test]
async fn test_superseded_fetch_never_reaches_cache_or_screen() {
    let catalog = Arc::new(GatedCatalog::new(vec![show(1, "Alpha"), show(2, "Beta")], false));
    let release_a = catalog.gate(ShowId(1));
    let release_b = catalog.gate(ShowId(2));

    let (mut coordinator, mut outcomes) = Coordinator::new(catalog.clone());
    coordinator.load_shows();
    apply_next(&mut coordinator, &mut outcomes).await;

    coordinator.select_show(ShowId(1));
    coordinator.select_show(ShowId(2));

    release_b.send(vec![episode(1, 1, "beta-pilot")]).unwrap();
    apply_next(&mut coordinator, &mut outcomes).await;

    // A resolves after B even though it was requested first.
    release_a.send(vec![episode(1, 1, "alpha-pilot")]).unwrap();
    apply_next(&mut coordinator, &mut outcomes).await;

    assert!(!coordinator.cache().contains(ShowId(1)));
    assert!(coordinator.cache().contains(ShowId(2)));
    assert_eq!(coordinator.state().mode(), Mode::EpisodesListing(ShowId(2)));
    assert_eq!(episode_names(&coordinator.view()), vec!["beta-pilot"]);
}

#[tokio::test]
async fn test_leaving_listing_cancels_fetch() {
    let catalog = Arc::new(GatedCatalog::new(vec![show(1, "Alpha")], true));
    let _release = catalog.gate(ShowId(1));

    let (mut coordinator, mut outcomes) = Coordinator::new(catalog.clone());
    coordinator.load_shows();
    apply_next(&mut coordinator, &mut outcomes).await;

    coordinator.select_show(ShowId(1));
    assert!(coordinator.is_fetching_episodes());
    coordinator.back_to_shows();
    assert!(!coordinator.is_fetching_episodes());

    // The cancelled fetch still reports back, and is ignored.
    apply_next(&mut coordinator, &mut outcomes).await;
    assert_eq!(coordinator.state().mode(), Mode::ShowsListing);
    assert!(coordinator.cache().is_empty());
    assert!(matches!(coordinator.view(), View::Shows(_)));
}

#[tokio::test]
async fn test_cached_show_is_not_fetched_again() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let catalog = Arc::new(CountingCatalog {
        inner: FileCatalog::new(dir.path()),
        episode_calls: AtomicUsize::new(0),
    });

    let (mut coordinator, mut outcomes) = Coordinator::new(catalog.clone());
    coordinator.load_shows();
    apply_next(&mut coordinator, &mut outcomes).await;

    coordinator.select_show(ShowId(1));
    apply_next(&mut coordinator, &mut outcomes).await;
    coordinator.back_to_shows();
    coordinator.select_show(ShowId(1));

    assert_eq!(catalog.episode_calls.load(Ordering::SeqCst), 1);
    assert!(!coordinator.is_fetching_episodes());
    assert_eq!(episode_names(&coordinator.view()), vec!["A", "B"]);
}

#[tokio::test]
async fn test_file_catalog_listing_order_and_filters() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());

    let (mut coordinator, mut outcomes) = Coordinator::new(Arc::new(FileCatalog::new(dir.path())));
    coordinator.load_shows();
    apply_next(&mut coordinator, &mut outcomes).await;

    match coordinator.view() {
        View::Shows(shows) => {
            let names: Vec<&str> = shows.cards.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["Archer", "Breaking Bad"]);
            assert_eq!(shows.count_header(), "Displaying 2/2 shows");
        }
        other => panic!("expected show listing, got {:?}", other),
    }

    coordinator.set_query("chemistry");
    match coordinator.view() {
        View::Shows(shows) => assert_eq!(shows.cards.len(), 1),
        other => panic!("expected show listing, got {:?}", other),
    }

    coordinator.set_query("zzz");
    match coordinator.view() {
        View::Shows(shows) => {
            assert!(shows.cards.is_empty());
            assert_eq!(shows.empty_message(), Some(EMPTY_SHOWS_MESSAGE));
            assert!(shows.options().is_empty());
        }
        other => panic!("expected show listing, got {:?}", other),
    }

    coordinator.clear_query();
    coordinator.select_show(ShowId(1));
    apply_next(&mut coordinator, &mut outcomes).await;

    // Specials are dropped and the rest sorted by season and number.
    assert_eq!(episode_names(&coordinator.view()), vec!["A", "B"]);

    // Entering the listing starts with an empty filter.
    assert_eq!(coordinator.view().query(), "");

    coordinator.set_query("pilot");
    assert_eq!(episode_names(&coordinator.view()), vec!["A"]);
    coordinator.set_query("<b>");
    assert!(episode_names(&coordinator.view()).is_empty());
    coordinator.clear_query();

    let code = EpisodeCode { season: 1, number: 2 };
    coordinator.jump_to(JumpTarget::Episode(code));
    match coordinator.view() {
        View::Episodes(episodes) => {
            assert_eq!(episodes.highlighted(), Some(code));
            assert_eq!(episodes.highlighted_index(), Some(1));
            assert_eq!(episodes.count_header(), "Got 2/2 episode(s)");
        }
        other => panic!("expected episode listing, got {:?}", other),
    }
    assert_eq!(coordinator.watch_url(code), Some("https://example.test/bb/1x02"));

    coordinator.jump_to(JumpTarget::All);
    match coordinator.view() {
        View::Episodes(episodes) => assert_eq!(episodes.highlighted(), None),
        other => panic!("expected episode listing, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_episode_file_is_connectivity_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let catalog = FileCatalog::new(dir.path());

    let err = catalog
        .fetch_episodes(ShowId(2), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Network(_)));
}

/// Serve one canned response per connection; `handler` maps a request path
/// to a status code and body.
async fn spawn_server<F>(handler: F) -> String
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                loop {
                    let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                    read += n;
                    let done = buf[..read].windows(4).any(|w| w == b"\r\n\r\n");
                    if n == 0 || done || read == buf.len() {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&buf[..read]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = handler(&path);
                let response = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_server_error_on_episodes_then_retry() {
    let episode_requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&episode_requests);
    let base = spawn_server(move |path| match path {
        "/shows" => (200, r#"[{"id": 5, "name": "Lost"}]"#.to_string()),
        "/shows/5/episodes" => {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                (500, "{}".to_string())
            } else {
                (
                    200,
                    r#"[{"id": 501, "name": "Pilot", "season": 1, "number": 1}]"#.to_string(),
                )
            }
        }
        _ => (404, "{}".to_string()),
    })
    .await;

    let client = TvMazeClient::new(&base, Duration::from_secs(5)).unwrap();
    let (mut coordinator, mut outcomes) = Coordinator::new(Arc::new(client));
    coordinator.load_shows();
    apply_next(&mut coordinator, &mut outcomes).await;

    coordinator.select_show(ShowId(5));
    apply_next(&mut coordinator, &mut outcomes).await;

    assert_eq!(coordinator.state().mode(), Mode::EpisodesListing(ShowId(5)));
    match coordinator.view() {
        View::Episodes(episodes) => match episodes.content {
            EpisodesContent::Failed(failure) => assert_eq!(failure.message(), SERVER_MESSAGE),
            other => panic!("expected failure, got {:?}", other),
        },
        other => panic!("expected episode listing, got {:?}", other),
    }
    assert!(!coordinator.cache().contains(ShowId(5)));

    coordinator.retry();
    apply_next(&mut coordinator, &mut outcomes).await;

    assert_eq!(episode_requests.load(Ordering::SeqCst), 2);
    assert_eq!(episode_names(&coordinator.view()), vec!["Pilot"]);
}

#[tokio::test]
async fn test_http_error_classification() {
    let base = spawn_server(|path| match path {
        "/shows" => (200, "[]".to_string()),
        _ => (500, "{}".to_string()),
    })
    .await;
    let client = TvMazeClient::new(&base, Duration::from_secs(5)).unwrap();

    let err = client.fetch_shows().await.unwrap_err();
    assert!(matches!(err, CatalogError::EmptyResult));

    let err = client
        .fetch_episodes(ShowId(1), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Http { status: 500 }));
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TvMazeClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let err = client.fetch_shows().await.unwrap_err();
    assert!(matches!(err, CatalogError::Network(_)));
}
