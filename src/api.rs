//! Catalog client for fetching show and episode listings.
//!
//! [`CatalogSource`] is the contract the coordinator depends on. Two sources
//! are provided: [`TvMazeClient`] talks HTTP+JSON to the TVMaze API and
//! [`FileCatalog`] reads the same payloads from static JSON files. Both
//! normalize records into [`Show`]/[`Episode`] and sort them before
//! returning, so callers never re-sort.

use crate::error::CatalogError;
use crate::types::{Episode, RawEpisode, RawShow, Rating, Show, ShowId};
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default location of the public catalog.
pub const DEFAULT_API_URL: &str = "https://api.tvmaze.com";

const USER_AGENT: &str = concat!("tv-browser/", env!("CARGO_PKG_VERSION"));

/// A read-only source of shows and episodes.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Retrieve every show, sorted case-insensitively by name.
    async fn fetch_shows(&self) -> Result<Vec<Show>, CatalogError>;

    /// Retrieve every episode of a show, sorted by season then number.
    ///
    /// Fails with [`CatalogError::Cancelled`] once `token` fires.
    async fn fetch_episodes(
        &self,
        show_id: ShowId,
        token: &CancellationToken,
    ) -> Result<Vec<Episode>, CatalogError>;
}

/// Run `fut` unless `token` fires first.
///
/// A token that is already cancelled short-circuits without polling `fut`.
pub async fn with_cancellation<T, F>(
    token: &CancellationToken,
    fut: F,
) -> Result<T, CatalogError>
where
    F: Future<Output = Result<T, CatalogError>>,
{
    if token.is_cancelled() {
        return Err(CatalogError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(CatalogError::Cancelled),
        result = fut => result,
    }
}

/// Decode a JSON payload that must be a non-empty array of records.
///
/// # Examples
///
/// ```
/// use tv_browser::api::parse_collection;
/// use tv_browser::error::CatalogError;
/// use tv_browser::types::RawEpisode;
///
/// let err = parse_collection::<RawEpisode>(b"[]").unwrap_err();
/// assert!(matches!(err, CatalogError::EmptyResult));
///
/// let err = parse_collection::<RawEpisode>(br#"{"id": 1}"#).unwrap_err();
/// assert!(matches!(err, CatalogError::EmptyResult));
/// ```
pub fn parse_collection<T: DeserializeOwned>(payload: &[u8]) -> Result<Vec<T>, CatalogError> {
    let value: Value = serde_json::from_slice(payload)?;
    match value {
        Value::Array(items) if !items.is_empty() => Ok(serde_json::from_value(Value::Array(items))?),
        _ => Err(CatalogError::EmptyResult),
    }
}

/// Convert raw show records and sort them by name, ignoring case.
pub fn normalize_shows(raw: Vec<RawShow>) -> Vec<Show> {
    let mut shows: Vec<Show> = raw
        .into_iter()
        .map(|raw| Show {
            id: raw.id,
            name: raw.name,
            rating: raw
                .rating
                .and_then(|r| r.average)
                .map(Rating::Known)
                .unwrap_or(Rating::Unknown),
            genres: raw.genres.unwrap_or_default(),
            status: raw.status.unwrap_or_else(|| "Unknown".to_string()),
            runtime: raw.runtime,
            summary: raw.summary.unwrap_or_default(),
            image: raw.image.and_then(|image| image.best()),
        })
        .collect();

    shows.sort_by_cached_key(|show| show.name.to_lowercase());
    shows
}

/// Convert raw episode records and sort them by season, then number.
///
/// Records without a season or number (specials) are skipped, as are
/// repeats of a season/number pair already seen, so every episode code in
/// the result is unique.
pub fn normalize_episodes(raw: Vec<RawEpisode>) -> Vec<Episode> {
    let mut episodes: Vec<Episode> = raw
        .into_iter()
        .filter_map(|raw| {
            let (season, number) = match (raw.season, raw.number) {
                (Some(season), Some(number)) if season >= 1 && number >= 1 => (season, number),
                _ => {
                    debug!("Skipping episode {} without season/number", raw.id);
                    return None;
                }
            };
            Some(Episode {
                id: raw.id,
                name: raw.name.unwrap_or_else(|| "Untitled".to_string()),
                season,
                number,
                summary: raw.summary.unwrap_or_default(),
                image: raw.image.and_then(|image| image.best()),
                url: raw.url,
            })
        })
        .collect();

    episodes.sort_by_key(|e| e.code());

    let mut seen = HashSet::new();
    episodes.retain(|e| {
        let fresh = seen.insert(e.code());
        if !fresh {
            warn!("Dropping episode {} with duplicate code {}", e.id, e.code());
        }
        fresh
    });

    episodes
}

/// Catalog backed by the TVMaze HTTP API.
#[derive(Debug, Clone)]
pub struct TvMazeClient {
    client: reqwest::Client,
    base_url: String,
}

impl TvMazeClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        parse_collection(&body)
    }
}

#[async_trait]
impl CatalogSource for TvMazeClient {
    async fn fetch_shows(&self) -> Result<Vec<Show>, CatalogError> {
        let raw: Vec<RawShow> = self.get_collection("/shows").await?;
        let shows = normalize_shows(raw);
        debug!("Fetched {} shows", shows.len());
        Ok(shows)
    }

    async fn fetch_episodes(
        &self,
        show_id: ShowId,
        token: &CancellationToken,
    ) -> Result<Vec<Episode>, CatalogError> {
        let path = format!("/shows/{}/episodes", show_id);
        let raw: Vec<RawEpisode> = with_cancellation(token, self.get_collection(&path)).await?;
        let episodes = normalize_episodes(raw);
        debug!("Fetched {} episodes for show {}", episodes.len(), show_id);
        Ok(episodes)
    }
}

/// Catalog backed by static JSON files.
///
/// Expects `shows.json` at the root of the directory and one
/// `episodes/<show id>.json` per show, each holding the same payload the
/// HTTP API would return.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    root: PathBuf,
}

impl FileCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read_collection<T: DeserializeOwned>(&self, path: PathBuf) -> Result<Vec<T>, CatalogError> {
        debug!("Reading {}", path.display());
        let body = tokio::fs::read(&path)
            .await
            .map_err(|e| CatalogError::Network(format!("{}: {}", path.display(), e)))?;
        parse_collection(&body)
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn fetch_shows(&self) -> Result<Vec<Show>, CatalogError> {
        let raw: Vec<RawShow> = self.read_collection(self.root.join("shows.json")).await?;
        Ok(normalize_shows(raw))
    }

    async fn fetch_episodes(
        &self,
        show_id: ShowId,
        token: &CancellationToken,
    ) -> Result<Vec<Episode>, CatalogError> {
        let path = self.root.join("episodes").join(format!("{}.json", show_id));
        let raw: Vec<RawEpisode> = with_cancellation(token, self.read_collection(path)).await?;
        Ok(normalize_episodes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOWS_JSON: &str = r#"[
        {"id": 1, "name": "Breaking Bad", "genres": ["Drama"], "rating": {"average": 9.2},
         "status": "Ended", "runtime": 60, "summary": "<p>Chemistry.</p>",
         "image": {"medium": "bb.jpg", "original": "bb-full.jpg"}},
        {"id": 2, "name": "Archer", "genres": ["Comedy"], "rating": {"average": null},
         "status": "Ended", "runtime": null, "summary": null, "image": null},
        {"id": 3, "name": "alf"}
    ]"#;

    fn raw_episode(id: u64, season: Option<u32>, number: Option<u32>) -> RawEpisode {
        RawEpisode {
            id,
            name: Some(format!("Episode {}", id)),
            season,
            number,
            summary: None,
            image: None,
            url: None,
        }
    }

    fn shows() -> Vec<Show> {
        normalize_shows(parse_collection(SHOWS_JSON.as_bytes()).unwrap())
    }

    #[test]
    fn test_shows_sorted_case_insensitively() {
        let names: Vec<String> = shows().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["alf", "Archer", "Breaking Bad"]);
    }

    #[test]
    fn test_show_defaults_for_absent_fields() {
        let shows = shows();
        let alf = &shows[0];
        assert_eq!(alf.rating, Rating::Unknown);
        assert!(alf.genres.is_empty());
        assert_eq!(alf.genres_joined(), "");
        assert_eq!(alf.status, "Unknown");
        assert_eq!(alf.runtime, None);
        assert_eq!(alf.summary, "");
        assert_eq!(alf.image, None);

        let archer = &shows[1];
        assert_eq!(archer.rating, Rating::Unknown);
        assert_eq!(archer.image, None);
    }

    #[test]
    fn test_show_fields_carried_over() {
        let shows = shows();
        let bb = &shows[2];
        assert_eq!(bb.id, ShowId(1));
        assert_eq!(bb.rating, Rating::Known(9.2));
        assert_eq!(bb.runtime, Some(60));
        assert_eq!(bb.image.as_deref(), Some("bb.jpg"));
    }

    #[test]
    fn test_episodes_sorted_by_season_then_number() {
        let episodes = normalize_episodes(vec![
            raw_episode(1, Some(2), Some(1)),
            raw_episode(2, Some(1), Some(2)),
            raw_episode(3, Some(1), Some(1)),
            raw_episode(4, Some(1), Some(10)),
        ]);
        let codes: Vec<String> = episodes.iter().map(|e| e.code().to_string()).collect();
        assert_eq!(codes, vec!["S01E01", "S01E02", "S01E10", "S02E01"]);
    }

    #[test]
    fn test_episodes_sorted_invariant_holds_pairwise() {
        let episodes = normalize_episodes(vec![
            raw_episode(1, Some(3), Some(4)),
            raw_episode(2, Some(1), Some(9)),
            raw_episode(3, Some(2), Some(1)),
            raw_episode(4, Some(1), Some(1)),
            raw_episode(5, Some(3), Some(1)),
        ]);
        for pair in episodes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.season < b.season || (a.season == b.season && a.number <= b.number));
        }
    }

    #[test]
    fn test_specials_are_skipped() {
        let episodes = normalize_episodes(vec![
            raw_episode(1, Some(1), None),
            raw_episode(2, Some(0), Some(1)),
            raw_episode(3, Some(1), Some(1)),
        ]);
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].id, 3);
    }

    #[test]
    fn test_duplicate_codes_keep_first() {
        let episodes = normalize_episodes(vec![
            raw_episode(10, Some(1), Some(1)),
            raw_episode(11, Some(1), Some(1)),
        ]);
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].id, 10);
    }

    #[test]
    fn test_episode_defaults() {
        let mut raw = raw_episode(1, Some(1), Some(1));
        raw.name = None;
        let episodes = normalize_episodes(vec![raw]);
        assert_eq!(episodes[0].name, "Untitled");
        assert_eq!(episodes[0].summary, "");
        assert!(episodes[0].image.is_none());
    }

    #[test]
    fn test_parse_collection_rejects_bad_payloads() {
        assert!(matches!(
            parse_collection::<RawShow>(b"[]"),
            Err(CatalogError::EmptyResult)
        ));
        assert!(matches!(
            parse_collection::<RawShow>(b"null"),
            Err(CatalogError::EmptyResult)
        ));
        assert!(matches!(
            parse_collection::<RawShow>(b"<html>"),
            Err(CatalogError::Decode(_))
        ));
        assert!(matches!(
            parse_collection::<RawShow>(br#"[{"name": "no id"}]"#),
            Err(CatalogError::Decode(_))
        ));
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = TvMazeClient::new("https://api.tvmaze.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://api.tvmaze.com");
    }

    #[tokio::test]
    async fn test_with_cancellation_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let result = with_cancellation(&token, async { Ok::<_, CatalogError>(1) }).await;
        assert!(matches!(result, Err(CatalogError::Cancelled)));
    }

    #[tokio::test]
    async fn test_with_cancellation_fires_while_pending() {
        let token = CancellationToken::new();
        let child = token.clone();
        let handle = tokio::spawn(async move {
            with_cancellation(&child, std::future::pending::<Result<(), CatalogError>>()).await
        });
        token.cancel();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(CatalogError::Cancelled)));
    }

    #[tokio::test]
    async fn test_with_cancellation_passes_result_through() {
        let token = CancellationToken::new();
        let result = with_cancellation(&token, async { Ok::<_, CatalogError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
