//! Type definitions for the tv-browser application.
//!
//! This module contains the normalized catalog records (shows and episodes)
//! together with the raw shapes they are deserialized from.

use serde::Deserialize;
use std::fmt;

/// Opaque identifier of a show in the upstream catalog.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ShowId(pub u64);

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Average rating of a show, which the catalog does not always know.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Rating {
    Known(f64),
    #[default]
    Unknown,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Known(value) => write!(f, "{}", value),
            Rating::Unknown => write!(f, "unknown"),
        }
    }
}

/// A television series, normalized from a catalog record.
#[derive(Clone, Debug, PartialEq)]
pub struct Show {
    /// Unique identifier for the show.
    pub id: ShowId,

    /// Display name of the show.
    pub name: String,

    /// Average rating across all episodes.
    pub rating: Rating,

    /// Genres in catalog order.
    pub genres: Vec<String>,

    /// Lifecycle status ("Running", "Ended", ...).
    pub status: String,

    /// Runtime of an episode in minutes.
    pub runtime: Option<u32>,

    /// Summary text, possibly containing HTML markup.
    pub summary: String,

    /// Poster image URL.
    pub image: Option<String>,
}

impl Show {
    /// Genres joined into one string, empty when the show has none.
    ///
    /// # Examples
    ///
    /// ```
    /// use tv_browser::types::{Rating, Show, ShowId};
    ///
    /// let show = Show {
    ///     id: ShowId(1),
    ///     name: "Archer".to_string(),
    ///     rating: Rating::Unknown,
    ///     genres: vec!["Comedy".to_string(), "Action".to_string()],
    ///     status: "Ended".to_string(),
    ///     runtime: Some(30),
    ///     summary: String::new(),
    ///     image: None,
    /// };
    /// assert_eq!(show.genres_joined(), "Comedy, Action");
    /// ```
    pub fn genres_joined(&self) -> String {
        self.genres.join(", ")
    }

    /// Summary with markup stripped.
    pub fn summary_text(&self) -> String {
        plain_text(&self.summary)
    }

    /// Format the show for display in selection menus.
    pub fn to_display(&self) -> String {
        format!("{} ({})", self.name, self.rating)
    }
}

/// A single installment of a show.
#[derive(Clone, Debug, PartialEq)]
pub struct Episode {
    /// Identifier, unique within the show.
    pub id: u64,

    /// Episode title.
    pub name: String,

    /// Season number, starting at 1.
    pub season: u32,

    /// Episode number within the season, starting at 1.
    pub number: u32,

    /// Summary text, possibly containing HTML markup.
    pub summary: String,

    /// Still image URL.
    pub image: Option<String>,

    /// Canonical detail page on the catalog's website.
    pub url: Option<String>,
}

impl Episode {
    /// The `SxxEyy` code of this episode.
    pub fn code(&self) -> EpisodeCode {
        EpisodeCode {
            season: self.season,
            number: self.number,
        }
    }

    /// Summary with markup stripped.
    pub fn summary_text(&self) -> String {
        plain_text(&self.summary)
    }

    /// Format the episode for display in selection menus.
    ///
    /// # Examples
    ///
    /// ```
    /// use tv_browser::types::Episode;
    ///
    /// let ep = Episode {
    ///     id: 1,
    ///     name: "Winter Is Coming".to_string(),
    ///     season: 1,
    ///     number: 1,
    ///     summary: String::new(),
    ///     image: None,
    ///     url: None,
    /// };
    /// assert_eq!(ep.to_display(), "S01E01 - Winter Is Coming");
    /// ```
    pub fn to_display(&self) -> String {
        format!("{} - {}", self.code(), self.name)
    }
}

/// Season and number of an episode, displayed as `S01E02`.
///
/// Codes order by season first, then number, which is the order episode
/// lists are kept in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeCode {
    pub season: u32,
    pub number: u32,
}

impl fmt::Display for EpisodeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.number)
    }
}

fn plain_text(markup: &str) -> String {
    if markup.is_empty() {
        return String::new();
    }
    nanohtml2text::html2text(markup).trim().to_string()
}

/// Image object as returned by the catalog.
#[derive(Debug, Default, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

impl RawImage {
    /// Preferred image URL: the medium size, falling back to the original.
    pub fn best(self) -> Option<String> {
        self.medium.or(self.original)
    }
}

/// Rating object as returned by the catalog.
#[derive(Debug, Default, Deserialize)]
pub struct RawRating {
    #[serde(default)]
    pub average: Option<f64>,
}

/// Raw show record as returned from the catalog API.
///
/// Converted into [`Show`] by the client, which fills in defaults for
/// absent fields.
#[derive(Debug, Deserialize)]
pub struct RawShow {
    pub id: ShowId,

    pub name: String,

    #[serde(default)]
    pub rating: Option<RawRating>,

    #[serde(default)]
    pub genres: Option<Vec<String>>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub runtime: Option<u32>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub image: Option<RawImage>,
}

/// Raw episode record as returned from the catalog API.
#[derive(Debug, Deserialize)]
pub struct RawEpisode {
    pub id: u64,

    #[serde(default)]
    pub name: Option<String>,

    /// Missing for specials.
    #[serde(default)]
    pub season: Option<u32>,

    /// Missing for specials.
    #[serde(default)]
    pub number: Option<u32>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub image: Option<RawImage>,

    #[serde(default)]
    pub url: Option<String>,
}
