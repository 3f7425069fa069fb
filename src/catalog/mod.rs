//! Data structures and traits for remote catalog retrieval.
//!
//! This module provides structures to represent shows and their episodes
//! as delivered by a remote catalog, as well as the trait implemented by
//! catalog clients.
mod tvmaze;
mod tvmaze_types;

pub use tvmaze::{DEFAULT_BASE_URL, TvMazeProvider};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while talking to the remote catalog.
///
/// Every failure of a fetch is a network error: the transport failed, the
/// service answered with an error status, or the body did not have the
/// expected structure.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Request to the catalog service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The catalog service answered with a non-success status
    #[error("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Failed to parse the service's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),
}

/// Identifier of a show, assigned by the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShowId(pub u32);

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShowId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ShowId)
    }
}

/// A series as listed by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    /// Catalog identifier of the show
    pub id: ShowId,
    /// Display name of the show
    pub name: String,
}

/// Addresses a single episode within its show.
///
/// Displays as `S01E02` and parses from the same notation, case-insensitive
/// and with or without zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeKey {
    /// The season number
    pub season: usize,
    /// The episode number within the season
    pub number: usize,
}

impl EpisodeKey {
    pub fn new(season: usize, number: usize) -> Self {
        Self { season, number }
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.number)
    }
}

/// Error returned when an episode code like `S01E02` cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid episode code '{0}', expected something like S01E02")]
pub struct InvalidEpisodeKey(String);

impl FromStr for EpisodeKey {
    type Err = InvalidEpisodeKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidEpisodeKey(s.to_string());
        let lower = s.trim().to_ascii_lowercase();

        let rest = lower.strip_prefix('s').ok_or_else(invalid)?;
        let (season, number) = rest.split_once('e').ok_or_else(invalid)?;

        Ok(Self {
            season: season.parse().map_err(|_| invalid())?,
            number: number.parse().map_err(|_| invalid())?,
        })
    }
}

/// Artwork attached to an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeImage {
    /// Medium sized image URL
    pub medium: String,
    /// Full resolution image URL, if the catalog has one
    pub original: Option<String>,
}

/// Represents a single episode of a show.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// The season number this episode belongs to
    pub season_number: usize,
    /// The episode number within the season
    pub episode_number: usize,
    /// The episode title
    pub name: String,
    /// Runtime in minutes, 0 if unknown
    pub runtime_minutes: u32,
    /// Plain text summary, if the catalog has one
    pub summary: Option<String>,
    /// Episode artwork, if the catalog has one
    pub image: Option<EpisodeImage>,
    /// Canonical page of the episode
    pub url: String,
}

impl Episode {
    /// The key addressing this episode within its show.
    pub fn key(&self) -> EpisodeKey {
        EpisodeKey::new(self.season_number, self.episode_number)
    }

    /// Checks whether name or summary contain an already lowercased term.
    ///
    /// Episodes without a summary can only match on their name.
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term)
            || self
                .summary
                .as_deref()
                .is_some_and(|summary| summary.to_lowercase().contains(term))
    }
}

/// Trait for clients that can read the remote catalog.
///
/// Implementors perform exactly one round trip per call and know nothing
/// about caching.
pub trait CatalogProvider {
    /// Fetches the list of all shows, in the order the catalog returns them.
    fn fetch_all_shows(&self) -> Result<Vec<Show>, NetworkError>;

    /// Fetches all episodes of a show, in the order the catalog returns them.
    ///
    /// # Arguments
    ///
    /// * `show_id` - The catalog identifier of the show
    fn fetch_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, NetworkError>;
}

impl<P> CatalogProvider for &P
where
    P: CatalogProvider + ?Sized,
{
    fn fetch_all_shows(&self) -> Result<Vec<Show>, NetworkError> {
        (**self).fetch_all_shows()
    }

    fn fetch_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, NetworkError> {
        (**self).fetch_episodes(show_id)
    }
}
