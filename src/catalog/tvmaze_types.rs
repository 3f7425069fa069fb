/// TVMaze API response types for deserialization.
///
/// These structures mirror the JSON response format from the TVMaze API.
/// Only the fields the browser uses are declared, everything else is ignored.
use serde::Deserialize;

/// A show entry from the `/shows` index endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeShow {
    /// Catalog identifier of the show
    pub id: u32,
    /// The name of the TV show
    pub name: String,
}

/// A single episode from the `/shows/{id}/episodes` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEpisode {
    /// Season number
    pub season: usize,
    /// Episode number within the season (null for unnumbered specials)
    pub number: Option<usize>,
    /// Episode title (may be null for episodes without a title)
    pub name: Option<String>,
    /// Runtime in minutes (null when not yet known)
    pub runtime: Option<u32>,
    /// Episode summary in HTML format (may be null)
    pub summary: Option<String>,
    /// Episode artwork (may be null)
    pub image: Option<TvMazeImage>,
    /// Canonical TVMaze page of the episode
    pub url: String,
}

/// Image references attached to a TVMaze resource.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeImage {
    pub medium: Option<String>,
    pub original: Option<String>,
}
