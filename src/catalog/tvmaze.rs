/// TVMaze catalog client implementation.
use super::tvmaze_types::{TvMazeEpisode, TvMazeImage, TvMazeShow};
use super::{CatalogProvider, Episode, EpisodeImage, NetworkError, Show, ShowId};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The public TVMaze API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";

/// Catalog client for the TVMaze API.
///
/// Shows are read from `{base_url}/shows`, episodes from
/// `{base_url}/shows/{id}/episodes`.
#[derive(Debug)]
pub struct TvMazeProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TvMazeProvider {
    /// Creates a new TVMaze client talking to `base_url`.
    ///
    /// A trailing slash on the base URL is ignored.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs a single GET request and parses the JSON body.
    fn get_json<T>(&self, path: &str) -> Result<T, NetworkError>
    where
        T: DeserializeOwned,
    {
        // Build the API URL
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "requesting catalog resource");

        // Make the HTTP request
        let response = self.client.get(&url).send().map_err(|e| {
            warn!(%url, error = %e, "catalog request failed");
            NetworkError::RequestFailed(e.to_string())
        })?;

        // Ensure request was successful
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "catalog answered with error status");
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        // Read and parse the JSON response
        let body = response
            .text()
            .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;

        parse_body(&body)
    }

    /// Converts a TVMaze show to our internal Show structure.
    fn convert_show(tvmaze_show: TvMazeShow) -> Show {
        Show {
            id: ShowId(tvmaze_show.id),
            name: tvmaze_show.name,
        }
    }

    /// Converts a TVMaze episode to our internal Episode structure.
    ///
    /// Unnumbered specials cannot be addressed by season and episode number
    /// and are skipped.
    fn convert_episode(tvmaze_episode: TvMazeEpisode) -> Option<Episode> {
        let Some(episode_number) = tvmaze_episode.number else {
            debug!(
                season = tvmaze_episode.season,
                name = ?tvmaze_episode.name,
                "skipping unnumbered episode"
            );
            return None;
        };

        Some(Episode {
            season_number: tvmaze_episode.season,
            episode_number,
            name: tvmaze_episode.name.unwrap_or_else(|| "Unknown".to_string()),
            runtime_minutes: tvmaze_episode.runtime.unwrap_or(0),
            summary: tvmaze_episode
                .summary
                .map(|s| nanohtml2text::html2text(&s).trim().to_string()),
            image: tvmaze_episode.image.and_then(Self::convert_image),
            url: tvmaze_episode.url,
        })
    }

    fn convert_image(image: TvMazeImage) -> Option<EpisodeImage> {
        match (image.medium, image.original) {
            (Some(medium), original) => Some(EpisodeImage { medium, original }),
            (None, Some(original)) => Some(EpisodeImage {
                medium: original.clone(),
                original: Some(original),
            }),
            (None, None) => None,
        }
    }
}

fn parse_body<T>(body: &str) -> Result<T, NetworkError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| NetworkError::ParseFailed(e.to_string()))
}

impl CatalogProvider for TvMazeProvider {
    fn fetch_all_shows(&self) -> Result<Vec<Show>, NetworkError> {
        // The index endpoint returns the first page of shows only
        let shows: Vec<TvMazeShow> = self.get_json("/shows")?;
        info!(count = shows.len(), "fetched show index");

        // Convert to our internal structures, keeping the catalog order
        Ok(shows.into_iter().map(Self::convert_show).collect())
    }

    fn fetch_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, NetworkError> {
        let episodes: Vec<TvMazeEpisode> = self.get_json(&format!("/shows/{show_id}/episodes"))?;
        info!(%show_id, count = episodes.len(), "fetched episodes");

        // Convert to our internal structures, dropping unnumbered specials
        Ok(episodes
            .into_iter()
            .filter_map(Self::convert_episode)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPISODES_JSON: &str = r#"[
        {
            "id": 4952,
            "url": "https://www.tvmaze.com/episodes/4952/game-of-thrones-1x01-winter-is-coming",
            "name": "Winter is Coming",
            "season": 1,
            "number": 1,
            "runtime": 60,
            "image": {
                "medium": "https://static.tvmaze.com/uploads/images/medium_landscape/1/2668.jpg",
                "original": "https://static.tvmaze.com/uploads/images/original_untouched/1/2668.jpg"
            },
            "summary": "<p>Lord Eddard Stark is torn.</p>"
        },
        {
            "id": 4953,
            "url": "https://www.tvmaze.com/episodes/4953/game-of-thrones-1x02-the-kingsroad",
            "name": null,
            "season": 1,
            "number": 2,
            "runtime": null,
            "image": null,
            "summary": null
        },
        {
            "id": 1000,
            "url": "https://www.tvmaze.com/episodes/1000/special",
            "name": "Behind the Scenes",
            "season": 1,
            "number": null,
            "runtime": 30,
            "image": null,
            "summary": null
        }
    ]"#;

    fn converted_episodes() -> Vec<Episode> {
        let raw: Vec<TvMazeEpisode> = parse_body(EPISODES_JSON).unwrap();
        raw.into_iter()
            .filter_map(TvMazeProvider::convert_episode)
            .collect()
    }

    #[test]
    fn test_convert_episode_with_all_fields() {
        let episodes = converted_episodes();
        let first = &episodes[0];

        assert_eq!(first.season_number, 1);
        assert_eq!(first.episode_number, 1);
        assert_eq!(first.name, "Winter is Coming");
        assert_eq!(first.runtime_minutes, 60);
        assert_eq!(first.summary.as_deref(), Some("Lord Eddard Stark is torn."));
        assert_eq!(
            first.image.as_ref().map(|image| image.medium.as_str()),
            Some("https://static.tvmaze.com/uploads/images/medium_landscape/1/2668.jpg")
        );
        assert!(first.url.ends_with("1x01-winter-is-coming"));
    }

    #[test]
    fn test_convert_episode_with_missing_fields() {
        let episodes = converted_episodes();
        let second = &episodes[1];

        assert_eq!(second.name, "Unknown");
        assert_eq!(second.runtime_minutes, 0);
        assert_eq!(second.summary, None);
        assert_eq!(second.image, None);
    }

    #[test]
    fn test_unnumbered_specials_are_skipped() {
        let episodes = converted_episodes();
        assert_eq!(episodes.len(), 2);
        assert!(episodes.iter().all(|e| e.name != "Behind the Scenes"));
    }

    #[test]
    fn test_convert_show_preserves_order() {
        let raw: Vec<TvMazeShow> = parse_body(
            r#"[{"id": 82, "name": "Game of Thrones", "language": "English"},
                {"id": 1, "name": "Under the Dome"}]"#,
        )
        .unwrap();
        let shows: Vec<Show> = raw.into_iter().map(TvMazeProvider::convert_show).collect();

        assert_eq!(shows[0].id, ShowId(82));
        assert_eq!(shows[0].name, "Game of Thrones");
        assert_eq!(shows[1].id, ShowId(1));
    }

    #[test]
    fn test_unexpected_structure_is_parse_error() {
        let result: Result<Vec<TvMazeShow>, _> = parse_body(r#"{"message": "nope"}"#);
        assert!(matches!(result, Err(NetworkError::ParseFailed(_))));
    }

    #[test]
    fn test_image_falls_back_to_original() {
        let image = TvMazeProvider::convert_image(TvMazeImage {
            medium: None,
            original: Some("https://example.test/full.jpg".to_string()),
        });
        assert_eq!(
            image.map(|image| image.medium),
            Some("https://example.test/full.jpg".to_string())
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider =
            TvMazeProvider::new("https://api.tvmaze.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(provider.base_url(), DEFAULT_BASE_URL);
    }
}
