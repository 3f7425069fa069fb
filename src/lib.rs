//! Episode Browser - Browse TV shows and their episodes
//!
//! This library provides the core of a catalog browser: a client for the
//! remote show catalog, a session cache in front of it, and the selection
//! state deciding which episodes are visible. Presentation is left to an
//! [`EpisodeRenderer`] supplied by the front-end.
//!
//! # Examples
//!
//! ```no_run
//! use episode_browser::{BrowserConfig, open_browser};
//!
//! let config = BrowserConfig::default();
//! let mut browser = open_browser(&config).unwrap();
//! browser.set_show(config.default_show).unwrap();
//!
//! browser.set_search_term("winter");
//! for episode in browser.visible_episodes() {
//!     println!("{} - {}", episode.key(), episode.name);
//! }
//! println!("{}", browser.episode_count());
//! ```

mod browser;
mod cache;
mod catalog;
mod render;

pub use browser::{Browser, DisplayMode, ShowRequest, ShowResolution};
pub use cache::{EpisodeLookup, FetchTicket, SessionCache};
pub use catalog::{
    CatalogProvider, DEFAULT_BASE_URL, Episode, EpisodeImage, EpisodeKey, InvalidEpisodeKey,
    NetworkError, Show, ShowId, TvMazeProvider,
};
pub use render::{
    EpisodeCard, EpisodeCount, EpisodeRenderer, IMAGE_PLACEHOLDER, SUMMARY_PLACEHOLDER,
    option_label,
};

use std::time::Duration;

/// Show loaded on startup when nothing else is requested (Game of Thrones).
pub const DEFAULT_SHOW: ShowId = ShowId(82);

/// Settings for connecting a browser to the remote catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Base URL of the catalog API
    pub base_url: String,
    /// Show that is active when the browser starts
    pub default_show: ShowId,
    /// Timeout for a single catalog request
    pub timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_show: DEFAULT_SHOW,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Creates a browser talking to the TVMaze catalog described by `config`.
///
/// The browser starts on the configured default show, but its episodes are
/// only fetched by the first [`Browser::set_show`] call.
pub fn open_browser(config: &BrowserConfig) -> Result<Browser<TvMazeProvider>, NetworkError> {
    let provider = TvMazeProvider::new(&config.base_url, config.timeout)?;
    Ok(Browser::new(SessionCache::new(provider), config.default_show))
}
