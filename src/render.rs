//! Rendering boundary
//!
//! The browser never produces presentation itself. It hands the visible
//! episodes and their counts to an [`EpisodeRenderer`], which decides how
//! they are shown. [`EpisodeCard`] carries the display strings every
//! renderer needs, so front-ends do not have to re-derive them.

use crate::catalog::{Episode, NetworkError};
use std::fmt;

/// Shown in place of artwork for episodes without an image.
pub const IMAGE_PLACEHOLDER: &str = "No image available";

/// Shown in place of the summary for episodes without one.
pub const SUMMARY_PLACEHOLDER: &str = "No summary available";

/// Number of displayed episodes versus episodes of the active show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeCount {
    pub displayed: usize,
    pub total: usize,
}

impl EpisodeCount {
    /// Whether the display shows a single episode on its own.
    pub fn is_single(&self) -> bool {
        self.displayed == 1
    }
}

impl fmt::Display for EpisodeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Displaying {} / {} episodes", self.displayed, self.total)
    }
}

/// Receives the data to present after every state change
pub trait EpisodeRenderer {
    /// Presents the visible episodes, in order, together with their counts
    fn render(&mut self, episodes: &[&Episode], count: EpisodeCount);

    /// Presents the single user-visible failure indicator
    fn render_error(&mut self, error: &NetworkError);
}

/// Display strings for one episode card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeCard {
    pub title: String,
    /// Episode code like `S01E02`
    pub code: String,
    /// Medium image URL, or [`IMAGE_PLACEHOLDER`]
    pub image: String,
    /// Full resolution image URL, if the catalog has one
    pub full_image: Option<String>,
    pub image_alt: String,
    /// Human readable runtime like `60 minutes`
    pub runtime: String,
    /// ISO 8601 duration like `PT60M`
    pub runtime_iso: String,
    /// Plain text summary, or [`SUMMARY_PLACEHOLDER`]
    pub summary: String,
    pub link: String,
}

impl From<&Episode> for EpisodeCard {
    fn from(episode: &Episode) -> Self {
        Self {
            title: episode.name.clone(),
            code: episode.key().to_string(),
            image: episode
                .image
                .as_ref()
                .map_or_else(|| IMAGE_PLACEHOLDER.to_string(), |image| image.medium.clone()),
            full_image: episode
                .image
                .as_ref()
                .and_then(|image| image.original.clone()),
            image_alt: format!(
                "{} - Season {} Episode {}",
                episode.name, episode.season_number, episode.episode_number
            ),
            runtime: format!("{} minutes", episode.runtime_minutes),
            runtime_iso: format!("PT{}M", episode.runtime_minutes),
            summary: episode
                .summary
                .as_deref()
                .filter(|summary| !summary.is_empty())
                .unwrap_or(SUMMARY_PLACEHOLDER)
                .to_string(),
            link: episode.url.clone(),
        }
    }
}

/// Formats a selector entry like `S01E02 - The Kingsroad`.
pub fn option_label(episode: &Episode) -> String {
    format!("{} - {}", episode.key(), episode.name)
}
