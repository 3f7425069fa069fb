//! Selection and filter state
//!
//! [`Browser`] is the single source of truth for what is currently visible.
//! It owns the session cache, tracks the active show, the search term and
//! the single-episode selection, and derives the visible episode list from
//! those on demand.
//!
//! The display is in exactly one of three modes, see [`DisplayMode`].
//! Entering a search term and selecting a single episode exclude each
//! other: setting one clears the other. Switching shows clears both.

use crate::cache::{EpisodeLookup, FetchTicket, SessionCache};
use crate::catalog::{CatalogProvider, Episode, EpisodeKey, NetworkError, Show, ShowId};
use crate::render::{EpisodeCount, EpisodeRenderer, option_label};
use tracing::debug;

/// Which subset of the active show's episodes is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Every episode, in catalog order
    All,
    /// Episodes matching the search term
    Filtered,
    /// Exactly the selected episode
    Single,
}

/// Outcome of requesting a show switch.
#[derive(Debug)]
pub enum ShowRequest {
    /// The show's episodes were cached, the switch already happened
    Ready,
    /// The episodes have to be fetched, resolve the ticket afterwards
    Fetch(FetchTicket),
    /// A fetch for this show is already running, its resolution will switch
    Pending,
}

/// Outcome of resolving a show fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowResolution {
    /// The fetched show is now the active show
    Activated,
    /// Another show was requested in the meantime, the active show is unchanged
    Superseded,
}

/// Selection state over a session cache
#[derive(Debug)]
pub struct Browser<P> {
    cache: SessionCache<P>,
    active_show: ShowId,
    /// Most recently requested show whose episodes are still being fetched
    requested_show: Option<ShowId>,
    /// Always lowercase
    search_term: String,
    selected: Option<EpisodeKey>,
}

impl<P> Browser<P>
where
    P: CatalogProvider,
{
    /// Creates a browser showing `default_show` in [`DisplayMode::All`].
    ///
    /// Nothing is fetched yet, call [`Browser::set_show`] with the default
    /// show to load its episodes.
    pub fn new(cache: SessionCache<P>, default_show: ShowId) -> Self {
        Self {
            cache,
            active_show: default_show,
            requested_show: None,
            search_term: String::new(),
            selected: None,
        }
    }

    pub fn cache(&self) -> &SessionCache<P> {
        &self.cache
    }

    /// The show index, fetched on first access
    pub fn shows(&mut self) -> Result<&[Show], NetworkError> {
        self.cache.get_shows()
    }

    pub fn active_show(&self) -> ShowId {
        self.active_show
    }

    /// The show a switch is waiting on, if any
    pub fn pending_show(&self) -> Option<ShowId> {
        self.requested_show
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn selected_episode(&self) -> Option<EpisodeKey> {
        self.selected
    }

    /// Switches to another show, fetching its episodes if necessary.
    ///
    /// Clears the search term and the episode selection once the show's
    /// episodes are available. When returning `Ok`, the show is active.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the episodes could not be loaded. The
    /// previously active show stays visible, with its search term and
    /// selection untouched.
    pub fn set_show(&mut self, show_id: ShowId) -> Result<(), NetworkError> {
        let ticket = match self.request_show(show_id) {
            ShowRequest::Ready => return Ok(()),
            ShowRequest::Fetch(ticket) => ticket,
            // Nobody may ever complete the outstanding ticket, fetch here
            ShowRequest::Pending => self.cache.take_over(show_id),
        };

        let result = self.cache.fetch(&ticket);
        self.resolve_show(ticket, result).map(|_| ())
    }

    /// First half of a show switch, for hosts that fetch elsewhere.
    ///
    /// Marks `show_id` as the most recently requested show. Only that show
    /// can become active when its fetch resolves; resolutions of earlier
    /// requests are stored in the cache but do not change the display.
    pub fn request_show(&mut self, show_id: ShowId) -> ShowRequest {
        self.requested_show = Some(show_id);

        match self.cache.begin_episodes(show_id) {
            EpisodeLookup::Cached => {
                self.activate(show_id);
                ShowRequest::Ready
            }
            EpisodeLookup::Fetch(ticket) => ShowRequest::Fetch(ticket),
            EpisodeLookup::InFlight => ShowRequest::Pending,
        }
    }

    /// Second half of a show switch, called with the ticket's fetch result.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the show is still the requested one.
    /// Failures of superseded requests are only logged.
    pub fn resolve_show(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Episode>, NetworkError>,
    ) -> Result<ShowResolution, NetworkError> {
        let show_id = ticket.show_id();
        let is_current = self.requested_show == Some(show_id);

        // Store the result even for superseded requests, the cache is write-once
        let outcome = self.cache.complete_episodes(ticket, result).map(|_| ());

        match (outcome, is_current) {
            (Ok(()), true) => {
                self.activate(show_id);
                Ok(ShowResolution::Activated)
            }
            (Err(e), true) => {
                // Keep the previous show visible, a retry fetches again
                self.requested_show = None;
                Err(e)
            }
            // The user moved on, neither success nor failure is shown
            (outcome, false) => {
                debug!(
                    %show_id,
                    failed = outcome.is_err(),
                    "ignoring resolution of superseded show request"
                );
                Ok(ShowResolution::Superseded)
            }
        }
    }

    /// Gives up a show switch whose fetch was cancelled.
    ///
    /// The active show stays as it is and the show can be requested again.
    pub fn abandon_show(&mut self, ticket: FetchTicket) {
        if self.requested_show == Some(ticket.show_id()) {
            self.requested_show = None;
        }
        self.cache.abandon(ticket);
    }

    /// Stores a new search term and leaves single-episode mode.
    pub fn set_search_term(&mut self, text: &str) {
        self.search_term = text.to_lowercase();
        self.selected = None;
    }

    /// Shows only the given episode of the active show.
    ///
    /// Returns `false` and changes nothing if the active show has no such
    /// episode.
    pub fn select_episode(&mut self, season: usize, number: usize) -> bool {
        let key = EpisodeKey::new(season, number);

        if !self.active_episodes().iter().any(|e| e.key() == key) {
            debug!(%key, show_id = %self.active_show, "ignoring selection of unknown episode");
            return false;
        }

        self.selected = Some(key);
        self.search_term.clear();
        true
    }

    /// Returns to showing every episode of the active show.
    pub fn clear_episode_selection(&mut self) {
        self.selected = None;
        self.search_term.clear();
    }

    pub fn display_mode(&self) -> DisplayMode {
        if self.selected.is_some() {
            DisplayMode::Single
        } else if !self.search_term.is_empty() {
            DisplayMode::Filtered
        } else {
            DisplayMode::All
        }
    }

    /// All cached episodes of the active show, empty until they are loaded
    pub fn active_episodes(&self) -> &[Episode] {
        self.cache
            .cached_episodes(self.active_show)
            .unwrap_or_default()
    }

    /// The episodes to display, in catalog order
    pub fn visible_episodes(&self) -> Vec<&Episode> {
        let episodes = self.active_episodes();

        match (self.display_mode(), self.selected) {
            (DisplayMode::Single, Some(key)) => {
                episodes.iter().filter(|e| e.key() == key).take(1).collect()
            }
            (DisplayMode::Filtered, _) => episodes
                .iter()
                .filter(|e| e.matches(&self.search_term))
                .collect(),
            _ => episodes.iter().collect(),
        }
    }

    pub fn episode_count(&self) -> EpisodeCount {
        EpisodeCount {
            displayed: self.visible_episodes().len(),
            total: self.active_episodes().len(),
        }
    }

    /// Entries for an episode selector, in catalog order
    pub fn episode_options(&self) -> Vec<(EpisodeKey, String)> {
        self.active_episodes()
            .iter()
            .map(|e| (e.key(), option_label(e)))
            .collect()
    }

    /// Hands the current visible episodes to a renderer
    pub fn render<R>(&self, renderer: &mut R)
    where
        R: EpisodeRenderer + ?Sized,
    {
        let visible = self.visible_episodes();
        let count = EpisodeCount {
            displayed: visible.len(),
            total: self.active_episodes().len(),
        };
        renderer.render(&visible, count);
    }

    fn activate(&mut self, show_id: ShowId) {
        debug!(%show_id, "activating show");
        self.active_show = show_id;
        self.requested_show = None;
        self.search_term.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{FakeCatalog, episode};

    fn catalog() -> FakeCatalog {
        FakeCatalog::default()
            .with_show(
                1,
                "Example",
                vec![
                    episode(1, 1, "Pilot", Some("A beginning")),
                    episode(1, 2, "Second", Some("Continues the story")),
                ],
            )
            .with_show(
                2,
                "Other",
                vec![
                    episode(1, 1, "Arrival", Some("Strangers in town")),
                    episode(1, 2, "Beginnings", None),
                    episode(2, 1, "Return", Some("Back to the BEGINNING")),
                ],
            )
    }

    fn names(browser: &Browser<&FakeCatalog>) -> Vec<String> {
        browser
            .visible_episodes()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    fn loaded(catalog: &FakeCatalog, show: u32) -> Browser<&FakeCatalog> {
        let mut browser = Browser::new(SessionCache::new(catalog), ShowId(show));
        browser.set_show(ShowId(show)).unwrap();
        browser
    }

    #[test]
    fn test_search_select_and_clear() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 1);

        browser.set_search_term("beginning");
        assert_eq!(names(&browser), vec!["Pilot"]);
        assert_eq!(browser.display_mode(), DisplayMode::Filtered);

        assert!(browser.select_episode(1, 2));
        assert_eq!(names(&browser), vec!["Second"]);
        assert_eq!(browser.display_mode(), DisplayMode::Single);
        assert_eq!(browser.search_term(), "");

        browser.clear_episode_selection();
        assert_eq!(names(&browser), vec!["Pilot", "Second"]);
        assert_eq!(browser.display_mode(), DisplayMode::All);
    }

    #[test]
    fn test_search_is_case_insensitive_and_keeps_order() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 2);

        browser.set_search_term("BeGiNnInG");
        assert_eq!(browser.search_term(), "beginning");
        assert_eq!(names(&browser), vec!["Beginnings", "Return"]);
        assert_eq!(
            browser.episode_count(),
            EpisodeCount {
                displayed: 2,
                total: 3
            }
        );
    }

    #[test]
    fn test_missing_summary_only_matches_name() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 2);

        browser.set_search_term("town");
        assert_eq!(names(&browser), vec!["Arrival"]);
    }

    #[test]
    fn test_empty_search_term_shows_all() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 2);

        browser.set_search_term("return");
        browser.set_search_term("");
        assert_eq!(browser.display_mode(), DisplayMode::All);
        assert_eq!(names(&browser), vec!["Arrival", "Beginnings", "Return"]);
    }

    #[test]
    fn test_search_clears_selection() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 1);

        assert!(browser.select_episode(1, 1));
        assert_eq!(browser.visible_episodes().len(), 1);

        browser.set_search_term("second");
        assert_eq!(browser.selected_episode(), None);
        assert_eq!(names(&browser), vec!["Second"]);
    }

    #[test]
    fn test_selecting_unknown_episode_is_noop() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 1);
        browser.set_search_term("pilot");

        assert!(!browser.select_episode(99, 99));
        assert_eq!(browser.search_term(), "pilot");
        assert_eq!(browser.selected_episode(), None);
        assert_eq!(names(&browser), vec!["Pilot"]);
    }

    #[test]
    fn test_set_show_resets_filters_and_fetches_once() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 1);
        browser.set_search_term("pilot");

        browser.set_show(ShowId(2)).unwrap();
        assert_eq!(browser.active_show(), ShowId(2));
        assert_eq!(browser.display_mode(), DisplayMode::All);
        assert_eq!(browser.visible_episodes().len(), 3);

        browser.set_show(ShowId(1)).unwrap();
        browser.set_show(ShowId(2)).unwrap();
        assert_eq!(catalog.episode_fetches(1), 1);
        assert_eq!(catalog.episode_fetches(2), 1);
    }

    #[test]
    fn test_failed_set_show_keeps_previous_state() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 1);
        assert!(browser.select_episode(1, 2));
        catalog.fail(2);

        assert!(browser.set_show(ShowId(2)).is_err());
        assert_eq!(browser.active_show(), ShowId(1));
        assert_eq!(browser.pending_show(), None);
        assert_eq!(names(&browser), vec!["Second"]);

        catalog.recover(2);
        browser.set_show(ShowId(2)).unwrap();
        assert_eq!(browser.active_show(), ShowId(2));
        assert_eq!(catalog.episode_fetches(2), 2);
    }

    #[test]
    fn test_dropped_ticket_does_not_strand_show() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 1);

        let ShowRequest::Fetch(ticket) = browser.request_show(ShowId(2)) else {
            panic!("expected a fetch for show 2");
        };
        drop(ticket);

        browser.set_show(ShowId(1)).unwrap();
        browser.set_show(ShowId(2)).unwrap();

        assert_eq!(browser.active_show(), ShowId(2));
        assert_eq!(names(&browser), vec!["Arrival", "Beginnings", "Return"]);
        assert_eq!(catalog.episode_fetches(2), 1);
    }

    #[test]
    fn test_abandoned_show_request_can_be_retried() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 1);

        let ShowRequest::Fetch(ticket) = browser.request_show(ShowId(2)) else {
            panic!("expected a fetch for show 2");
        };
        browser.abandon_show(ticket);

        assert_eq!(browser.pending_show(), None);
        assert_eq!(browser.active_show(), ShowId(1));
        assert!(matches!(
            browser.request_show(ShowId(2)),
            ShowRequest::Fetch(_)
        ));
    }

    #[test]
    fn test_last_requested_show_wins() {
        let catalog = catalog();
        let mut browser = Browser::new(SessionCache::new(&catalog), ShowId(1));

        let ShowRequest::Fetch(first) = browser.request_show(ShowId(1)) else {
            panic!("expected a fetch for show 1");
        };
        let ShowRequest::Fetch(second) = browser.request_show(ShowId(2)) else {
            panic!("expected a fetch for show 2");
        };

        let second_result = browser.cache().fetch(&second);
        let first_result = browser.cache().fetch(&first);

        assert_eq!(
            browser.resolve_show(second, second_result).unwrap(),
            ShowResolution::Activated
        );
        assert_eq!(
            browser.resolve_show(first, first_result).unwrap(),
            ShowResolution::Superseded
        );

        assert_eq!(browser.active_show(), ShowId(2));
        assert_eq!(names(&browser), vec!["Arrival", "Beginnings", "Return"]);
    }

    #[test]
    fn test_stale_resolution_in_order_does_not_switch() {
        let catalog = catalog();
        let mut browser = Browser::new(SessionCache::new(&catalog), ShowId(1));

        let ShowRequest::Fetch(first) = browser.request_show(ShowId(1)) else {
            panic!("expected a fetch for show 1");
        };
        let ShowRequest::Fetch(second) = browser.request_show(ShowId(2)) else {
            panic!("expected a fetch for show 2");
        };

        let first_result = browser.cache().fetch(&first);
        assert_eq!(
            browser.resolve_show(first, first_result).unwrap(),
            ShowResolution::Superseded
        );
        assert_eq!(browser.pending_show(), Some(ShowId(2)));

        let second_result = browser.cache().fetch(&second);
        browser.resolve_show(second, second_result).unwrap();
        assert_eq!(browser.active_show(), ShowId(2));

        // The superseded fetch still populated the cache
        browser.set_show(ShowId(1)).unwrap();
        assert_eq!(catalog.episode_fetches(1), 1);
    }

    #[test]
    fn test_episode_options() {
        let catalog = catalog();
        let browser = loaded(&catalog, 1);

        assert_eq!(
            browser.episode_options(),
            vec![
                (EpisodeKey::new(1, 1), "S01E01 - Pilot".to_string()),
                (EpisodeKey::new(1, 2), "S01E02 - Second".to_string()),
            ]
        );
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(Vec<String>, EpisodeCount)>,
    }

    impl EpisodeRenderer for RecordingRenderer {
        fn render(&mut self, episodes: &[&Episode], count: EpisodeCount) {
            let names: Vec<String> = episodes.iter().map(|e| e.name.clone()).collect();
            self.frames.push((names, count));
        }

        fn render_error(&mut self, _error: &NetworkError) {}
    }

    #[test]
    fn test_render_hands_over_visible_episodes() {
        let catalog = catalog();
        let mut browser = loaded(&catalog, 1);
        let mut renderer = RecordingRenderer::default();

        assert!(browser.select_episode(1, 1));
        browser.render(&mut renderer);

        let (names, count) = &renderer.frames[0];
        assert_eq!(names, &vec!["Pilot".to_string()]);
        assert!(count.is_single());
        assert_eq!(count.total, 2);
    }
}
