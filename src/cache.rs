//! Session cache module
//!
//! This module provides in-memory memoization of catalog reads for the
//! lifetime of one browsing session. Entries are written once per key and
//! never refetched, replaced or evicted.

use crate::catalog::{CatalogProvider, Episode, NetworkError, Show, ShowId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

/// Permission to fetch the episodes of one show.
///
/// Handed out by [`SessionCache::begin_episodes`] on a cache miss and
/// redeemed with [`SessionCache::complete_episodes`], or given back with
/// [`SessionCache::abandon`] when the fetch never happens. While a ticket is
/// outstanding, further misses for the same show report
/// [`EpisodeLookup::InFlight`] instead of issuing a second fetch.
#[derive(Debug)]
#[must_use = "a fetch ticket must be completed or abandoned, otherwise the show stays marked as in flight"]
pub struct FetchTicket {
    show_id: ShowId,
    /// Distinguishes this ticket from later ones issued for the same show
    generation: u64,
}

impl FetchTicket {
    /// The show this ticket fetches episodes for
    pub fn show_id(&self) -> ShowId {
        self.show_id
    }
}

/// Outcome of looking up a show's episodes without fetching them.
#[derive(Debug)]
pub enum EpisodeLookup {
    /// The episodes are cached, read them with [`SessionCache::cached_episodes`]
    Cached,
    /// Nothing cached and nothing in flight, the caller should fetch
    Fetch(FetchTicket),
    /// Another fetch for this show is already running
    InFlight,
}

/// Write-once, in-memory cache in front of a catalog provider
///
/// The show index is stored under a single global slot, episodes are stored
/// per show. A failed fetch stores nothing, so the next access retries it.
#[derive(Debug)]
pub struct SessionCache<P> {
    /// The underlying catalog client
    provider: P,
    /// The show index, once fetched
    shows: Option<Vec<Show>>,
    /// Episodes per show, in the order the catalog returned them
    episodes: HashMap<ShowId, Vec<Episode>>,
    /// Generation of the outstanding fetch ticket per show
    in_flight: HashMap<ShowId, u64>,
    next_generation: u64,
}

impl<P> SessionCache<P>
where
    P: CatalogProvider,
{
    /// Creates an empty cache in front of the given provider
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            shows: None,
            episodes: HashMap::new(),
            in_flight: HashMap::new(),
            next_generation: 0,
        }
    }

    /// The wrapped catalog client
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the show index, fetching it on first access
    ///
    /// # Errors
    ///
    /// Propagates the provider's error unchanged. Nothing is stored in that
    /// case, so the next call fetches again.
    pub fn get_shows(&mut self) -> Result<&[Show], NetworkError> {
        if self.shows.is_none() {
            debug!("show index not cached, fetching");
            let shows = self.provider.fetch_all_shows().inspect_err(|e| {
                warn!(error = %e, "show index fetch failed");
            })?;
            self.shows = Some(shows);
        } else {
            debug!("show index cache hit");
        }

        Ok(self.cached_shows().unwrap_or_default())
    }

    /// Returns the episodes of a show, fetching them on first access
    ///
    /// Returns `Ok(None)` without fetching while another caller holds the
    /// show's fetch ticket. The episodes become available once that ticket
    /// is completed.
    ///
    /// # Errors
    ///
    /// Propagates the provider's error unchanged. Nothing is stored in that
    /// case.
    pub fn get_episodes(&mut self, show_id: ShowId) -> Result<Option<&[Episode]>, NetworkError> {
        match self.begin_episodes(show_id) {
            EpisodeLookup::Cached => Ok(self.cached_episodes(show_id)),
            EpisodeLookup::Fetch(ticket) => {
                let result = self.fetch(&ticket);
                self.complete_episodes(ticket, result).map(Some)
            }
            EpisodeLookup::InFlight => Ok(None),
        }
    }

    /// Looks up a show's episodes, handing out a fetch ticket on a miss
    pub fn begin_episodes(&mut self, show_id: ShowId) -> EpisodeLookup {
        if self.episodes.contains_key(&show_id) {
            debug!(%show_id, "episode cache hit");
            return EpisodeLookup::Cached;
        }

        if self.in_flight.contains_key(&show_id) {
            debug!(%show_id, "episode fetch already in flight");
            return EpisodeLookup::InFlight;
        }

        debug!(%show_id, "episode cache miss");
        EpisodeLookup::Fetch(self.issue_ticket(show_id))
    }

    /// Hands out a new fetch ticket for a show, replacing any outstanding one
    ///
    /// For callers that cannot wait for the current ticket holder. The
    /// replaced ticket can still be completed, but its result is only stored
    /// if it arrives first, and it no longer clears the in-flight marker.
    pub fn take_over(&mut self, show_id: ShowId) -> FetchTicket {
        debug!(%show_id, "taking over episode fetch");
        self.issue_ticket(show_id)
    }

    /// Performs the fetch a ticket grants, without touching the cache
    pub fn fetch(&self, ticket: &FetchTicket) -> Result<Vec<Episode>, NetworkError> {
        self.provider.fetch_episodes(ticket.show_id)
    }

    /// Finishes a fetch started with [`SessionCache::begin_episodes`]
    ///
    /// On success the episodes are stored, unless the show got cached in the
    /// meantime, and the cached episodes are returned. On failure the error
    /// is handed back and the show can be fetched again.
    pub fn complete_episodes(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Episode>, NetworkError>,
    ) -> Result<&[Episode], NetworkError> {
        let show_id = ticket.show_id;
        self.release(ticket);

        match result {
            Ok(episodes) => {
                self.store_episodes(show_id, episodes);
                Ok(self.cached_episodes(show_id).unwrap_or_default())
            }
            Err(e) => {
                warn!(%show_id, error = %e, "episode fetch failed");
                Err(e)
            }
        }
    }

    /// Gives back a ticket whose fetch was cancelled or never started
    ///
    /// The show can be fetched again right away.
    pub fn abandon(&mut self, ticket: FetchTicket) {
        debug!(show_id = %ticket.show_id, "episode fetch abandoned");
        self.release(ticket);
    }

    /// The show index, if it has been fetched
    pub fn cached_shows(&self) -> Option<&[Show]> {
        self.shows.as_deref()
    }

    /// A show's episodes, if they have been fetched
    pub fn cached_episodes(&self, show_id: ShowId) -> Option<&[Episode]> {
        self.episodes.get(&show_id).map(Vec::as_slice)
    }

    /// Whether a fetch ticket for the show is outstanding
    pub fn is_in_flight(&self, show_id: ShowId) -> bool {
        self.in_flight.contains_key(&show_id)
    }

    fn issue_ticket(&mut self, show_id: ShowId) -> FetchTicket {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.in_flight.insert(show_id, generation);

        FetchTicket {
            show_id,
            generation,
        }
    }

    /// Clears the in-flight marker, unless a newer ticket owns it
    fn release(&mut self, ticket: FetchTicket) {
        if self.in_flight.get(&ticket.show_id) == Some(&ticket.generation) {
            self.in_flight.remove(&ticket.show_id);
        }
    }

    fn store_episodes(&mut self, show_id: ShowId, episodes: Vec<Episode>) {
        match self.episodes.entry(show_id) {
            Entry::Vacant(entry) => {
                debug!(%show_id, count = episodes.len(), "caching episodes");
                entry.insert(episodes);
            }
            Entry::Occupied(_) => {
                debug!(%show_id, "episodes already cached, discarding late result");
            }
        }
    }
}
