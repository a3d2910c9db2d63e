//! Search and selection synchronization.
//!
//! [`SearchSynchronizer`] owns the search box state (input text, candidate
//! list, highlighted candidate) and is the only path from a user pick to the
//! [`SelectionStore`] and the map. A session moves through
//! [`SessionPhase`]s:
//!
//! ```text
//! Idle --keystroke--> Pending --candidates--> Listed --pick--> Selected
//!                        ^                        |               |
//!                        +-------keystroke--------+---------------+
//! ```
//!
//! Every keystroke bumps an input revision. Debounced queries and geocoder
//! responses carry the revision they were issued for and are dropped if the
//! input (or a selection) has moved on by the time they arrive, so a slow
//! response can never overwrite the list for newer input.

use crate::api::GeocodeProvider;
use crate::config::Config;
use crate::debounce::DebouncedQueryChannel;
use crate::error::Result;
use crate::events::Event;
use crate::map::{MapSurface, MapViewportController};
use crate::models::{Location, QuickLink, SearchQuery};
use crate::store::SelectionStore;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing typed and nothing listed yet.
    Idle,
    /// A query is waiting on the debounce window or the geocoder.
    Pending,
    /// Candidates for the current input are shown.
    Listed,
    /// The user committed to a location.
    Selected,
}

pub struct SearchSynchronizer<P: GeocodeProvider, S: MapSurface> {
    provider: Arc<P>,
    debounce: DebouncedQueryChannel,
    store: SelectionStore,
    map: MapViewportController<S>,
    tx: mpsc::UnboundedSender<Event>,
    fly_zoom: f64,
    fly_duration: Duration,

    input: String,
    candidates: Vec<Location>,
    highlighted: Option<usize>,
    phase: SessionPhase,
    revision: u64,
    active: bool,

    lookups_issued: u64,
    last_lookup: Option<DateTime<Local>>,
}

impl<P: GeocodeProvider, S: MapSurface> SearchSynchronizer<P, S> {
    pub fn new(
        provider: Arc<P>,
        store: SelectionStore,
        map: MapViewportController<S>,
        tx: mpsc::UnboundedSender<Event>,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            debounce: DebouncedQueryChannel::new(config.geocoder.debounce(), tx.clone()),
            store,
            map,
            tx,
            fly_zoom: config.map.fly_zoom,
            fly_duration: config.map.fly_duration(),
            input: String::new(),
            candidates: Vec::new(),
            highlighted: None,
            phase: SessionPhase::Idle,
            revision: 0,
            active: true,
            lookups_issued: 0,
            last_lookup: None,
        }
    }

    /// Runs the initial lookup for the empty input.
    pub fn start(&mut self) {
        self.debounce.submit(&self.input, self.revision);
    }

    /// Ends the session: pending timers are discarded and any response
    /// still in flight will be ignored.
    pub fn shutdown(&mut self) {
        self.active = false;
        self.debounce.cancel();
        debug!("Search session closed at revision {}", self.revision);
    }

    /// Replaces the search text. Unchanged text is a no-op.
    pub fn on_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !self.active || text == self.input {
            return;
        }
        self.input = text;
        self.revision += 1;
        self.phase = SessionPhase::Pending;
        self.debounce.submit(&self.input, self.revision);
    }

    pub fn push_char(&mut self, c: char) {
        let mut text = self.input.clone();
        text.push(c);
        self.on_input(text);
    }

    pub fn pop_char(&mut self) {
        let mut text = self.input.clone();
        text.pop();
        self.on_input(text);
    }

    pub fn clear_input(&mut self) {
        self.on_input(String::new());
    }

    /// The debounce window closed; issue the lookup if the text is current.
    pub fn on_query_ready(&mut self, revision: u64, query: SearchQuery) {
        if !self.is_current(revision) {
            debug!(revision, current = self.revision, "Dropping superseded query");
            return;
        }

        self.lookups_issued += 1;
        self.last_lookup = Some(Local::now());
        debug!(revision, input = %query.input, "Geocode lookup issued");

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let candidates = match provider.search(&query).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    // Autocomplete is best effort, show nothing
                    warn!("Geocode lookup for '{}' failed: {}", query.input, e);
                    Vec::new()
                }
            };
            tx.send(Event::Candidates {
                revision,
                candidates,
            })
            .ok();
        });
    }

    /// Applies a lookup result. Returns `false` when the result was stale
    /// and dropped.
    pub fn on_candidates(&mut self, revision: u64, candidates: Vec<Location>) -> bool {
        if !self.is_current(revision) {
            debug!(revision, current = self.revision, "Discarding stale candidates");
            return false;
        }

        debug!(revision, count = candidates.len(), "Candidates listed");
        self.candidates = candidates;
        self.phase = SessionPhase::Listed;
        self.highlighted = if self.candidates.is_empty() { None } else { Some(0) };
        self.sync_preview();
        true
    }

    pub fn highlight_next(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(i) => (i + 1) % self.candidates.len(),
            None => 0,
        });
        self.sync_preview();
    }

    pub fn highlight_previous(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        let last = self.candidates.len() - 1;
        self.highlighted = Some(match self.highlighted {
            Some(i) => i.checked_sub(1).unwrap_or(last),
            None => last,
        });
        self.sync_preview();
    }

    pub fn select_highlighted(&mut self) -> Option<Result<Location>> {
        self.highlighted.map(|i| self.select_candidate(i))
    }

    pub fn select_candidate(&mut self, index: usize) -> Result<Location> {
        let location = match self.candidates.get(index) {
            Some(candidate) => candidate.clone(),
            None => {
                return Err(crate::error::LocateError::InvalidLocation {
                    label: format!("candidate #{}", index),
                    reason: "no such candidate".to_string(),
                })
            }
        };
        let location = self.commit(location)?;
        // Mirror the pick in the search box without starting a new lookup.
        self.input = location.label.clone();
        Ok(location)
    }

    pub fn select_quick_link(&mut self, link: &QuickLink) -> Result<Location> {
        self.commit(link.to_location())
    }

    /// Store first, then the map: both consumers re-derive from the store.
    fn commit(&mut self, location: Location) -> Result<Location> {
        let target = match location.coordinates() {
            Ok(target) => target,
            Err(e) => {
                warn!("Rejected selection: {}", e);
                return Err(e);
            }
        };

        info!("Selected '{}' at ({}, {})", location.label, target.lat, target.lng);
        self.store.update(location.clone());
        self.map.fly_to(target, self.fly_zoom, self.fly_duration);

        // Anything still in flight belongs to the input before the pick.
        self.debounce.cancel();
        self.revision += 1;
        self.phase = SessionPhase::Selected;
        self.map.set_preview(None);

        Ok(location)
    }

    fn is_current(&self, revision: u64) -> bool {
        self.active && revision == self.revision
    }

    fn sync_preview(&mut self) {
        let preview = self.highlighted.and_then(|i| self.candidates.get(i)).cloned();
        self.map.set_preview(preview);
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn candidates(&self) -> &[Location] {
        &self.candidates
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn lookups_issued(&self) -> u64 {
        self.lookups_issued
    }

    pub fn last_lookup(&self) -> Option<DateTime<Local>> {
        self.last_lookup
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn map(&self) -> &MapViewportController<S> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapViewportController<S> {
        &mut self.map
    }
}
