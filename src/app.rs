use crate::api::GeocodeProvider;
use crate::error::Result;
use crate::events::Event;
use crate::map::TerminalMap;
use crate::models::{Location, QuickLink};
use crate::sync::SearchSynchronizer;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tracing::debug;

// Which panel receives keys
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum Focus {
    #[default]
    Search,
    QuickLinks,
}

pub struct App<P: GeocodeProvider> {
    pub focus: Focus,
    pub search: SearchSynchronizer<P, TerminalMap>,
    pub quick_links: Vec<QuickLink>,
    pub quick_links_loaded: bool,
    pub quick_link_index: usize,
    pub status: Option<String>,
    pub tick_count: usize,
    pub should_quit: bool,
}

impl<P: GeocodeProvider> App<P> {
    pub fn new(search: SearchSynchronizer<P, TerminalMap>) -> Self {
        Self {
            focus: Focus::Search,
            search,
            quick_links: Vec::new(),
            quick_links_loaded: false,
            quick_link_index: 0,
            status: None,
            tick_count: 0,
            should_quit: false,
        }
    }

    /// Applies one event from the loop. Every state change goes through here.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Tick => self.on_tick(),
            Event::Input(key) => self.handle_key(key),
            Event::QueryReady { revision, query } => self.search.on_query_ready(revision, query),
            Event::Candidates {
                revision,
                candidates,
            } => {
                self.search.on_candidates(revision, candidates);
            }
            Event::QuickLinksLoaded(links) => {
                debug!("{} quick links available", links.len());
                self.quick_links = links;
                self.quick_links_loaded = true;
                self.quick_link_index = 0;
            }
            Event::LocationFound(position) => self.search.map_mut().on_location_found(position),
            Event::LocationError(reason) => self.search.map_mut().on_location_error(&reason),
        }
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;
        self.search.map_mut().surface_mut().advance(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Search => Focus::QuickLinks,
                    Focus::QuickLinks => Focus::Search,
                };
                return;
            }
            KeyCode::PageUp => {
                self.zoom(1.0);
                return;
            }
            KeyCode::PageDown => {
                self.zoom(-1.0);
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::QuickLinks => self.handle_quick_links_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.search.push_char(c),
            KeyCode::Backspace => self.search.pop_char(),
            KeyCode::Esc => self.search.clear_input(),
            KeyCode::Down => self.search.highlight_next(),
            KeyCode::Up => self.search.highlight_previous(),
            KeyCode::Enter => {
                if let Some(result) = self.search.select_highlighted() {
                    self.report_selection(result);
                }
            }
            _ => {}
        }
    }

    fn handle_quick_links_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('+') => self.zoom(1.0),
            KeyCode::Char('-') => self.zoom(-1.0),
            KeyCode::Esc => self.focus = Focus::Search,
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.quick_links.is_empty() {
                    self.quick_link_index = (self.quick_link_index + 1) % self.quick_links.len();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.quick_links.is_empty() {
                    self.quick_link_index = self
                        .quick_link_index
                        .checked_sub(1)
                        .unwrap_or(self.quick_links.len() - 1);
                }
            }
            KeyCode::Enter => {
                if let Some(link) = self.quick_links.get(self.quick_link_index).cloned() {
                    let result = self.search.select_quick_link(&link);
                    self.report_selection(result);
                }
            }
            _ => {}
        }
    }

    /// Index of the quick link matching the stored selection, if any.
    pub fn selected_quick_link(&self) -> Option<usize> {
        let current = self.search.store().get()?;
        self.quick_links
            .iter()
            .position(|link| link.to_location() == current)
    }

    fn report_selection(&mut self, result: Result<Location>) {
        self.status = Some(match result {
            Ok(location) => format!("Selected {}", location.label),
            Err(e) => e.to_string(),
        });
    }

    fn zoom(&mut self, delta: f64) {
        self.search.map_mut().surface_mut().zoom_by(delta);
    }

    fn quit(&mut self) {
        self.search.shutdown();
        self.should_quit = true;
    }
}
