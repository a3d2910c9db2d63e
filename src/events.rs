//! Event types and the main event loop driver for the locate TUI.
//!
//! This module defines the [`Event`] enum and the [`EventHandler`], which
//! runs a background task that polls crossterm for key events and emits
//! periodic [`Event::Tick`]s. Every asynchronous completion in the app (a
//! debounce timer firing, a geocoder response, the quick-links load, the
//! geolocation fix) is posted to the same channel, so all state changes are
//! applied one at a time by the main loop in `main.rs`.

use crate::models::{LatLng, Location, QuickLink, SearchQuery};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick used to advance map animations and redraw.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// The search input has been quiet for the debounce window.
    QueryReady {
        /// Input revision the query was taken from.
        revision: u64,
        query: SearchQuery,
    },
    /// A geocoder lookup finished. Failed lookups arrive as an empty list.
    Candidates {
        /// Input revision the lookup was issued for.
        revision: u64,
        candidates: Vec<Location>,
    },
    /// The quick-links list finished loading (empty on failure).
    QuickLinksLoaded(Vec<QuickLink>),
    /// The host reported the user's live position.
    LocationFound(LatLng),
    /// Live position is unavailable; payload is the reason.
    LocationError(String),
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// Holds an unbounded channel: the sender ([`tx`](EventHandler::tx)) can be
/// cloned and given to other tasks, while the receiver is consumed by
/// [`next`](EventHandler::next) in the main loop.
pub struct EventHandler {
    /// Sender for posting events from background tasks.
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The task polls crossterm with a timeout of `tick_rate_ms`; when a key
    /// is pressed it sends [`Event::Input`], and when the tick interval
    /// elapses it sends [`Event::Tick`]. It stops when the terminal can no
    /// longer be read or the receiver is gone.
    ///
    /// # Arguments
    ///
    /// * `tick_rate_ms` - Interval in milliseconds between [`Event::Tick`] emissions.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        // crossterm's poll blocks, keep it off the async workers
        tokio::task::spawn_blocking(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));

                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            if event_tx.send(Event::Input(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
