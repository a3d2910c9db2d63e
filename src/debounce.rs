//! Trailing-edge debounce for search input.
//!
//! [`DebouncedQueryChannel`] keeps a single pending timer. Each
//! [`submit`](DebouncedQueryChannel::submit) aborts the previous timer and
//! starts a new one, so only the last text typed inside the quiet window is
//! posted to the event loop as [`Event::QueryReady`]. Dropping the channel (or
//! calling [`cancel`](DebouncedQueryChannel::cancel)) discards the timer
//! without firing it.

use crate::events::Event;
use crate::models::SearchQuery;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

pub struct DebouncedQueryChannel {
    window: Duration,
    tx: mpsc::UnboundedSender<Event>,
    pending: Option<JoinHandle<()>>,
}

impl DebouncedQueryChannel {
    pub fn new(window: Duration, tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            window,
            tx,
            pending: None,
        }
    }

    /// Schedules `input` to be emitted once the window passes quietly.
    ///
    /// `revision` is echoed back with the event so the receiver can tell
    /// whether the query still matches the current input.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, input: &str, revision: u64) {
        self.cancel();

        let tx = self.tx.clone();
        let window = self.window;
        let query = SearchQuery::new(input);
        trace!(revision, "Debounce timer (re)started");

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            tx.send(Event::QueryReady { revision, query }).ok();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DebouncedQueryChannel {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (DebouncedQueryChannel, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (DebouncedQueryChannel::new(Duration::from_millis(400), tx), rx)
    }

    fn expect_query(event: Option<Event>) -> (u64, SearchQuery) {
        match event {
            Some(Event::QueryReady { revision, query }) => (revision, query),
            _ => panic!("expected a QueryReady event"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_last_value() {
        let (mut debounce, mut rx) = channel();

        for (i, text) in ["M", "Ma", "May", "Mayb", "Maybank"].iter().enumerate() {
            debounce.submit(text, i as u64 + 1);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let (revision, query) = expect_query(rx.recv().await);
        assert_eq!(revision, 5);
        assert_eq!(query.input, "Maybank");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn new_input_resets_the_window() {
        let (mut debounce, mut rx) = channel();

        debounce.submit("a", 1);
        tokio::time::sleep(Duration::from_millis(300)).await;
        debounce.submit("ab", 2);
        tokio::time::sleep(Duration::from_millis(300)).await;

        // 600ms after the first call but only 300ms after the last.
        assert!(rx.try_recv().is_err());
        assert!(debounce.is_pending());

        let (revision, query) = expect_query(rx.recv().await);
        assert_eq!(revision, 2);
        assert_eq!(query.input, "ab");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_timer() {
        let (mut debounce, mut rx) = channel();

        debounce.submit("Raffles", 1);
        debounce.cancel();
        assert!(!debounce.is_pending());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_discards_pending_timer() {
        let (mut debounce, mut rx) = channel();

        debounce.submit("Raffles", 1);
        drop(debounce);

        // Every sender is gone once the aborted task is cleaned up.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.recv().await.is_none());
    }
}
