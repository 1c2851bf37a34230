//! Request/response view state
//!
//! A [`PullView`] tracks one kind of on-demand fetch: whether a request is in
//! flight, the last error, and the last data. Requests are numbered with
//! [`Ticket`]s in the order they are issued; a completion is only applied if
//! no later request has already been applied, so a slow early response can
//! never overwrite a fast later one.

use std::future::Future;

use tracing::debug;

use crate::Result;

/// Issue order of one pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Loading/error/data state for pull requests.
#[derive(Debug, Clone)]
pub struct PullView<T> {
    loading: bool,
    error: Option<String>,
    data: Option<T>,
    issued: u64,
    applied: u64,
}

impl<T> Default for PullView<T> {
    fn default() -> Self {
        Self { loading: false, error: None, data: None, issued: 0, applied: 0 }
    }
}

impl<T> PullView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Mark a request as started and return its ticket.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.loading = true;
        Ticket(self.issued)
    }

    /// Apply the outcome of the request holding `ticket`.
    ///
    /// Returns `false` when the outcome was discarded because a later request
    /// has already been applied. Loading clears once the most recently issued
    /// request completes, whatever its outcome.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<T>) -> bool {
        if ticket.0 == self.issued {
            self.loading = false;
        }

        if ticket.0 < self.applied {
            debug!(ticket = ticket.0, applied = self.applied, "Discarding stale pull result");
            return false;
        }
        self.applied = ticket.0;

        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }

    /// Run one request to completion: begin, await, complete.
    pub async fn run<F>(&mut self, request: F) -> bool
    where
        F: Future<Output = Result<T>>,
    {
        let ticket = self.begin();
        let outcome = request.await;
        self.complete(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimingError;

    #[tokio::test]
    async fn loading_clears_after_success() {
        let mut view = PullView::new();
        assert!(view.run(async { Ok(5) }).await);
        assert!(!view.is_loading());
        assert_eq!(view.data(), Some(&5));
        assert_eq!(view.error(), None);
    }

    #[tokio::test]
    async fn loading_clears_after_failure() {
        let mut view: PullView<u32> = PullView::new();
        view.run(async { Err(TimingError::graphql(["Session not found"])) }).await;
        assert!(!view.is_loading());
        assert_eq!(view.error(), Some("Session not found"));
        assert!(view.data().is_none());
    }

    #[test]
    fn failure_keeps_previous_data() {
        let mut view = PullView::new();
        let first = view.begin();
        view.complete(first, Ok("old"));
        let second = view.begin();
        view.complete(second, Err(TimingError::transport("offline")));
        assert_eq!(view.data(), Some(&"old"));
        assert!(view.error().is_some_and(|e| e.contains("offline")));

        let third = view.begin();
        view.complete(third, Ok("new"));
        assert_eq!(view.error(), None);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut view = PullView::new();
        let slow = view.begin();
        let fast = view.begin();

        assert!(view.complete(fast, Ok("second")));
        assert!(!view.is_loading());
        assert!(!view.complete(slow, Ok("first")));
        assert_eq!(view.data(), Some(&"second"));
        assert!(!view.is_loading());
    }

    #[test]
    fn early_completion_applies_while_later_pending() {
        let mut view = PullView::new();
        let first = view.begin();
        let second = view.begin();

        assert!(view.complete(first, Ok(1)));
        assert!(view.is_loading(), "later request still in flight");
        assert!(view.complete(second, Ok(2)));
        assert_eq!(view.data(), Some(&2));
        assert!(!view.is_loading());
    }
}
