//! Provider trait for snapshot sources

use crate::Result;
use crate::schema::Session;

/// Trait for live session sources
///
/// Providers abstract over how snapshots arrive (WebSocket subscription or
/// HTTP polling) and handle their own pacing. The [`Driver`](crate::driver::Driver)
/// owns a provider and calls `connect` again after failures, so every method
/// must tolerate being called on a provider that has been closed.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Open (or re-open) the feed.
    async fn connect(&mut self) -> Result<()>;

    /// Wait for the next complete session snapshot
    ///
    /// Returns:
    /// - `Ok(Some(session))` - New snapshot, replaces the previous one
    /// - `Ok(None)` - Feed ended normally (server completed the subscription)
    /// - `Err(e)` - Feed failed; the driver may reconnect
    async fn next_snapshot(&mut self) -> Result<Option<Session>>;

    /// Release the feed. Must be safe to call when not connected.
    async fn close(&mut self);

    /// Short description for logs
    fn describe(&self) -> String;
}
