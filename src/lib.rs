//! Live-timing client for a motorsport GraphQL timing service.
//!
//! Pitboard pulls sessions and championship schedules over HTTP, follows a
//! running session over a `graphql-transport-ws` subscription, and turns the
//! payloads into display-ready view models.
//!
//! # Features
//!
//! - **Pull**: one-shot session and schedule queries with loading/error state
//! - **Push**: whole-snapshot subscriptions with reconnect and backoff
//! - **Polling fallback**: the same live view without WebSockets
//! - **View models**: leaderboard, session header and schedule, fully formatted
//!
//! ## Example (live leaderboard)
//!
//! ```rust,no_run
//! use pitboard::{ClientConfig, GapSource, Pitboard, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> pitboard::Result<()> {
//!     let connection = Pitboard::subscribe(&ClientConfig::default(), "7622");
//!     let mut boards = Box::pin(connection.leaderboards(UpdateRate::Max(2), GapSource::Interval));
//!
//!     while let Some(board) = boards.next().await {
//!         for row in &board.rows {
//!             println!("{} {} {}", row.position, row.driver, row.best_lap);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Transport
pub mod client;
pub mod protocol;

// Stream-based live architecture
pub mod connection;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod stream;

// Payloads and views
pub mod schema;
pub mod view;

// Core exports
pub use error::*;
pub use types::*;

pub use client::{GraphQlRequest, HttpTransport, TimingClient, Transport};
pub use config::{ClientConfig, ReconnectPolicy};
pub use connection::LiveConnection;
pub use driver::FeedState;
pub use schema::{Participant, Race, Session};
pub use view::{GapSource, Leaderboard, PullView, ScheduleController, ScheduleView, SessionView};

use std::time::Duration;

/// Unified entry point for timing data.
///
/// Pull requests go through [`TimingClient`]; live feeds are
/// [`LiveConnection`]s that stop when dropped.
///
/// # Examples
///
/// ```rust,no_run
/// use pitboard::{ClientConfig, GapSource, Pitboard};
///
/// #[tokio::main]
/// async fn main() -> pitboard::Result<()> {
///     let view = Pitboard::session(&ClientConfig::default(), "7616", GapSource::BestLapDelta).await?;
///     println!("{} ({} drivers)", view.summary.title, view.summary.driver_count);
///     Ok(())
/// }
/// ```
pub struct Pitboard;

impl Pitboard {
    /// HTTP client for `config`.
    pub fn client(config: &ClientConfig) -> Result<TimingClient> {
        TimingClient::new(config)
    }

    /// Fetch one session and build its view.
    pub async fn session(
        config: &ClientConfig,
        session_id: &str,
        gap_source: GapSource,
    ) -> Result<SessionView> {
        let session = Self::client(config)?.fetch_session(session_id).await?;
        Ok(SessionView::build(&session, gap_source))
    }

    /// Follow a session over the WebSocket subscription.
    pub fn subscribe(config: &ClientConfig, session_id: &str) -> LiveConnection {
        LiveConnection::subscribe(config, session_id)
    }

    /// Follow a session by re-querying it every `period`.
    pub fn poll(config: &ClientConfig, session_id: &str, period: Duration) -> Result<LiveConnection> {
        let client = Self::client(config)?;
        Ok(LiveConnection::poll(client, session_id, period, config.reconnect))
    }

    /// Controller for a championship schedule; call `load` to fetch.
    pub fn schedule(config: &ClientConfig, championship_id: &str) -> Result<ScheduleController> {
        Ok(ScheduleController::new(Self::client(config)?, championship_id))
    }
}
