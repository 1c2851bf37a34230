//! HTTP polling provider

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::Result;
use crate::client::TimingClient;
use crate::provider::Provider;
use crate::schema::Session;

/// Provider that re-issues the leaderboard query on a fixed period.
///
/// Useful where WebSockets are blocked. Each response is a complete snapshot,
/// exactly like a subscription message.
pub struct PollingProvider {
    client: TimingClient,
    session_id: String,
    period: Duration,

    /// Pacing between requests, created on connect
    interval: Option<Interval>,
}

impl PollingProvider {
    pub fn new(client: TimingClient, session_id: impl Into<String>, period: Duration) -> Self {
        Self { client, session_id: session_id.into(), period, interval: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait::async_trait]
impl Provider for PollingProvider {
    async fn connect(&mut self) -> Result<()> {
        let mut pacing = interval(self.period);
        // A slow response must not cause a burst of catch-up requests
        pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(pacing);
        info!(session_id = %self.session_id, period = ?self.period, "Polling session");
        Ok(())
    }

    async fn next_snapshot(&mut self) -> Result<Option<Session>> {
        if let Some(pacing) = self.interval.as_mut() {
            pacing.tick().await;
        }
        let session = self.client.fetch_leaderboard(&self.session_id).await?;
        debug!(participants = session.participants.len(), "Polled snapshot");
        Ok(Some(session))
    }

    async fn close(&mut self) {
        self.interval = None;
    }

    fn describe(&self) -> String {
        format!("polling session {} every {:?}", self.session_id, self.period)
    }
}
