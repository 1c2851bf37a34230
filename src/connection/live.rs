//! Live session connection

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::TimingClient;
use crate::config::{ClientConfig, ReconnectPolicy};
use crate::driver::{Driver, FeedState};
use crate::provider::Provider;
use crate::providers::{PollingProvider, SubscriptionProvider};
use crate::schema::Session;
use crate::stream::ThrottleExt;
use crate::types::UpdateRate;
use crate::view::{GapSource, Leaderboard};

/// Live connection to one session's timing feed
///
/// Holds the receiving ends of the driver's channels. The feed runs for as
/// long as this handle lives; dropping it cancels the driver task, which
/// completes the subscription and closes the socket.
pub struct LiveConnection {
    /// Snapshot watch receiver
    snapshots: watch::Receiver<Option<Arc<Session>>>,

    /// Feed state watch receiver
    state: watch::Receiver<FeedState>,

    /// Cancellation token for stopping the driver
    cancel: CancellationToken,

    task: Option<JoinHandle<()>>,
}

impl LiveConnection {
    /// Subscribe to a session over the WebSocket endpoint in `config`.
    ///
    /// Returns immediately; the feed connects in the background and
    /// [`state`](Self::state) reports progress.
    pub fn subscribe(config: &ClientConfig, session_id: &str) -> Self {
        info!(session_id, endpoint = %config.ws_endpoint, "Subscribing to live timing");
        let provider = SubscriptionProvider::new(config, session_id);
        Self::from_provider(provider, config.reconnect)
    }

    /// Follow a session by re-querying it every `period`.
    pub fn poll(
        client: TimingClient,
        session_id: &str,
        period: Duration,
        policy: ReconnectPolicy,
    ) -> Self {
        info!(session_id, period = ?period, "Polling live timing");
        Self::from_provider(PollingProvider::new(client, session_id, period), policy)
    }

    /// Run any provider under the driver.
    pub fn from_provider<P: Provider>(provider: P, policy: ReconnectPolicy) -> Self {
        let channels = Driver::spawn(provider, policy);
        Self {
            snapshots: channels.snapshots,
            state: channels.state,
            cancel: channels.cancel,
            task: Some(channels.task),
        }
    }

    /// Stream of snapshots, starting with the current one if any.
    ///
    /// Waits while no snapshot has arrived yet and ends when the driver task
    /// exits.
    pub fn snapshots(&self) -> impl Stream<Item = Arc<Session>> + 'static {
        WatchStream::new(self.snapshots.clone()).filter_map(|opt| async move { opt })
    }

    /// Leaderboards built from the snapshot stream at most at `rate`.
    pub fn leaderboards(
        &self,
        rate: UpdateRate,
        gap_source: GapSource,
    ) -> impl Stream<Item = Leaderboard> + 'static {
        let snapshots = self.snapshots();
        match rate.throttle_interval() {
            None => snapshots.map(move |s| Leaderboard::build(&s, gap_source)).boxed(),
            Some(interval) => snapshots
                .throttle(interval)
                .map(move |s| Leaderboard::build(&s, gap_source))
                .boxed(),
        }
    }

    /// Latest snapshot, if any has arrived.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.snapshots.borrow().clone()
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Stream of feed state changes, starting with the current state.
    pub fn state_updates(&self) -> impl Stream<Item = FeedState> + 'static {
        WatchStream::new(self.state.clone())
    }

    /// Wait until the feed has stopped for good and return its final state.
    pub async fn finished(&self) -> FeedState {
        let mut state = self.state.clone();
        let finished = match state.wait_for(FeedState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        finished
    }

    /// Stop the feed and wait for the driver to release the provider.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Feed task did not shut down cleanly: {}", e);
            }
        }
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        debug!("Dropping live connection");
        self.cancel.cancel();
    }
}
