//! Driver spawns and manages the live feed task

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::TimingError;
use crate::config::ReconnectPolicy;
use crate::provider::Provider;
use crate::schema::Session;

/// Lifecycle of a live feed as seen by a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum FeedState {
    /// Opening the feed for the first time
    Connecting,
    /// Feed is open; snapshots flow
    Live,
    /// Waiting to re-open after a failure
    Reconnecting { attempt: u32, last_error: String },
    /// Gave up; the message is shown to the user
    Failed(String),
    /// Server ended the feed, or the view was torn down
    Closed,
}

impl FeedState {
    /// Whether the driver task has stopped for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FeedState::Failed(_) | FeedState::Closed)
    }
}

impl fmt::Display for FeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedState::Connecting => f.write_str("Connecting"),
            FeedState::Live => f.write_str("Live"),
            FeedState::Reconnecting { attempt, last_error } => {
                write!(f, "Reconnecting (attempt {}): {}", attempt, last_error)
            }
            FeedState::Failed(message) => write!(f, "Error: {}", message),
            FeedState::Closed => f.write_str("Closed"),
        }
    }
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Latest snapshot; each message replaces the slot wholesale
    pub snapshots: watch::Receiver<Option<Arc<Session>>>,
    /// Feed lifecycle
    pub state: watch::Receiver<FeedState>,
    /// Cancellation token for teardown
    pub cancel: CancellationToken,
    /// Handle to the task, joined on explicit close
    pub task: JoinHandle<()>,
}

/// What to do after a failure.
enum Recovery {
    Retry,
    Stop,
}

/// Driver spawns and manages the feed task
///
/// The task owns the provider. It connects, forwards snapshots into a
/// single-slot watch channel, and reconnects according to a
/// [`ReconnectPolicy`]. The provider is closed before the task exits.
pub struct Driver;

impl Driver {
    /// Spawn the feed task for the given provider
    pub fn spawn<P>(provider: P, policy: ReconnectPolicy) -> DriverChannels
    where
        P: Provider,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(FeedState::Connecting);
        let cancel = CancellationToken::new();

        let cancel_task = cancel.clone();
        let task = tokio::spawn(async move {
            Self::feed_task(provider, policy, snapshot_tx, state_tx, cancel_task).await;
        });

        DriverChannels { snapshots: snapshot_rx, state: state_rx, cancel, task }
    }

    async fn feed_task<P>(
        mut provider: P,
        policy: ReconnectPolicy,
        snapshot_tx: watch::Sender<Option<Arc<Session>>>,
        state_tx: watch::Sender<FeedState>,
        cancel: CancellationToken,
    ) where
        P: Provider,
    {
        let description = provider.describe();
        info!("Feed task started: {}", description);
        let mut snapshot_count = 0u64;
        let mut failures = 0u32;

        'feed: loop {
            let connected = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Feed cancelled while connecting");
                    break 'feed;
                }
                result = provider.connect() => result,
            };

            if let Err(e) = connected {
                failures += 1;
                match Self::recover(&mut provider, &policy, failures, e, &state_tx, &cancel).await {
                    Recovery::Retry => continue 'feed,
                    Recovery::Stop => break 'feed,
                }
            }
            state_tx.send_replace(FeedState::Live);

            loop {
                let result = tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Feed cancelled");
                        break 'feed;
                    }
                    result = provider.next_snapshot() => result,
                };

                match result {
                    Ok(Some(session)) => {
                        snapshot_count += 1;
                        failures = 0;
                        trace!(
                            "Snapshot {}: session={}, participants={}",
                            snapshot_count,
                            session.id,
                            session.participants.len()
                        );

                        if snapshot_tx.send(Some(Arc::new(session))).is_err() {
                            debug!("Snapshot receivers dropped, shutting down");
                            break 'feed;
                        }
                        if *state_tx.borrow() != FeedState::Live {
                            state_tx.send_replace(FeedState::Live);
                        }
                    }
                    Ok(None) => {
                        info!("Feed ended after {} snapshots", snapshot_count);
                        break 'feed;
                    }
                    Err(e) => {
                        failures += 1;
                        error!("Feed error ({}/{}): {}", failures, policy.max_attempts, e);
                        match Self::recover(&mut provider, &policy, failures, e, &state_tx, &cancel)
                            .await
                        {
                            Recovery::Retry => continue 'feed,
                            Recovery::Stop => break 'feed,
                        }
                    }
                }
            }
        }

        provider.close().await;
        state_tx.send_if_modified(|state| {
            if matches!(state, FeedState::Failed(_)) {
                return false;
            }
            *state = FeedState::Closed;
            true
        });
        info!("Feed task ended (received {} snapshots)", snapshot_count);
    }

    /// Decide whether to reconnect after the `failures`-th consecutive error,
    /// sleeping for the backoff delay when retrying.
    async fn recover<P: Provider>(
        provider: &mut P,
        policy: &ReconnectPolicy,
        failures: u32,
        error: TimingError,
        state_tx: &watch::Sender<FeedState>,
        cancel: &CancellationToken,
    ) -> Recovery {
        provider.close().await;

        let delay = if error.is_retryable() { policy.delay_for(failures) } else { None };
        let Some(delay) = delay else {
            warn!("Giving up on feed: {}", error);
            state_tx.send_replace(FeedState::Failed(error.to_string()));
            return Recovery::Stop;
        };

        info!(attempt = failures, delay = ?delay, "Reconnecting after error: {}", error);
        state_tx.send_replace(FeedState::Reconnecting {
            attempt: failures,
            last_error: error.to_string(),
        });

        tokio::select! {
            _ = cancel.cancelled() => Recovery::Stop,
            _ = tokio::time::sleep(delay) => Recovery::Retry,
        }
    }
}
