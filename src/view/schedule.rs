//! Championship schedule view model

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{GraphQlRequest, TimingClient};
use crate::schema::{Race, ScheduledSession};
use crate::types::PLACEHOLDER;

use super::pull::PullView;

/// Date column value for sessions without a usable start time.
pub const TBA: &str = "TBA";

/// Where a scheduled session stands relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ScheduleStatus {
    Upcoming,
    /// Started within the last hour
    LiveSoon,
    Completed,
}

impl ScheduleStatus {
    /// Classify a start time against `now`.
    pub fn at(starts_at: DateTime<FixedOffset>, now: DateTime<Utc>) -> Self {
        let starts_at = starts_at.with_timezone(&Utc);
        if starts_at > now {
            ScheduleStatus::Upcoming
        } else if starts_at > now - TimeDelta::hours(1) {
            ScheduleStatus::LiveSoon
        } else {
            ScheduleStatus::Completed
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScheduleStatus::Upcoming => "Upcoming",
            ScheduleStatus::LiveSoon => "Live Soon",
            ScheduleStatus::Completed => "Completed",
        }
    }
}

/// One session line under a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ScheduleEntry {
    pub session_id: String,
    pub name: String,
    /// Human date such as `May 8, 2025 9:30 AM`, or `TBA`
    pub starts: String,
    pub status: Option<ScheduleStatus>,
}

impl ScheduleEntry {
    fn from_session(session: &ScheduledSession, now: DateTime<Utc>) -> Self {
        let start = session.starts_at();
        Self {
            session_id: session.id.clone(),
            name: session.name.clone(),
            starts: start.map_or_else(
                || TBA.to_string(),
                |s| s.format("%B %-d, %Y %-I:%M %p").to_string(),
            ),
            status: start.map(|s| ScheduleStatus::at(s, now)),
        }
    }

    /// Status column text, `-` when the start time is unknown.
    pub fn status_label(&self) -> &'static str {
        self.status.map_or(PLACEHOLDER, ScheduleStatus::label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RaceSchedule {
    pub race_id: String,
    pub name: String,
    pub sessions: Vec<ScheduleEntry>,
}

/// What the schedule screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ScheduleView {
    Loading,
    /// The fetch failed; the screen offers a retry
    Failed { message: String },
    /// The championship has no races
    Empty,
    Ready(Vec<RaceSchedule>),
}

impl ScheduleView {
    /// Build the ready/empty view for `races` as of `now`.
    pub fn from_races(races: &[Race], now: DateTime<Utc>) -> Self {
        if races.is_empty() {
            return ScheduleView::Empty;
        }
        ScheduleView::Ready(
            races
                .iter()
                .map(|race| RaceSchedule {
                    race_id: race.id.clone(),
                    name: race.name.clone(),
                    sessions: race
                        .sessions
                        .iter()
                        .map(|s| ScheduleEntry::from_session(s, now))
                        .collect(),
                })
                .collect(),
        )
    }
}

/// Loads a championship schedule and keeps the request around for retries.
pub struct ScheduleController {
    client: TimingClient,
    request: GraphQlRequest,
    state: PullView<Vec<Race>>,
}

impl ScheduleController {
    pub fn new(client: TimingClient, championship_id: &str) -> Self {
        Self {
            client,
            request: GraphQlRequest::schedule(championship_id),
            state: PullView::new(),
        }
    }

    /// Fetch the schedule.
    pub async fn load(&mut self) {
        let client = self.client.clone();
        let request = self.request.clone();
        self.state.run(async move { client.execute_schedule(&request).await }).await;
    }

    /// Re-issue the identical request after a failure.
    pub async fn retry(&mut self) {
        info!("Retrying schedule request");
        self.load().await;
    }

    pub fn request(&self) -> &GraphQlRequest {
        &self.request
    }

    /// Current view as of `now`. An error takes precedence over stale data.
    pub fn view(&self, now: DateTime<Utc>) -> ScheduleView {
        if self.state.is_loading() {
            return ScheduleView::Loading;
        }
        if let Some(message) = self.state.error() {
            return ScheduleView::Failed { message: message.to_string() };
        }
        match self.state.data() {
            Some(races) => ScheduleView::from_races(races, now),
            None => ScheduleView::Loading,
        }
    }
}
