//! Session header view model

use serde::{Deserialize, Serialize};

use crate::schema::Session;
use crate::types::{PLACEHOLDER, SessionStatus};

use super::leaderboard::{GapSource, Leaderboard};

/// Header shown above a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SessionSummary {
    pub session_id: String,
    /// `"<race> - <session>"`, or just the session name without a race
    pub title: String,
    pub status: SessionStatus,
    pub chequered_flag: bool,
    pub driver_count: usize,
    /// Track flag, `-` when unknown
    pub flag: String,
    /// Ambient temperature such as `22°C`, `-` when unknown
    pub ambient: String,
    pub track: String,
}

impl SessionSummary {
    pub fn from_session(session: &Session) -> Self {
        let name = if session.name.is_empty() { PLACEHOLDER } else { session.name.as_str() };
        let title = match session.race_name() {
            Some(race) => format!("{} - {}", race, name),
            None => name.to_string(),
        };
        let weather = session.weather.as_ref();

        Self {
            session_id: session.id.clone(),
            title,
            status: session.status(),
            chequered_flag: session.has_chequered_flag(),
            driver_count: session.participants.len(),
            flag: session.current_flag().unwrap_or(PLACEHOLDER).to_string(),
            ambient: celsius(weather.and_then(|w| w.ambient_celsius())),
            track: celsius(weather.and_then(|w| w.track_celsius())),
        }
    }

    /// Caption for the standings table.
    pub fn caption(&self) -> &'static str {
        if self.status == SessionStatus::Completed {
            "Final Results"
        } else {
            "Real-time lap times and performance metrics"
        }
    }
}

fn celsius(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |c| format!("{}°C", c))
}

/// Everything one session screen shows: header plus standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SessionView {
    pub summary: SessionSummary,
    pub leaderboard: Leaderboard,
}

impl SessionView {
    pub fn build(session: &Session, gap_source: GapSource) -> Self {
        Self {
            summary: SessionSummary::from_session(session),
            leaderboard: Leaderboard::build(session, gap_source),
        }
    }
}
