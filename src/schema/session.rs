//! Session payload
//!
//! A session arrives whole on every query response and every subscription
//! message. Everything except the identifier is optional so that the smaller
//! query documents, which select fewer fields, decode into the same type.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::nullable;
use super::participant::Participant;
use crate::types::{SessionFlags, SessionStatus};

/// One timed track activity with its live status and roster.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Session {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Parent race (event) the session belongs to
    pub race: Option<RaceRef>,
    /// Scheduled start, RFC 3339
    pub starts_at: Option<String>,
    /// Planned duration in seconds
    pub duration: Option<f64>,
    /// Session-level closed marker (selected by the sector flags fragment)
    pub closed: Option<bool>,
    pub chrono_type: Option<String>,
    pub live_status: Option<LiveStatus>,
    pub weather: Option<Weather>,
    #[serde(deserialize_with = "nullable")]
    pub sector_flags: Vec<SectorFlag>,
    #[serde(deserialize_with = "nullable")]
    pub participants: Vec<Participant>,
}

/// Reference to the event a session belongs to.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RaceRef {
    pub id: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
}

/// Live state of the session clock and flags.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct LiveStatus {
    pub is_closed: Option<bool>,
    pub is_session_running: Option<bool>,
    pub session_start_time: Option<String>,
    pub has_chequered_flag: Option<bool>,
    pub current_flag: Option<TrackFlag>,
    pub stopped_seconds: Option<f64>,
    pub final_duration_seconds: Option<f64>,
}

/// A flag shown on track or in a sector.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackFlag {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Flag currently displayed in one sector.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SectorFlag {
    pub sector: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Weather snapshot.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Weather {
    pub ambient_temperature_ex: Option<Temperature>,
    pub track_temperature_ex: Option<Temperature>,
    pub humidity_percent: Option<f64>,
}

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Temperature {
    pub celsius_degrees: Option<f64>,
}

impl Weather {
    pub fn ambient_celsius(&self) -> Option<f64> {
        self.ambient_temperature_ex.and_then(|t| t.celsius_degrees)
    }

    pub fn track_celsius(&self) -> Option<f64> {
        self.track_temperature_ex.and_then(|t| t.celsius_degrees)
    }
}

impl Session {
    /// Status-relevant flags, `None` when the payload has no live status.
    ///
    /// The chequered flag and the session-level `closed` marker both count as
    /// closed, so query and subscription payloads resolve identically.
    pub fn flags(&self) -> Option<SessionFlags> {
        let live = self.live_status.as_ref()?;
        Some(SessionFlags {
            closed: live.is_closed.unwrap_or(false)
                || live.has_chequered_flag.unwrap_or(false)
                || self.closed.unwrap_or(false),
            running: live.is_session_running.unwrap_or(false),
            has_start_time: live
                .session_start_time
                .as_deref()
                .is_some_and(|start| !start.trim().is_empty()),
        })
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::resolve(self.flags())
    }

    pub fn has_chequered_flag(&self) -> bool {
        self.live_status.as_ref().and_then(|l| l.has_chequered_flag).unwrap_or(false)
    }

    pub fn race_name(&self) -> Option<&str> {
        self.race.as_ref().map(|r| r.name.as_str()).filter(|n| !n.is_empty())
    }

    pub fn current_flag(&self) -> Option<&str> {
        self.live_status.as_ref()?.current_flag.as_ref()?.kind.as_deref()
    }

    /// Scheduled start, if present and valid RFC 3339.
    pub fn starts_at(&self) -> Option<DateTime<FixedOffset>> {
        self.starts_at.as_deref().and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}
