//! Championship schedule payload

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::nullable;

/// A race weekend and its sessions.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Race {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub sessions: Vec<ScheduledSession>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ScheduledSession {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub starts_at: Option<String>,
}

impl ScheduledSession {
    /// Scheduled start, if present and valid RFC 3339.
    pub fn starts_at(&self) -> Option<DateTime<FixedOffset>> {
        self.starts_at.as_deref().and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}
