//! Participant payload
//!
//! One competitor entry within a session, identified by car number.

use serde::{Deserialize, Serialize};

use super::nullable;
use crate::types::ParticipantFlags;

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Participant {
    pub id: Option<String>,
    /// Car number as printed on the car
    #[serde(deserialize_with = "nullable")]
    pub number: String,
    /// 1-based overall position
    pub position: Option<u32>,
    pub position_in_category: Option<u32>,
    pub is_out: Option<bool>,
    pub has_seen_checkered_flag: Option<bool>,
    pub complete_laps_count: Option<u32>,
    pub pit_stop_count: Option<u32>,
    #[serde(rename = "bestTopSpeedKMH")]
    pub best_top_speed_kmh: Option<f64>,
    pub last_lap: Option<Lap>,
    pub best_lap: Option<Lap>,
    #[serde(deserialize_with = "nullable")]
    pub last_completed_sectors: Vec<SectorTime>,
    pub previous_participant_gap: Option<ParticipantGap>,
    pub driver: Option<Driver>,
    pub team: Option<Team>,
    pub category: Option<Category>,
    pub tires: Option<Tires>,
}

/// A timed lap.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Lap {
    pub time_milliseconds: Option<i64>,
    /// Lap quality marker (personal best, overall best, ...)
    pub state: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SectorTime {
    pub lap_time: Option<i64>,
    pub state: Option<String>,
}

/// Gap to the car ahead as computed by the timing service.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ParticipantGap {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub lap_difference: Option<i64>,
    pub time_milliseconds: Option<i64>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Driver {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<Country>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Country {
    pub iso_code2: Option<String>,
    pub name: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Team {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Class the car competes in; `color` is a CSS colour string.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Category {
    pub id: Option<String>,
    pub color: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tires {
    pub label: Option<String>,
}

impl Participant {
    pub fn flags(&self) -> ParticipantFlags {
        ParticipantFlags {
            seen_checkered_flag: self.has_seen_checkered_flag.unwrap_or(false),
            is_out: self.is_out.unwrap_or(false),
        }
    }

    pub fn last_lap_millis(&self) -> Option<i64> {
        self.last_lap.as_ref().and_then(|lap| lap.time_milliseconds)
    }

    pub fn best_lap_millis(&self) -> Option<i64> {
        self.best_lap.as_ref().and_then(|lap| lap.time_milliseconds)
    }

    /// Driver's display name, `-` standing in for each missing half.
    pub fn driver_name(&self) -> String {
        let driver = self.driver.as_ref();
        let first = driver.and_then(|d| d.first_name.as_deref()).unwrap_or("-");
        let last = driver.and_then(|d| d.last_name.as_deref()).unwrap_or("-");
        format!("{} {}", first, last)
    }

    pub fn team_name(&self) -> Option<&str> {
        self.team.as_ref()?.name.as_deref()
    }

    pub fn country(&self) -> Option<&Country> {
        self.driver.as_ref()?.country.as_ref()
    }

    pub fn category_color(&self) -> Option<&str> {
        self.category.as_ref()?.color.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_subscription_participant() {
        let participant: Participant = serde_json::from_value(json!({
            "id": "p1",
            "number": "7",
            "position": 2,
            "isOut": false,
            "hasSeenCheckeredFlag": false,
            "completeLapsCount": 31,
            "pitStopCount": 1,
            "bestTopSpeedKMH": 287.4,
            "lastLap": { "timeMilliseconds": 125_004, "state": "NORMAL" },
            "bestLap": { "timeMilliseconds": 123_876, "state": "PERSONAL_BEST" },
            "previousParticipantGap": { "type": "TIME", "lapDifference": 0, "timeMilliseconds": 1_250 },
            "driver": { "firstName": "Ana", "lastName": "Silva", "country": { "isoCode2": "PT" } },
            "team": { "name": "Porto Motorsport" },
            "category": { "id": "c1", "color": "#ff0000" },
            "tires": { "label": "S" },
            "__typename": "SessionParticipant"
        }))
        .unwrap();

        assert_eq!(participant.position, Some(2));
        assert_eq!(participant.best_lap_millis(), Some(123_876));
        assert_eq!(participant.driver_name(), "Ana Silva");
        assert_eq!(participant.team_name(), Some("Porto Motorsport"));
        assert_eq!(participant.category_color(), Some("#ff0000"));
        assert_eq!(participant.best_top_speed_kmh, Some(287.4));
    }

    #[test]
    fn missing_names_use_placeholders() {
        let participant: Participant = serde_json::from_value(json!({
            "number": "12",
            "driver": { "firstName": null, "lastName": "Lee" }
        }))
        .unwrap();
        assert_eq!(participant.driver_name(), "- Lee");
        assert_eq!(Participant::default().driver_name(), "- -");
        assert_eq!(participant.flags(), ParticipantFlags::default());
    }
}
