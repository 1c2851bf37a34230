//! Leaderboard view model
//!
//! Turns one session snapshot into display-ready rows. Every cell is already
//! formatted, with placeholders standing in for missing data, so renderers
//! never deal with `Option`.

use serde::{Deserialize, Serialize};

use crate::schema::{Participant, ParticipantGap, Session};
use crate::types::{
    LapTime, NO_TIME, PLACEHOLDER, ParticipantStatus, SessionStatus, country_flag, format_lap_time,
};

/// Where the gap column's value comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum GapSource {
    /// Best lap minus the leader's best lap
    #[default]
    BestLapDelta,
    /// Server-computed gap to the car ahead
    Interval,
}

/// One formatted leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LeaderboardRow {
    /// Position as reported, `-` when the service has none
    pub position: String,
    pub number: String,
    pub driver: String,
    /// Flag emoji, else country name, else `-`
    pub country: String,
    pub team: String,
    pub status: ParticipantStatus,
    pub laps: String,
    pub last_lap: String,
    pub best_lap: String,
    pub gap: String,
    pub pit_stops: String,
    pub category_color: Option<String>,
}

/// Ordered, formatted standings for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Leaderboard {
    pub session_id: String,
    pub session_status: SessionStatus,
    pub gap_source: GapSource,
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    /// Build the leaderboard for `session`.
    ///
    /// Rows are ordered by position ascending. The sort is stable, so ties
    /// and unpositioned cars keep the order the service sent them in, with
    /// unpositioned cars last. The first row after ordering is the leader.
    pub fn build(session: &Session, gap_source: GapSource) -> Self {
        let session_status = session.status();

        let mut ordered: Vec<&Participant> = session.participants.iter().collect();
        ordered.sort_by_key(|p| p.position.unwrap_or(u32::MAX));

        let leader_best = ordered.first().and_then(|p| p.best_lap_millis());
        let rows = ordered
            .iter()
            .enumerate()
            .map(|(index, participant)| {
                let gap = if index == 0 {
                    PLACEHOLDER.to_string()
                } else {
                    match gap_source {
                        GapSource::BestLapDelta => {
                            best_lap_delta(participant.best_lap_millis(), leader_best)
                        }
                        GapSource::Interval => {
                            interval_gap(participant.previous_participant_gap.as_ref())
                        }
                    }
                };
                Self::row(participant, session_status, gap)
            })
            .collect();

        Self { session_id: session.id.clone(), session_status, gap_source, rows }
    }

    fn row(participant: &Participant, session_status: SessionStatus, gap: String) -> LeaderboardRow {
        let country = participant.country();
        let country = country
            .and_then(|c| c.iso_code2.as_deref())
            .and_then(country_flag)
            .or_else(|| country.and_then(|c| c.name.clone()))
            .unwrap_or_else(|| PLACEHOLDER.to_string());

        LeaderboardRow {
            position: display_or_placeholder(participant.position),
            number: participant.number.clone(),
            driver: participant.driver_name(),
            country,
            team: participant.team_name().unwrap_or(PLACEHOLDER).to_string(),
            status: ParticipantStatus::resolve(participant.flags(), session_status),
            laps: display_or_placeholder(participant.complete_laps_count),
            last_lap: format_lap_time(participant.last_lap_millis()),
            best_lap: format_lap_time(participant.best_lap_millis()),
            gap,
            pit_stops: display_or_placeholder(participant.pit_stop_count),
            category_color: participant.category_color().map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

fn display_or_placeholder<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// `+M:SS.mmm` behind the leader's best lap, or the sentinel when either
/// time is missing or the difference is not positive.
pub fn best_lap_delta(best: Option<i64>, leader_best: Option<i64>) -> String {
    let delta = best
        .zip(leader_best)
        .and_then(|(best, leader)| {
            let best = LapTime::try_from(best).ok()?;
            best.delta_from(LapTime::try_from(leader).ok()?)
        })
        .filter(|delta| !delta.is_unset());

    match delta {
        Some(delta) => format!("+{}", delta),
        None => NO_TIME.to_string(),
    }
}

/// Render the server-supplied gap to the car ahead.
///
/// A positive lap difference renders as `+N Lap`/`+N Laps`; otherwise the
/// time component renders as `+M:SS.mmm`. No gap at all renders `-`.
pub fn interval_gap(gap: Option<&ParticipantGap>) -> String {
    let Some(gap) = gap else {
        return PLACEHOLDER.to_string();
    };

    match gap.lap_difference {
        Some(1) => "+1 Lap".to_string(),
        Some(laps) if laps > 1 => format!("+{} Laps", laps),
        _ => match gap.time_milliseconds {
            Some(millis) if millis > 0 => format!("+{}", format_lap_time(Some(millis))),
            Some(_) => NO_TIME.to_string(),
            None => PLACEHOLDER.to_string(),
        },
    }
}
