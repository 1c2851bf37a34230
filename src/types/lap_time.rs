//! Lap-time formatting
//!
//! Timing payloads carry durations as integer milliseconds. A zero, missing
//! or negative value means "no time recorded" and is rendered with a fixed
//! sentinel so table columns keep their width.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TimingError;

/// Rendered in place of a lap time when none is recorded.
pub const NO_TIME: &str = "--:--.---";

/// A validated, non-negative lap duration in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(transparent)]
pub struct LapTime(u64);

impl LapTime {
    /// Create a lap time from milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Duration in milliseconds.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Whether this duration counts as "no time recorded".
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Split into whole minutes, seconds within the minute, and milliseconds.
    pub const fn components(self) -> (u64, u64, u64) {
        let total_seconds = self.0 / 1000;
        (total_seconds / 60, total_seconds % 60, self.0 % 1000)
    }

    /// Difference to an earlier (faster) lap, `None` when `other` is slower.
    pub fn delta_from(self, other: LapTime) -> Option<LapTime> {
        self.0.checked_sub(other.0).map(LapTime)
    }
}

impl TryFrom<i64> for LapTime {
    type Error = TimingError;

    fn try_from(millis: i64) -> Result<Self, Self::Error> {
        u64::try_from(millis).map(LapTime).map_err(|_| TimingError::InvalidLapTime { millis })
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            return f.write_str(NO_TIME);
        }
        let (minutes, seconds, millis) = self.components();
        write!(f, "{}:{:02}.{:03}", minutes, seconds, millis)
    }
}

/// Format optional raw milliseconds as `M:SS.mmm`.
///
/// `None`, zero and negative inputs all produce [`NO_TIME`].
pub fn format_lap_time(millis: Option<i64>) -> String {
    millis
        .and_then(|ms| LapTime::try_from(ms).ok())
        .map(|lap| lap.to_string())
        .unwrap_or_else(|| NO_TIME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sentinel_for_missing_values() {
        assert_eq!(format_lap_time(None), NO_TIME);
        assert_eq!(format_lap_time(Some(0)), NO_TIME);
        assert_eq!(format_lap_time(Some(-1)), NO_TIME);
        assert_eq!(format_lap_time(Some(i64::MIN)), NO_TIME);
    }

    #[test]
    fn formats_known_values() {
        assert_eq!(format_lap_time(Some(65432)), "1:05.432");
        assert_eq!(format_lap_time(Some(1)), "0:00.001");
        assert_eq!(format_lap_time(Some(59_999)), "0:59.999");
        assert_eq!(format_lap_time(Some(60_000)), "1:00.000");
        assert_eq!(format_lap_time(Some(3_660_000)), "61:00.000");
    }

    #[test]
    fn negative_input_is_a_typed_error() {
        let err = LapTime::try_from(-250).unwrap_err();
        assert!(matches!(err, TimingError::InvalidLapTime { millis: -250 }));
    }

    #[test]
    fn delta_requires_slower_lap() {
        let leader = LapTime::from_millis(90_000);
        let chaser = LapTime::from_millis(90_750);
        assert_eq!(chaser.delta_from(leader), Some(LapTime::from_millis(750)));
        assert_eq!(leader.delta_from(chaser), None);
    }

    proptest! {
        #[test]
        fn formatted_time_reconstructs_input(ms in 1i64..10_000_000i64) {
            let text = format_lap_time(Some(ms));
            let (minutes, rest) = text.split_once(':').expect("minute separator");
            let (seconds, millis) = rest.split_once('.').expect("millisecond separator");

            prop_assert_eq!(seconds.len(), 2);
            prop_assert_eq!(millis.len(), 3);

            let minutes: i64 = minutes.parse().unwrap();
            let seconds: i64 = seconds.parse().unwrap();
            let millis: i64 = millis.parse().unwrap();
            prop_assert!(seconds < 60);
            prop_assert_eq!(minutes * 60_000 + seconds * 1000 + millis, ms);
        }

        #[test]
        fn negative_inputs_never_render_a_minus(ms in i64::MIN..0i64) {
            prop_assert_eq!(format_lap_time(Some(ms)), NO_TIME);
        }
    }
}
