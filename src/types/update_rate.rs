//! Update rate control for snapshot streams

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Update rate for snapshot streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum UpdateRate {
    /// Every snapshot as it arrives
    Native,

    /// At most this many snapshots per second, latest wins
    Max(u32),
}

impl UpdateRate {
    /// Minimum spacing between emitted snapshots, if throttled.
    ///
    /// `Max(0)` is treated as `Native`.
    pub fn throttle_interval(self) -> Option<Duration> {
        match self {
            UpdateRate::Native | UpdateRate::Max(0) => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }

    /// Build from an optional Hz value as accepted on the command line.
    pub fn from_hz(hz: Option<u32>) -> Self {
        match hz {
            Some(hz) if hz > 0 => UpdateRate::Max(hz),
            _ => UpdateRate::Native,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_interval_matches_rate() {
        assert_eq!(UpdateRate::Native.throttle_interval(), None);
        assert_eq!(UpdateRate::Max(0).throttle_interval(), None);
        assert_eq!(UpdateRate::Max(4).throttle_interval(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn from_hz_ignores_zero() {
        assert_eq!(UpdateRate::from_hz(None), UpdateRate::Native);
        assert_eq!(UpdateRate::from_hz(Some(0)), UpdateRate::Native);
        assert_eq!(UpdateRate::from_hz(Some(2)), UpdateRate::Max(2));
    }
}
