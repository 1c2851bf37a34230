//! GraphQL documents sent to the timing service

/// Compact session query used by the session (search) view.
pub const SESSION_QUERY: &str = r#"query Session($sessionId: ID!) {
  session(sessionId: $sessionId) {
    id
    name
    race { name }
    liveStatus {
      isClosed
      isSessionRunning
      sessionStartTime
      hasChequeredFlag
    }
    participants {
      number
      position
      hasSeenCheckeredFlag
      driver { firstName lastName }
      team { name }
      lastLap { timeMilliseconds }
      bestLap { timeMilliseconds }
    }
  }
}"#;

/// Full leaderboard document.
///
/// Sent as a subscription over WebSocket, and with the leading keyword
/// swapped to `query` (see [`leaderboard_query`]) by the polling provider.
pub const SESSION_SUBSCRIPTION: &str = r#"subscription Session($sessionId: ID!, $filters: SessionParticipantsFilters, $realTime: Boolean!) {
  session(sessionId: $sessionId) {
    id
    name
    startsAt
    duration
    closed
    chronoType
    liveStatus {
      sessionStartTime
      currentFlag { type }
      isSessionRunning
      stoppedSeconds
      finalDurationSeconds
      hasChequeredFlag
    }
    sectorFlags { sector type }
    weather {
      ambientTemperatureEx { celsiusDegrees }
      humidityPercent
      trackTemperatureEx { celsiusDegrees }
    }
    participants(filters: $filters) {
      id
      number
      position
      positionInCategory
      isOut
      hasSeenCheckeredFlag
      completeLapsCount
      pitStopCount
      bestTopSpeedKMH
      category { id color }
      team { id name }
      driver { firstName lastName country { isoCode2 } }
      tires @skip(if: $realTime) { label }
      previousParticipantGap { type lapDifference timeMilliseconds }
      lastCompletedSectors { lapTime state }
      lastLap { timeMilliseconds state }
      bestLap { timeMilliseconds state }
    }
  }
}"#;

/// Championship schedule query.
pub const SCHEDULE_QUERY: &str = r#"query FindRaceByName($championshipId: ID!) {
  races(championshipId: $championshipId) {
    id
    name
    sessions {
      id
      name
      startsAt
    }
  }
}"#;

/// The leaderboard document as a plain query, for polling over HTTP.
pub fn leaderboard_query() -> String {
    SESSION_SUBSCRIPTION.replacen("subscription", "query", 1)
}
