//! Session and participant status resolution
//!
//! Both resolvers are pure functions of the flags they are given. The
//! session resolver is evaluated first and its result feeds the participant
//! resolver, so every row in a leaderboard agrees with the session header.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Flags that decide a session's status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// Session is closed (or has shown the chequered flag)
    pub closed: bool,
    /// Clock is running
    pub running: bool,
    /// A start time has been published
    pub has_start_time: bool,
}

/// Display status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum SessionStatus {
    NotStarted,
    AboutToStart,
    Running,
    Completed,
}

impl SessionStatus {
    /// Resolve a session's status. First match wins:
    /// closed, running, start time published, otherwise not started.
    ///
    /// A session without any live status resolves to [`SessionStatus::NotStarted`].
    pub fn resolve(flags: Option<SessionFlags>) -> Self {
        let Some(flags) = flags else {
            return SessionStatus::NotStarted;
        };

        if flags.closed {
            SessionStatus::Completed
        } else if flags.running {
            SessionStatus::Running
        } else if flags.has_start_time {
            SessionStatus::AboutToStart
        } else {
            SessionStatus::NotStarted
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "Not Started",
            SessionStatus::AboutToStart => "About to Start",
            SessionStatus::Running => "Running",
            SessionStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Flags that decide a participant's status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantFlags {
    /// Participant crossed the line after the chequered flag
    pub seen_checkered_flag: bool,
    /// Participant is out of the session
    pub is_out: bool,
}

/// Display status of a single participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ParticipantStatus {
    NotStarted,
    Running,
    Out,
    Completed,
    Dnf,
}

impl ParticipantStatus {
    /// Resolve a participant's status against the session's status.
    ///
    /// Once the session is completed only the chequered flag matters.
    /// Before that, an out participant is `Out` and everyone else mirrors
    /// whether the session clock is running.
    pub fn resolve(flags: ParticipantFlags, session: SessionStatus) -> Self {
        match session {
            SessionStatus::Completed if flags.seen_checkered_flag => ParticipantStatus::Completed,
            SessionStatus::Completed => ParticipantStatus::Dnf,
            _ if flags.is_out => ParticipantStatus::Out,
            SessionStatus::Running => ParticipantStatus::Running,
            SessionStatus::NotStarted | SessionStatus::AboutToStart => {
                ParticipantStatus::NotStarted
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParticipantStatus::NotStarted => "Not Started",
            ParticipantStatus::Running => "Running",
            ParticipantStatus::Out => "Out",
            ParticipantStatus::Completed => "Completed",
            ParticipantStatus::Dnf => "DNF",
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
