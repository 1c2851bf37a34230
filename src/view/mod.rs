//! Display view models
//!
//! Pure transformations from payloads to what a screen shows. Nothing here
//! performs I/O except [`ScheduleController`], which owns a pull request.

pub mod leaderboard;
pub mod pull;
pub mod render;
pub mod schedule;
pub mod session;

pub use leaderboard::{GapSource, Leaderboard, LeaderboardRow};
pub use pull::{PullView, Ticket};
pub use schedule::{RaceSchedule, ScheduleController, ScheduleEntry, ScheduleStatus, ScheduleView};
pub use session::{SessionSummary, SessionView};
