//! Core display types.
//!
//! These are the small, pure building blocks every view is made of:
//! - [`SessionStatus`] and [`ParticipantStatus`] resolve raw timing flags into
//!   a single display status
//! - [`LapTime`] validates and formats millisecond durations as `M:SS.mmm`
//! - [`country_flag`] turns an ISO alpha-2 code into a flag emoji
//! - [`UpdateRate`] controls how often a live view re-renders
//!
//! ## Usage Example
//!
//! ```rust
//! use pitboard::types::{ParticipantFlags, ParticipantStatus, SessionFlags, SessionStatus};
//! use pitboard::types::format_lap_time;
//!
//! let session = SessionStatus::resolve(Some(SessionFlags { closed: true, ..Default::default() }));
//! let driver = ParticipantStatus::resolve(
//!     ParticipantFlags { seen_checkered_flag: false, is_out: true },
//!     session,
//! );
//!
//! assert_eq!(session, SessionStatus::Completed);
//! assert_eq!(driver, ParticipantStatus::Dnf);
//! assert_eq!(format_lap_time(Some(65_432)), "1:05.432");
//! ```

mod country;
mod lap_time;
mod status;
mod update_rate;

pub use country::country_flag;
pub use lap_time::{LapTime, NO_TIME, format_lap_time};
pub use status::{ParticipantFlags, ParticipantStatus, SessionFlags, SessionStatus};
pub use update_rate::UpdateRate;

/// Placeholder for any missing display value.
pub const PLACEHOLDER: &str = "-";
