//! # Timing Service Payloads
//!
//! Typed views of the JSON the timing service returns for its three
//! documents: the session query, the session subscription, and the
//! championship schedule query.
//!
//! ## Decoding Policy
//!
//! The service omits fields freely depending on the document and the state of
//! the session. Every struct is `#[serde(default)]`, optional values are
//! `Option`, and strings or lists that arrive as `null` decode as empty. A
//! partial payload therefore always decodes; display code substitutes
//! placeholders rather than failing. Unknown fields such as `__typename` are
//! ignored.

use serde::{Deserialize, Deserializer};

pub mod documents;
pub mod participant;
pub mod schedule;
pub mod session;

pub use participant::{
    Category, Country, Driver, Lap, Participant, ParticipantGap, SectorTime, Team, Tires,
};
pub use schedule::{Race, ScheduledSession};
pub use session::{LiveStatus, RaceRef, SectorFlag, Session, Temperature, TrackFlag, Weather};

/// Decode `null` as the type's default value.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
