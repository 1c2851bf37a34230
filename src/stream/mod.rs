//! Stream combinators for live views

mod throttle;

pub use throttle::{Throttle, ThrottleExt};
