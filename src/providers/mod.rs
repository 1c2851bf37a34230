//! Snapshot provider implementations

pub mod polling;
pub mod subscription;

pub use polling::PollingProvider;
pub use subscription::SubscriptionProvider;
