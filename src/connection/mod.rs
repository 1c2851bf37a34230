//! Scoped handles over a running live feed

pub mod live;


pub use live::LiveConnection;
