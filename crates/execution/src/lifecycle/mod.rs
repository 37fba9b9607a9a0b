//! Position lifecycle tracking.
//!
//! Holds the per-run state machine and the ordered log of progress events
//! that callers can subscribe to or read afterwards.

mod events;
mod state;
mod tracker;

pub use events::*;
pub use state::*;
pub use tracker::*;
