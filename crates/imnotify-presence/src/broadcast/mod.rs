//! Busy/idle presence fan-out.
//!
//! The [`PresenceBroadcaster`] is an explicitly constructed service: the
//! composition root creates it with a fleet occupancy source, and every
//! account feature registers its provider on start and unregisters on stop.
//! The scheduler task runs only while at least one provider is registered.

mod broadcaster;
mod scheduler;
mod types;


pub use broadcaster::PresenceBroadcaster;
pub use types::{
    BroadcastSchedule, FleetOccupancy, PresenceSnapshot, PresenceUpdate, PublishedSnapshot,
    WorkerLoad,
};
