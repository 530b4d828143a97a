//! Connection lifecycle and busy/idle presence for build-farm chat accounts.
//!
//! Each configured account gets a [`ConnectionProvider`] that owns its single
//! backend [`Connection`] and reconnects with exponential backoff when the
//! backend drops it. A [`PresenceBroadcaster`] samples fleet occupancy on a
//! timer and after build events, and pushes the resulting presence to every
//! registered provider.

pub mod broadcast;
pub mod connection;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcast::{
    BroadcastSchedule, FleetOccupancy, PresenceBroadcaster, PresenceSnapshot, PresenceUpdate,
    WorkerLoad,
};
pub use connection::{BreakageNotifier, Connection, ConnectionFactory, NullConnection, Presence};
pub use provider::{Backoff, ConnectionProvider, ReconnectPolicy};
