//! Occupancy snapshots and the presence derived from them.

use std::time::Duration;

use crate::connection::Presence;

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

/// Executor usage of one build worker at sampling time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerLoad {
    pub name: String,
    pub online: bool,
    pub total_executors: u32,
    pub busy_executors: u32,
}

/// Read-only view of the build fleet, queried on every recomputation.
pub trait FleetOccupancy: Send + Sync {
    fn workers(&self) -> Vec<WorkerLoad>;

    fn queue_length(&self) -> usize;
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Busy and total executor counts across the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceSnapshot {
    pub busy: u32,
    pub total: u32,
}

impl PresenceSnapshot {
    pub fn new(busy: u32, total: u32) -> Self {
        Self { busy, total }
    }

    /// Total counts online workers only; busy counts every worker, since a
    /// worker going offline can still be finishing builds.
    pub fn from_workers(workers: &[WorkerLoad]) -> Self {
        workers.iter().fold(Self::default(), |acc, w| Self {
            busy: acc.busy.saturating_add(w.busy_executors),
            total: if w.online {
                acc.total.saturating_add(w.total_executors)
            } else {
                acc.total
            },
        })
    }
}

/// Remembers the last snapshot pushed to the registry.
#[derive(Debug, Default)]
pub struct PublishedSnapshot {
    last: Option<PresenceSnapshot>,
}

impl PublishedSnapshot {
    /// Record `snapshot` and report whether it differs from the previous one.
    pub fn publish(&mut self, snapshot: PresenceSnapshot) -> bool {
        if self.last == Some(snapshot) {
            return false;
        }
        self.last = Some(snapshot);
        true
    }

    pub fn last(&self) -> Option<PresenceSnapshot> {
        self.last
    }
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// The presence and status line pushed to every account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub presence: Presence,
    pub status: String,
}

impl PresenceUpdate {
    pub fn for_snapshot(snapshot: PresenceSnapshot, queue_length: usize) -> Self {
        let PresenceSnapshot { busy, total } = snapshot;
        if busy == 0 {
            return Self {
                presence: Presence::Available,
                status: "Idle: no builds running. Got some work for me?".to_string(),
            };
        }

        if busy >= total {
            return Self {
                presence: Presence::DoNotDisturb,
                status: format!(
                    "Flat out: all {busy} executors busy, {queue_length} {} in queue.",
                    jobs(queue_length)
                ),
            };
        }

        let mut status = format!("Working: {busy} out of {total} executors busy.");
        if queue_length > 0 {
            status.push_str(&format!(" {queue_length} {} in queue.", jobs(queue_length)));
        }
        Self {
            presence: Presence::Occupied,
            status,
        }
    }
}

fn jobs(n: usize) -> &'static str {
    if n == 1 {
        "job"
    } else {
        "jobs"
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Timing for the broadcaster's scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSchedule {
    /// Delay before the first periodic tick.
    pub initial_delay: Duration,
    pub tick_interval: Duration,
    /// Wait after a build event before sampling, so occupancy has settled.
    pub settle_delay: Duration,
    /// Limit on a single account's presence push.
    pub push_timeout: Duration,
}

impl Default for BroadcastSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            tick_interval: Duration::from_secs(60),
            settle_delay: Duration::from_secs(1),
            push_timeout: Duration::from_secs(30),
        }
    }
}
