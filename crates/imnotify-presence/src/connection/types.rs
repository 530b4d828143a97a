use std::fmt;

use tokio::sync::mpsc;

/// Coarse availability published to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Available,
    Occupied,
    DoNotDisturb,
    Away,
    Unavailable,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Presence::Available => "available",
            Presence::Occupied => "occupied",
            Presence::DoNotDisturb => "dnd",
            Presence::Away => "away",
            Presence::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

/// Reasons the reconnect worker is woken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReconnectSignal {
    /// The backend dropped a live session.
    Broken { cause: Option<String> },
    /// A caller found no usable connection.
    Missing,
}

/// Handle a [`Connection`](super::Connection) uses to report that its
/// backend session went away.
///
/// Every notification is queued for the owning provider's reconnect worker;
/// the queue is unbounded so a burst of notifications is never lost.
#[derive(Debug, Clone)]
pub struct BreakageNotifier {
    tx: mpsc::UnboundedSender<ReconnectSignal>,
}

impl BreakageNotifier {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ReconnectSignal>) -> Self {
        Self { tx }
    }

    /// Report an unexpected disconnect. Returns immediately.
    pub fn notify(&self, cause: Option<&str>) {
        let _ = self.tx.send(ReconnectSignal::Broken {
            cause: cause.map(str::to_string),
        });
    }

    pub(crate) fn arm(&self, signal: ReconnectSignal) {
        let _ = self.tx.send(signal);
    }
}
