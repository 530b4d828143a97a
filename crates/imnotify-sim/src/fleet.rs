//! A build fleet whose load drifts randomly.

use std::sync::{Mutex, PoisonError};

use imnotify_presence::{FleetOccupancy, WorkerLoad};
use rand::Rng;

pub struct SimulatedFleet {
    state: Mutex<FleetState>,
}

struct FleetState {
    workers: Vec<WorkerLoad>,
    queue: usize,
}

impl SimulatedFleet {
    pub fn new(workers: u32, executors: u32) -> Self {
        let workers = (1..=workers)
            .map(|i| WorkerLoad {
                name: format!("agent-{i}"),
                online: true,
                total_executors: executors,
                busy_executors: 0,
            })
            .collect();
        Self {
            state: Mutex::new(FleetState { workers, queue: 0 }),
        }
    }

    /// Start or finish a random build. Returns a description for the log.
    pub fn step(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;
        let idx = rng.gen_range(0..state.workers.len().max(1));
        let Some(worker) = state.workers.get_mut(idx) else {
            return "fleet is empty".to_string();
        };

        if rng.gen_bool(0.55) {
            if worker.busy_executors < worker.total_executors {
                worker.busy_executors += 1;
                format!("build started on {}", worker.name)
            } else {
                state.queue += 1;
                format!("build queued, {} waiting", state.queue)
            }
        } else if worker.busy_executors > 0 {
            worker.busy_executors -= 1;
            if state.queue > 0 {
                state.queue -= 1;
                worker.busy_executors += 1;
                format!("build finished on {}, next queued build picked up", worker.name)
            } else {
                format!("build finished on {}", worker.name)
            }
        } else {
            format!("{} idle", worker.name)
        }
    }
}

impl FleetOccupancy for SimulatedFleet {
    fn workers(&self) -> Vec<WorkerLoad> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .workers
            .clone()
    }

    fn queue_length(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).queue
    }
}
