use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

pub const DEFAULT_STATUS_INTERVAL: usize = 100;
pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_millis(1);

/// Runtime knobs for a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of worker threads started by `Scheduler::search`.
    pub workers: usize,
    /// The elected reporting worker logs progress every this many processed items.
    /// Zero disables progress logging.
    pub status_interval: usize,
    /// Pause taken by a worker that finds both work collections empty while other
    /// workers still hold in-flight items.
    pub idle_backoff: Duration,
}

impl SearchConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_status_interval(mut self, status_interval: usize) -> Self {
        self.status_interval = status_interval;
        self
    }

    pub fn with_idle_backoff(mut self, idle_backoff: Duration) -> Self {
        self.idle_backoff = idle_backoff;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            status_interval: DEFAULT_STATUS_INTERVAL,
            idle_backoff: DEFAULT_IDLE_BACKOFF,
        }
    }
}
