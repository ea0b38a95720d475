use std::sync::atomic::{AtomicBool, Ordering};

/// Monotonic stop flag that can only transition from false to true.
///
/// Workers poll it once per loop iteration; the store is published with
/// `Release` so everything written before `stop` is visible to a worker that
/// observes it.
#[derive(Debug, Default)]
pub struct StopFlag {
    inner: AtomicBool,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.inner.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

/// Single-assignment election: exactly one caller of `try_claim` wins.
#[derive(Debug, Default)]
pub struct ReporterElection {
    claimed: AtomicBool,
}

impl ReporterElection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
