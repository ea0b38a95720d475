//! Concurrent abstraction-refinement scheduler.
//!
//! A `Scheduler` owns four collections, each behind its own lock:
//!
//! - **pending**: disjoint regions awaiting classification, ordered by the overlap
//!   order so the region containing a point is found in `O(log n)`;
//! - **suspect**: disjoint regions paired with one witness each, awaiting
//!   localized refinement around that witness;
//! - **resolved**: regions proven safe on the grid;
//! - **witnesses**: unique points confirmed unsafe.
//!
//! Workers call `run` concurrently. A worker never holds two collection locks at
//! once and never calls a strategy or the safety predicate while holding one, so
//! an expensive oracle only blocks the worker that called it. Items are moved
//! between collections by popping under the source lock and inserting under the
//! destination lock; in between the popping worker is the sole owner.
//!
//! Termination uses an outstanding-work counter covering every region in
//! pending, in suspect, or held by a worker. It is raised before an item becomes
//! visible and lowered only after the item's successors have been inserted, so
//! it reaches zero exactly when no work is left anywhere.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::unbounded;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::abstraction::CentralPoint;
use crate::concurrency::{ReporterElection, StopFlag};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::grid::Grid;
use crate::order::{OverlapMap, OverlapSet};
use crate::point::Point;
use crate::refinement::HierarchicalRefinement;
use crate::region::Region;
use crate::strategy::{
    AbstractionStrategy, Infallible, RefinementStrategy, SafetyPredicate, VerificationOutcome,
    VerificationStrategy,
};

/// Snapshot of collection sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub pending: usize,
    pub suspect: usize,
    pub resolved: usize,
    pub witnesses: usize,
    /// Regions dropped without being resolved: oracle failures on leaf regions,
    /// stalled refinements and rejected overlapping inserts.
    pub unresolved: usize,
}

/// Result of `Scheduler::search`.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSummary {
    pub stats: SearchStats,
    pub resolved_volume: f64,
    pub witnesses: Vec<Point>,
    /// Items processed across all workers.
    pub processed: usize,
    /// True when the search ended through `request_stop` rather than exhaustion.
    pub stopped: bool,
}

#[derive(Debug)]
struct WorkerReport {
    worker: usize,
    /// `None` when the worker panicked.
    processed: Option<usize>,
}

/// Wires strategies into a `Scheduler` and validates the configuration.
pub struct SchedulerBuilder {
    domain: Region,
    grid: Grid,
    initial: Option<Region>,
    predicate: Option<Arc<dyn SafetyPredicate>>,
    verification: Option<Arc<dyn VerificationStrategy>>,
    abstraction: Arc<dyn AbstractionStrategy>,
    refinement: Arc<dyn RefinementStrategy>,
    config: SearchConfig,
}

impl SchedulerBuilder {
    fn new(domain: Region, grid: Grid) -> Self {
        Self {
            domain,
            grid,
            initial: None,
            predicate: None,
            verification: None,
            abstraction: Arc::new(CentralPoint),
            refinement: Arc::new(HierarchicalRefinement::default()),
            config: SearchConfig::default(),
        }
    }

    /// Region to search. Defaults to the whole domain; clamped to the domain.
    pub fn initial_region(mut self, region: Region) -> Self {
        self.initial = Some(region);
        self
    }

    pub fn predicate(mut self, predicate: impl SafetyPredicate + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Convenience for an oracle that cannot fail.
    pub fn predicate_fn<F>(self, predicate: F) -> Self
    where
        F: Fn(&Point) -> bool + Send + Sync + 'static,
    {
        self.predicate(Infallible(predicate))
    }

    /// Uses a predicate that is also shared with a verification strategy.
    pub fn shared_predicate(mut self, predicate: Arc<dyn SafetyPredicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn verification(mut self, verification: impl VerificationStrategy + 'static) -> Self {
        self.verification = Some(Arc::new(verification));
        self
    }

    pub fn abstraction(mut self, abstraction: impl AbstractionStrategy + 'static) -> Self {
        self.abstraction = Arc::new(abstraction);
        self
    }

    pub fn refinement(mut self, refinement: impl RefinementStrategy + 'static) -> Self {
        self.refinement = Arc::new(refinement);
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates everything that would make the search meaningless and seeds
    /// pending with the clamped initial region.
    pub fn build(self) -> Result<Scheduler, SearchError> {
        let dimensions = self.domain.dimensions();
        if dimensions == 0 || !self.domain.is_valid() || !self.domain.is_finite() {
            return Err(SearchError::InvalidDomain);
        }
        if self.grid.dimensions() != dimensions {
            return Err(SearchError::DimensionMismatch {
                expected: dimensions,
                got: self.grid.dimensions(),
            });
        }
        let initial = self.initial.unwrap_or_else(|| self.domain.clone());
        if initial.dimensions() != dimensions {
            return Err(SearchError::DimensionMismatch {
                expected: dimensions,
                got: initial.dimensions(),
            });
        }
        if !initial.is_valid() {
            return Err(SearchError::InvalidInitialRegion);
        }
        let initial = initial.clamp_to(&self.domain);
        if !initial.is_valid() {
            return Err(SearchError::InvalidInitialRegion);
        }
        let predicate = self
            .predicate
            .ok_or(SearchError::MissingStrategy("safety predicate"))?;
        let verification = self
            .verification
            .ok_or(SearchError::MissingStrategy("verification strategy"))?;
        if self.config.workers == 0 {
            return Err(SearchError::InvalidWorkerCount);
        }

        let mut pending = OverlapSet::new();
        pending.insert(initial);
        Ok(Scheduler {
            domain: self.domain,
            grid: self.grid,
            predicate,
            verification,
            abstraction: self.abstraction,
            refinement: self.refinement,
            config: self.config,
            pending: Mutex::new(pending),
            suspect: Mutex::new(OverlapMap::new()),
            resolved: Mutex::new(Vec::new()),
            witnesses: Mutex::new(BTreeSet::new()),
            outstanding: AtomicUsize::new(1),
            unresolved: AtomicUsize::new(0),
            stop: StopFlag::new(),
            reporter: ReporterElection::new(),
        })
    }
}

/// Drives workers over the shared collections. See the module docs.
pub struct Scheduler {
    domain: Region,
    grid: Grid,
    predicate: Arc<dyn SafetyPredicate>,
    verification: Arc<dyn VerificationStrategy>,
    abstraction: Arc<dyn AbstractionStrategy>,
    refinement: Arc<dyn RefinementStrategy>,
    config: SearchConfig,
    pending: Mutex<OverlapSet>,
    suspect: Mutex<OverlapMap<Point>>,
    resolved: Mutex<Vec<Region>>,
    witnesses: Mutex<BTreeSet<Point>>,
    outstanding: AtomicUsize,
    unresolved: AtomicUsize,
    stop: StopFlag,
    reporter: ReporterElection,
}

impl Scheduler {
    pub fn builder(domain: Region, grid: Grid) -> SchedulerBuilder {
        SchedulerBuilder::new(domain, grid)
    }

    pub fn domain(&self) -> &Region {
        &self.domain
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Worker loop. Returns the number of items this worker processed.
    ///
    /// Exits when a stop was requested or when no work is left in any collection
    /// or in any other worker's hands. Safe to call from many threads at once.
    pub fn run(&self) -> usize {
        let reporter = self.reporter.try_claim();
        let mut processed = 0usize;
        while !self.stop.is_stopped() {
            let next_pending = self.pending.lock().pop_first();
            if let Some(region) = next_pending {
                self.process_pending(region);
            } else {
                let next_suspect = self.suspect.lock().pop_first();
                match next_suspect {
                    Some((region, witness)) => self.process_suspect(region, witness),
                    None => {
                        if self.outstanding.load(Ordering::Acquire) == 0 {
                            break;
                        }
                        thread::sleep(self.config.idle_backoff);
                        continue;
                    }
                }
            }
            self.outstanding.fetch_sub(1, Ordering::AcqRel);
            processed += 1;
            if reporter
                && self.config.status_interval > 0
                && processed % self.config.status_interval == 0
            {
                self.log_progress();
            }
        }
        processed
    }

    /// Asks every worker to exit after its current item.
    pub fn request_stop(&self) {
        info!("stop requested");
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Runs `run` on `config.workers` scoped threads and waits for all of them.
    ///
    /// A worker that panics stops the search; the others finish their current
    /// item and exit, and the panic is reported as `WorkerPanicked`.
    pub fn search(&self) -> Result<SearchSummary, SearchError> {
        let workers = self.config.workers;
        if workers == 0 {
            return Err(SearchError::InvalidWorkerCount);
        }
        info!(workers, domain = %self.domain, "starting search");

        let (reports_tx, reports_rx) = unbounded();
        thread::scope(|scope| {
            for worker in 0..workers {
                let reports = reports_tx.clone();
                scope.spawn(move || {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run()));
                    if outcome.is_err() {
                        self.request_stop();
                    }
                    let _ = reports.send(WorkerReport {
                        worker,
                        processed: outcome.ok(),
                    });
                });
            }
        });
        drop(reports_tx);

        let mut processed = 0usize;
        let mut panicked: Option<usize> = None;
        for report in reports_rx.iter() {
            match report.processed {
                Some(count) => processed += count,
                None => {
                    error!(worker = report.worker, "worker panicked");
                    panicked = Some(panicked.map_or(report.worker, |w| w.min(report.worker)));
                }
            }
        }
        if let Some(worker) = panicked {
            return Err(SearchError::WorkerPanicked { worker });
        }

        let summary = SearchSummary {
            stats: self.stats(),
            resolved_volume: self.resolved_volume(),
            witnesses: self.witnesses(),
            processed,
            stopped: self.stop.is_stopped(),
        };
        info!(
            processed,
            resolved = summary.stats.resolved,
            witnesses = summary.stats.witnesses,
            unresolved = summary.stats.unresolved,
            stopped = summary.stopped,
            "search finished"
        );
        Ok(summary)
    }

    /// Calls `callback` once per confirmed witness, in point order.
    pub fn report(&self, mut callback: impl FnMut(&Point)) {
        for witness in self.witnesses() {
            callback(&witness);
        }
    }

    pub fn stats(&self) -> SearchStats {
        let pending = self.pending.lock().len();
        let suspect = self.suspect.lock().len();
        let resolved = self.resolved.lock().len();
        let witnesses = self.witnesses.lock().len();
        SearchStats {
            pending,
            suspect,
            resolved,
            witnesses,
            unresolved: self.unresolved.load(Ordering::Relaxed),
        }
    }

    pub fn resolved_regions(&self) -> Vec<Region> {
        self.resolved.lock().clone()
    }

    pub fn resolved_volume(&self) -> f64 {
        self.resolved.lock().iter().map(Region::volume).sum()
    }

    pub fn witnesses(&self) -> Vec<Point> {
        self.witnesses.lock().iter().cloned().collect()
    }

    fn log_progress(&self) {
        let stats = self.stats();
        info!(
            pending = stats.pending,
            suspect = stats.suspect,
            resolved = stats.resolved,
            witnesses = stats.witnesses,
            unresolved = stats.unresolved,
            "search progress"
        );
    }

    fn process_pending(&self, region: Region) {
        let region = region.clamp_to(&self.domain);
        let count = self.grid.count_valid_points(&region);
        if count == 0 {
            debug!(%region, "region holds no grid points; discarded");
            return;
        }
        match self.verification.verify(&region) {
            VerificationOutcome::Safe => {
                debug!(%region, "resolved");
                self.resolved.lock().push(region);
            }
            VerificationOutcome::Unsafe(witness) => self.route_unsafe(&region, witness),
            VerificationOutcome::Unknown if count == 1 => self.resolve_leaf(region),
            VerificationOutcome::Unknown => self.route_unknown(&region),
        }
    }

    fn route_unsafe(&self, region: &Region, witness: Point) {
        let Some(mut children) = self.partition(region) else {
            return;
        };
        match children.take_containing(&witness) {
            Some(child) => {
                self.admit(1);
                self.enqueue_suspect(child, witness);
            }
            None => warn!(%region, %witness, "witness lies in no refined child; dropped"),
        }
        self.enqueue_pending(children.into_regions().collect());
    }

    /// A single grid point left: one direct oracle call decides the region.
    fn resolve_leaf(&self, region: Region) {
        let Some(point) = self.grid.find_anchor(&region) else {
            return;
        };
        match self.predicate.check(&point) {
            Ok(true) => {
                self.resolved.lock().push(region);
            }
            Ok(false) => {
                debug!(%region, %point, "leaf region is unsafe");
                self.witnesses.lock().insert(point);
            }
            Err(error) => {
                debug!(%region, %point, %error, "oracle failed on leaf region; left unresolved");
                self.unresolved.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn route_unknown(&self, region: &Region) {
        let Some(mut open) = self.partition(region) else {
            return;
        };
        let candidates: Vec<Point> = open
            .iter()
            .flat_map(|child| self.abstraction.candidates(child))
            .collect();

        let mut claimed = Vec::new();
        let mut stolen = Vec::new();
        for candidate in candidates {
            let Some(point) = self.admit_candidate(candidate) else {
                continue;
            };
            match self.predicate.check(&point) {
                Ok(true) => {}
                Ok(false) => {
                    if let Some(child) = open.take_containing(&point) {
                        claimed.push((child, point));
                    } else if !region.contains(&point) {
                        // Possibly an unresolved sibling still waiting in pending.
                        let sibling = self.pending.lock().take_containing(&point);
                        match sibling {
                            Some(sibling) => stolen.push((sibling, point)),
                            None => debug!(%point, "unsafe candidate lies in no open region"),
                        }
                    }
                }
                Err(error) => {
                    debug!(%point, %error, "oracle failed on candidate; skipped");
                }
            }
        }

        for (child, witness) in claimed {
            self.admit(1);
            self.enqueue_suspect(child, witness);
        }
        // Stolen siblings are already counted as outstanding.
        for (sibling, witness) in stolen {
            self.enqueue_suspect(sibling, witness);
        }
        self.enqueue_pending(open.into_regions().collect());
    }

    fn process_suspect(&self, region: Region, witness: Point) {
        if self.grid.count_valid_points(&region) <= 1 {
            debug!(%region, %witness, "witness localized");
            return;
        }
        let Some(children) = self.partition(&region) else {
            return;
        };
        let mut children: OverlapSet = children
            .into_regions()
            .filter(|child| self.grid.count_valid_points(child) > 0)
            .collect();
        match children.take_containing(&witness) {
            Some(child) => {
                self.admit(1);
                self.enqueue_suspect(child, witness);
            }
            None => warn!(%region, %witness, "witness lies in no refined child; dropped"),
        }
        self.enqueue_pending(children.into_regions().collect());
    }

    /// Refines `region`, rejecting partitions that cannot make progress.
    fn partition(&self, region: &Region) -> Option<OverlapSet> {
        let children = self.refinement.refine(region);
        if children.is_empty() || (children.len() == 1 && children[0] == *region) {
            warn!(%region, "refinement made no progress; region left unresolved");
            self.unresolved.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        let mut set = OverlapSet::new();
        let mut dropped = 0usize;
        for child in children {
            if child.dimensions() != region.dimensions() || !child.is_valid() || !set.insert(child)
            {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(%region, dropped, "refinement produced invalid or overlapping children");
            self.unresolved.fetch_add(dropped, Ordering::Relaxed);
        }
        Some(set)
    }

    /// Snaps a candidate onto the grid and into the domain.
    fn admit_candidate(&self, candidate: Point) -> Option<Point> {
        if candidate.dimensions() != self.domain.dimensions() {
            warn!(
                expected = self.domain.dimensions(),
                got = candidate.dimensions(),
                "abstraction returned a point of the wrong dimensionality"
            );
            return None;
        }
        let point = self.domain.clamp_point(&self.grid.snap(&candidate));
        if !self.domain.contains(&point) {
            warn!(%candidate, %point, "candidate falls outside the domain; discarded");
            return None;
        }
        Some(point)
    }

    fn admit(&self, items: usize) {
        self.outstanding.fetch_add(items, Ordering::AcqRel);
    }

    fn retire(&self, items: usize) {
        self.outstanding.fetch_sub(items, Ordering::AcqRel);
        self.unresolved.fetch_add(items, Ordering::Relaxed);
    }

    /// Batch-inserts fresh regions under one lock acquisition.
    fn enqueue_pending(&self, regions: Vec<Region>) {
        if regions.is_empty() {
            return;
        }
        self.admit(regions.len());
        let mut rejected = 0usize;
        {
            let mut pending = self.pending.lock();
            for region in regions {
                if !pending.insert(region) {
                    rejected += 1;
                }
            }
        }
        if rejected > 0 {
            warn!(rejected, "regions overlapping pending regions were dropped");
            self.retire(rejected);
        }
    }

    /// Inserts an already-counted region into suspect and records its witness.
    fn enqueue_suspect(&self, region: Region, witness: Point) {
        let inserted = self.suspect.lock().insert(region, witness.clone());
        match inserted {
            Ok(()) => {
                debug!(%witness, "witness recorded");
                self.witnesses.lock().insert(witness);
            }
            Err((region, witness)) => {
                warn!(%region, %witness, "region overlaps a suspect region; dropped");
                self.retire(1);
            }
        }
    }
}
