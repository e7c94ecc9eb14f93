// src/dispatcher.rs
use crate::checkpoint::{Checkpoint, ScanProgress};
use crate::error::Result;
use crate::mutator::Candidate;
use crate::output::OutputManager;
use crate::probers::Prober;
use crate::types::{BucketFinderError, DispatchMode, ScanStats};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// How many queued items a pool run handed out and how many finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    pub dispatched: usize,
    pub completed: usize,
}

impl PoolReport {
    pub fn is_complete(&self) -> bool {
        self.completed == self.dispatched
    }
}

/// Fixed set of workers pulling from one bounded queue.
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Queue every item in order, then block until the workers have handled
    /// all of them. A worker that panics stops taking items; the rest keep
    /// draining the queue and the report shows what was lost.
    pub async fn run_to_completion<I, T, F, Fut>(&self, items: I, handler: F) -> PoolReport
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<T>(self.workers);
        let rx = Arc::new(Mutex::new(rx));
        let handler = Arc::new(handler);
        let completed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let rx = rx.clone();
            let handler = handler.clone();
            let completed = completed.clone();

            handles.push(tokio::spawn(async move {
                debug!("Worker {} started", worker_id);
                loop {
                    let item = {
                        let mut rx = rx.lock().await;
                        rx.recv().await
                    };
                    let Some(item) = item else {
                        break;
                    };

                    handler(item).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                }
                debug!("Worker {} completed", worker_id);
            }));
        }

        let mut dispatched = 0usize;
        for item in items {
            if tx.send(item).await.is_err() {
                error!("Every worker has stopped, {} items were dispatched", dispatched);
                break;
            }
            dispatched += 1;
        }
        drop(tx);

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                error!("Worker task failed: {}", e);
            }
        }

        let report = PoolReport {
            dispatched,
            completed: completed.load(Ordering::SeqCst),
        };
        if !report.is_complete() {
            warn!("{} of {} dispatched items completed", report.completed, report.dispatched);
        }
        report
    }
}

/// Longest contiguous prefix of completed indices, for workers that finish
/// out of order.
#[derive(Debug, Default)]
pub struct CompletionWatermark {
    next: usize,
    pending: BTreeSet<usize>,
}

impl CompletionWatermark {
    pub fn new(start: usize) -> Self {
        Self {
            next: start,
            pending: BTreeSet::new(),
        }
    }

    /// Every index below this one has completed.
    pub fn value(&self) -> usize {
        self.next
    }

    /// Mark `index` done. Returns the new watermark when it moved.
    pub fn complete(&mut self, index: usize) -> Option<usize> {
        if index < self.next {
            return None;
        }
        self.pending.insert(index);

        let before = self.next;
        while self.pending.remove(&self.next) {
            self.next += 1;
        }
        (self.next != before).then_some(self.next)
    }
}

/// Drives candidates through a prober and routes every outcome to the output.
pub struct ProbeDispatcher {
    prober: Arc<dyn Prober>,
    output: Arc<OutputManager>,
    checkpoint: Option<Checkpoint>,
    mode: DispatchMode,
    delay: Duration,
}

impl ProbeDispatcher {
    pub fn new(prober: Arc<dyn Prober>, output: Arc<OutputManager>, mode: DispatchMode, delay: Duration) -> Self {
        Self {
            prober,
            output,
            checkpoint: None,
            mode,
            delay,
        }
    }

    /// Persist progress here while running and truncate it once every
    /// candidate has been probed. A run that loses candidates leaves it intact.
    pub fn with_checkpoint(mut self, checkpoint: Checkpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Probe `candidates[start..]`.
    pub async fn run(&self, candidates: Vec<Candidate>, start: usize) -> Result<ScanStats> {
        let progress = ScanProgress::new(start, candidates.len())?;
        info!(
            "Probing {} of {} candidates with the {} prober ({:?})",
            progress.remaining(),
            progress.total(),
            self.prober.name(),
            self.mode
        );

        self.output.start(progress.total(), progress.offset());
        let result = match self.mode {
            DispatchMode::Sequential => Ok(self.run_sequential(&candidates, progress.offset()).await),
            DispatchMode::Concurrent(workers) => {
                self.run_concurrent(candidates, progress.offset(), workers).await
            }
        };
        self.output.finish();
        let mut stats = result?;

        stats.total = progress.total();
        stats.start_offset = progress.offset();

        if let Some(checkpoint) = &self.checkpoint {
            if let Err(e) = checkpoint.clear().await {
                warn!("Scan finished but the checkpoint could not be cleared: {}", e);
            }
        }

        Ok(stats)
    }

    async fn run_sequential(&self, candidates: &[Candidate], start: usize) -> ScanStats {
        let mut stats = ScanStats::default();
        let kind = self.prober.kind();

        for (index, candidate) in candidates.iter().enumerate().skip(start) {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let outcome = self.prober.probe(candidate).await;
            stats.record(&outcome);
            self.output.record(kind, &self.prober.target(candidate), &outcome).await;
            self.output.advance(candidate.as_str());

            if let Some(checkpoint) = &self.checkpoint {
                if let Err(e) = checkpoint.save(index + 1).await {
                    warn!("Failed to save checkpoint at {}: {}", index + 1, e);
                }
            }
        }

        stats
    }

    async fn run_concurrent(&self, candidates: Vec<Candidate>, start: usize, workers: usize) -> Result<ScanStats> {
        let stats = Arc::new(Mutex::new(ScanStats::default()));
        let watermark = Arc::new(Mutex::new(CompletionWatermark::new(start)));
        let shared_watermark = watermark.clone();

        let prober = self.prober.clone();
        let output = self.output.clone();
        let checkpoint = self.checkpoint.clone();
        let delay = self.delay;
        let shared_stats = stats.clone();

        let report = WorkerPool::new(workers)
            .run_to_completion(
                candidates.into_iter().enumerate().skip(start),
                move |(index, candidate): (usize, Candidate)| {
                    let prober = prober.clone();
                    let output = output.clone();
                    let checkpoint = checkpoint.clone();
                    let stats = shared_stats.clone();
                    let watermark = shared_watermark.clone();

                    async move {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }

                        let outcome = prober.probe(&candidate).await;
                        output.record(prober.kind(), &prober.target(&candidate), &outcome).await;
                        output.advance(candidate.as_str());
                        stats.lock().await.record(&outcome);

                        if let Some(checkpoint) = &checkpoint {
                            // held across the save so offsets hit the file in increasing order
                            let mut watermark = watermark.lock().await;
                            if let Some(offset) = watermark.complete(index) {
                                if let Err(e) = checkpoint.save(offset).await {
                                    warn!("Failed to save checkpoint at {}: {}", offset, e);
                                }
                            }
                        }
                    }
                },
            )
            .await;

        debug!("{} candidates handled by {} workers", report.completed, workers);
        if !report.is_complete() {
            let resume_at = watermark.lock().await.value();
            return Err(BucketFinderError::CheckpointError(format!(
                "only {} of {} candidates were probed, progress kept at {}",
                report.completed, report.dispatched, resume_at
            )));
        }

        let snapshot = stats.lock().await.clone();
        Ok(snapshot)
    }
}
