//! Background thread pool for the CPU-heavy session steps (photo decode,
//! final crop composition).
//!
//! Jobs are closures executed off the UI-owning thread; results travel back
//! over a channel and are applied by the session's `poll_*` methods on the
//! owning thread. An epoch counter cancels outstanding work: tearing a
//! session down bumps the epoch, and jobs enqueued under an older epoch are
//! skipped instead of running against a disposed session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Sender};
use log::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool for decode and composition jobs.
pub struct Workers {
    sender: Sender<Job>,
    _handles: Vec<thread::JoinHandle<()>>, // Keep handles to prevent premature drop
    current_epoch: Arc<AtomicU64>,
}

impl Workers {
    /// Create a pool with `num_threads` threads. Two threads cover a crop
    /// session (one decode, one composition); more are harmless.
    pub fn new(num_threads: usize) -> Self {
        let (tx, rx): (Sender<Job>, _) = unbounded();
        let mut handles = Vec::new();

        for worker_id in 0..num_threads.max(1) {
            let rx = rx.clone();

            let handle = thread::Builder::new()
                .name(format!("cropkit-worker-{}", worker_id))
                .spawn(move || {
                    debug!("worker {} started", worker_id);

                    // Worker loop: execute closures until channel closes
                    while let Ok(job) = rx.recv() {
                        job();
                    }

                    debug!("worker {} stopped", worker_id);
                })
                .expect("failed to spawn worker thread");

            handles.push(handle);
        }

        Self {
            sender: tx,
            _handles: handles,
            current_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Execute a closure on a worker thread.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.sender.send(Box::new(f)) {
            error!("failed to enqueue job: {}", e);
        }
    }

    /// Get the current epoch. Capture it when enqueueing cancellable work.
    pub fn current_epoch(&self) -> u64 {
        self.current_epoch.load(Ordering::Relaxed)
    }

    /// Invalidate all outstanding epoch-tagged jobs.
    pub fn bump_epoch(&self) {
        self.current_epoch.fetch_add(1, Ordering::Relaxed);
    }

    /// Execute a closure only if `epoch` is still current at dequeue time.
    ///
    /// The check runs on the worker thread, so a bump after enqueue still
    /// cancels the job.
    pub fn execute_with_epoch<F>(&self, epoch: u64, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let current = Arc::clone(&self.current_epoch);
        self.execute(move || {
            let now = current.load(Ordering::Relaxed);
            if epoch != now {
                debug!("skipping stale job: epoch {} != current {}", epoch, now);
                return;
            }
            f();
        });
    }
}
