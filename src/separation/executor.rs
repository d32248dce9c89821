//! Bounded parallel dispatch of segments to a model runner.

use super::{SegmentResult, SegmentRunner};
use crate::error::{Error, Result};
use crate::pipeline::Segment;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use tracing::debug;

/// Shared flag that stops further segment dispatch.
///
/// Work that already started runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token in the "running" state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Build the worker pool bounding concurrent model invocations.
pub fn build_pool(workers: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("nomusic-worker-{i}"))
        .build()
        .map_err(|e| Error::WorkerPool {
            reason: e.to_string(),
        })
}

/// Run `runner` over every segment on `pool`.
///
/// Results come back in completion order and are stored in their segment's
/// slot, so the returned vector is index-aligned with `segments`. A segment
/// whose turn comes after cancellation yields `None`. `on_complete` receives
/// `(completed, total)` after each segment finishes.
pub fn execute_segments<F>(
    pool: &ThreadPool,
    runner: &SegmentRunner<'_>,
    segments: &[Segment],
    cancel: &CancellationToken,
    mut on_complete: F,
) -> Vec<Option<SegmentResult>>
where
    F: FnMut(usize, usize),
{
    let total = segments.len();
    let mut slots: Vec<Option<SegmentResult>> = (0..total).map(|_| None).collect();
    if total == 0 {
        return slots;
    }

    let (tx, rx) = mpsc::channel();
    pool.in_place_scope(|scope| {
        for (slot, segment) in segments.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = if cancel.is_cancelled() {
                    debug!("{}: skipping {} after cancellation", runner.model_name(), segment.name);
                    None
                } else {
                    runner.run(segment)
                };
                // The receiver outlives the scope, so sending cannot fail.
                let _ = tx.send((slot, result));
            });
        }
        drop(tx);

        for (completed, (slot, result)) in rx.iter().enumerate() {
            slots[slot] = result;
            on_complete(completed + 1, total);
        }
    });

    slots
}
