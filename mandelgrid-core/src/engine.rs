//! Parallel evaluation of sample grids.
//!
//! A [`Pool`] runs one pass at a time: the calling thread feeds items into a
//! bounded channel and a fixed set of scoped worker threads drain it. The
//! workers live only for the duration of the pass and are joined before
//! [`Pool::for_each`] returns. Every item is handed to exactly one worker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam::channel;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::fractal::Fractal;
use crate::grid::SampleGrid;

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Receives `(dispatched, total)` from the dispatching thread.
///
/// Reports are non-decreasing and the last one of a pass always has
/// `dispatched == total`.
pub trait ProgressSink {
    fn report(&mut self, dispatched: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn report(&mut self, dispatched: usize, total: usize) {
        self(dispatched, total)
    }
}

#[derive(Debug, Default)]
struct Counters {
    done: AtomicUsize,
    total: AtomicUsize,
}

/// Progress counters shared with another thread.
///
/// Clones share the same counters: hand one clone to the pass as its sink and
/// poll [`ProgressCell::fraction`] from the other.
#[derive(Debug, Clone, Default)]
pub struct ProgressCell {
    counters: Arc<Counters>,
}

impl ProgressCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current progress as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.counters.done.load(Ordering::Relaxed),
            self.counters.total.load(Ordering::Relaxed),
        )
    }

    /// Completed share in `[0, 1]`; `0` before the first report.
    ///
    /// The two counters are read separately, so a poller racing a reused
    /// cell can see a stale pair; the result is clamped.
    pub fn fraction(&self) -> f64 {
        let (done, total) = self.progress();
        if total == 0 {
            0.0
        } else {
            (done as f64 / total as f64).min(1.0)
        }
    }
}

impl ProgressSink for ProgressCell {
    fn report(&mut self, dispatched: usize, total: usize) {
        self.counters.done.store(dispatched, Ordering::Relaxed);
        self.counters.total.store(total, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// A fixed-size set of worker threads, spawned per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pool {
    workers: usize,
    report_every: usize,
}

impl Pool {
    pub const DEFAULT_REPORT_EVERY: usize = 4096;

    /// A pool with `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            report_every: Self::DEFAULT_REPORT_EVERY,
        }
    }

    /// Report progress every `n` dispatched items (at least one).
    pub fn with_report_every(self, n: usize) -> Self {
        Self {
            report_every: n.max(1),
            ..self
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn report_every(&self) -> usize {
        self.report_every
    }

    /// Apply `f` to every item on the worker threads.
    ///
    /// Items are dispatched in iteration order through a channel holding at
    /// most one item per worker, so the dispatcher blocks while every worker
    /// is busy. Dropping the sender after the last item closes the queue;
    /// workers exit once it is drained. A panicking worker re-raises the
    /// panic here when the scope joins.
    pub fn for_each<I, T, F>(
        &self,
        items: I,
        mut progress: Option<&mut dyn ProgressSink>,
        f: F,
    ) -> crate::Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
        T: Send,
        F: Fn(T) + Sync,
    {
        let items = items.into_iter();
        let total = items.len();
        let workers = self.workers.min(total).max(1);
        let (tx, rx) = channel::bounded::<T>(workers);
        let f = &f;

        thread::scope(|scope| {
            for id in 0..workers {
                let rx = rx.clone();
                thread::Builder::new()
                    .name(format!("grid-worker-{id}"))
                    .spawn_scoped(scope, move || {
                        for item in rx {
                            f(item);
                        }
                    })
                    .map_err(CoreError::WorkerSpawn)?;
            }
            drop(rx);

            let mut sent = 0;
            for item in items {
                // Only fails once every worker has gone away, i.e. panicked.
                if tx.send(item).is_err() {
                    break;
                }
                sent += 1;
                if sent % self.report_every == 0 && sent < total {
                    if let Some(sink) = progress.as_deref_mut() {
                        sink.report(sent, total);
                    }
                }
            }
            drop(tx);

            if let Some(sink) = progress {
                sink.report(sent, total);
            }
            Ok(())
        })
    }
}

impl Default for Pool {
    /// One worker per logical CPU.
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

// ---------------------------------------------------------------------------
// Grid evaluation
// ---------------------------------------------------------------------------

/// Evaluate every point of `grid` in place.
///
/// Progress is reported once per grid row and once at the end. On return
/// `grid.max_iterations` records the cap that was used.
pub fn evaluate_grid<F: Fractal + Sync>(
    grid: &mut SampleGrid,
    fractal: &F,
    pool: &Pool,
    progress: Option<&mut dyn ProgressSink>,
) -> crate::Result<()> {
    let start = Instant::now();
    let total = grid.len();
    let max_iterations = fractal.max_iterations();
    let pool = pool.with_report_every(grid.x_res as usize);

    debug!(
        workers = pool.workers(),
        x_res = grid.x_res,
        y_res = grid.y_res,
        max_iterations,
        "evaluating grid"
    );

    pool.for_each(grid.points.iter_mut(), progress, |point| {
        point.evaluate(fractal)
    })?;
    grid.max_iterations = Some(max_iterations);

    info!(
        points = total,
        members = grid.member_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "grid evaluated"
    );
    Ok(())
}
