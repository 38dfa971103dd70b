//! Search coordinator: partitions the keyspace, spawns workers, owns the
//! shared stop signal and result channels, and resolves the outcome.
//!
//! Control flow: compute the keyspace size, tile it into
//! `workers × oversplit` ranges, feed the ranges through a bounded
//! channel acting as a work queue, and spawn one scoped thread per
//! worker. Each worker owns an independently-opened verifier (the
//! archive library is not safe for concurrent reads from one handle).
//! The first worker to verify a candidate wins a test-and-set on the
//! stop flag and publishes the password; everyone else stands down at
//! their next poll. A fatal verifier error travels the same
//! cooperative-cancellation path and takes precedence over everything
//! else when the outcome is resolved after the join.

mod worker;
pub use worker::WorkerOutcome;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use scopeguard::defer;

use crate::archive::{ArchiveHandle, PasswordCheck};
use crate::error::CrackError;
use crate::keyspace::Keyspace;
use crate::partition::{partition, IndexRange};
use crate::progress::{ProgressCallback, SearchStats};

const WATCHDOG_TICK: Duration = Duration::from_millis(25);
const REPORT_TICK: Duration = Duration::from_millis(200);

/// Tunables for one search run.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Worker threads walking the keyspace.
    pub workers: usize,
    /// Partitions handed out per worker. Finer slices shorten the lag
    /// between the stop signal and the last worker standing down.
    pub oversplit: usize,
    /// Candidates tried between stop-signal polls.
    pub poll_interval: u64,
    /// Optional wall-clock budget. Hitting it raises the stop signal;
    /// workers cannot tell it apart from a find.
    pub deadline: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            oversplit: 4,
            poll_interval: 1000,
            deadline: None,
        }
    }
}

impl SearchOptions {
    fn validate(&self) -> Result<(), CrackError> {
        if self.workers == 0 {
            return Err(CrackError::Config("worker count must be at least 1".into()));
        }
        if self.oversplit == 0 {
            return Err(CrackError::Config("oversplit factor must be at least 1".into()));
        }
        if self.poll_interval == 0 {
            return Err(CrackError::Config("poll interval must be at least 1".into()));
        }
        Ok(())
    }
}

/// What a finished search has to say for itself.
#[derive(Debug)]
pub struct SearchReport {
    /// The recovered password, or `None` after full exhaustion.
    pub password: Option<String>,
    /// Candidates actually verified across all workers.
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Exhaustively search `keyspace` against `handle`'s archive.
pub fn crack(
    handle: &ArchiveHandle,
    keyspace: &Keyspace,
    options: &SearchOptions,
    progress: Option<&ProgressCallback>,
) -> Result<SearchReport, CrackError> {
    run(keyspace, options, || handle.verifier(), progress)
}

/// Run the search with a caller-supplied verifier factory.
///
/// `make_checker` is invoked once inside every worker thread, so each
/// worker gets an exclusively-owned checker. Resolution order after all
/// workers have stopped: a fatal error first, then a published password,
/// then "not found".
pub fn run<C, F>(
    keyspace: &Keyspace,
    options: &SearchOptions,
    make_checker: F,
    progress: Option<&ProgressCallback>,
) -> Result<SearchReport, CrackError>
where
    C: PasswordCheck,
    F: Fn() -> Result<C, CrackError> + Sync,
{
    options.validate()?;

    let ranges = partition(
        keyspace.total(),
        options.workers.saturating_mul(options.oversplit),
    );
    let worker_count = options.workers.min(ranges.len()).max(1);
    let poll_interval = options.poll_interval;

    let stop = AtomicBool::new(false);
    let stats = SearchStats::new();
    let alive = AtomicUsize::new(worker_count);

    // Pre-filled work queue; workers pull ranges until it runs dry or the
    // stop signal is raised.
    let (range_tx, range_rx) = bounded::<IndexRange>(ranges.len().max(1));
    for range in ranges {
        if range_tx.send(range).is_err() {
            break;
        }
    }
    drop(range_tx);

    let (found_tx, found_rx) = bounded::<String>(worker_count);
    let (error_tx, error_rx) = bounded::<CrackError>(worker_count);

    thread::scope(|s| {
        for _ in 0..worker_count {
            let range_rx = range_rx.clone();
            let found_tx = found_tx.clone();
            let error_tx = error_tx.clone();
            let stop = &stop;
            let stats = &stats;
            let alive = &alive;
            let make_checker = &make_checker;

            s.spawn(move || {
                defer! { alive.fetch_sub(1, Ordering::Release); }
                let mut checker = match make_checker() {
                    Ok(checker) => checker,
                    Err(e) => {
                        stop.store(true, Ordering::Release);
                        let _ = error_tx.send(e);
                        return;
                    }
                };
                for range in range_rx.iter() {
                    if stop.load(Ordering::Acquire) {
                        break;
                    }
                    match worker::search_range(
                        keyspace,
                        range,
                        &mut checker,
                        stop,
                        poll_interval,
                        &found_tx,
                        stats,
                    ) {
                        Ok(WorkerOutcome::Exhausted) => continue,
                        // Found or Aborted: the search is over either way.
                        Ok(_) => break,
                        Err(e) => {
                            stop.store(true, Ordering::Release);
                            let _ = error_tx.send(e);
                            break;
                        }
                    }
                }
            });
        }

        // Deadline watchdog: raises the stop signal once the budget is
        // spent, then leaves shutdown to the normal cooperative path.
        if let Some(deadline) = options.deadline {
            let stop = &stop;
            let alive = &alive;
            s.spawn(move || {
                let ends_at = Instant::now() + deadline;
                while alive.load(Ordering::Acquire) > 0 && !stop.load(Ordering::Acquire) {
                    if Instant::now() >= ends_at {
                        stop.store(true, Ordering::Release);
                        break;
                    }
                    thread::sleep(WATCHDOG_TICK);
                }
            });
        }

        if let Some(callback) = progress {
            let stats = &stats;
            let alive = &alive;
            let total = keyspace.total();
            s.spawn(move || {
                while alive.load(Ordering::Acquire) > 0 {
                    callback(stats.snapshot(total));
                    thread::sleep(REPORT_TICK);
                }
                callback(stats.snapshot(total));
            });
        }
    });

    drop(found_tx);
    drop(error_tx);

    if let Ok(error) = error_rx.try_recv() {
        return Err(error);
    }
    // Only the test-and-set winner publishes, so at most one value is queued.
    let password = found_rx.try_recv().ok();
    Ok(SearchReport {
        password,
        attempts: stats.attempts(),
        elapsed: stats.elapsed(),
    })
}
