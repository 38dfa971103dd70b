//! Sequential walk of one index range with cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;

use crate::archive::PasswordCheck;
use crate::error::CrackError;
use crate::keyspace::Keyspace;
use crate::partition::IndexRange;
use crate::progress::SearchStats;

/// Terminal state of one range walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// This worker verified the password and won the publish race.
    Found,
    /// Every index in the range was tried without a hit.
    Exhausted,
    /// The stop signal was raised elsewhere (or this worker lost the
    /// publish race); the walk ended early and published nothing.
    Aborted,
}

/// Walk `range`, decoding and testing one candidate per index.
///
/// The stop flag is polled once every `poll_interval` candidates, so a
/// worker does at most `poll_interval` verifier calls after another
/// worker has already won. On a hit, `stop.swap(true)` decides the race:
/// only the winner pushes into `found_tx`.
///
/// Verification is deterministic, so there are no retries: a negative
/// result is final for that index, and a fatal verifier error ends the
/// walk immediately.
pub(crate) fn search_range<C: PasswordCheck>(
    keyspace: &Keyspace,
    range: IndexRange,
    checker: &mut C,
    stop: &AtomicBool,
    poll_interval: u64,
    found_tx: &Sender<String>,
    stats: &SearchStats,
) -> Result<WorkerOutcome, CrackError> {
    let mut since_poll = 0u64;
    for index in range.start..range.end {
        if since_poll >= poll_interval {
            stats.record_attempts(since_poll);
            since_poll = 0;
            if stop.load(Ordering::Acquire) {
                return Ok(WorkerOutcome::Aborted);
            }
        }
        let candidate = keyspace.encode(index);
        let hit = match checker.check(&candidate) {
            Ok(hit) => hit,
            Err(e) => {
                stats.record_attempts(since_poll + 1);
                return Err(e);
            }
        };
        since_poll += 1;
        if hit {
            stats.record_attempts(since_poll);
            return if !stop.swap(true, Ordering::AcqRel) {
                let _ = found_tx.send(candidate);
                Ok(WorkerOutcome::Found)
            } else {
                Ok(WorkerOutcome::Aborted)
            };
        }
    }
    stats.record_attempts(since_poll);
    Ok(WorkerOutcome::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::Alphabet;
    use crossbeam_channel::bounded;
    use std::cell::Cell;
    use std::path::PathBuf;

    struct Scripted<F: FnMut(&str) -> Result<bool, CrackError>>(F);

    impl<F: FnMut(&str) -> Result<bool, CrackError>> PasswordCheck for Scripted<F> {
        fn check(&mut self, password: &str) -> Result<bool, CrackError> {
            (self.0)(password)
        }
    }

    fn binary3() -> Keyspace {
        Keyspace::new(Alphabet::new("01").unwrap(), 3).unwrap()
    }

    fn full_range(keyspace: &Keyspace) -> IndexRange {
        IndexRange { start: 0, end: keyspace.total() }
    }

    #[test]
    fn finds_and_publishes_the_hit() {
        let keyspace = binary3();
        let stop = AtomicBool::new(false);
        let stats = SearchStats::new();
        let (found_tx, found_rx) = bounded(1);

        let mut checker = Scripted(|pwd: &str| Ok(pwd == "101"));
        let outcome = search_range(
            &keyspace,
            full_range(&keyspace),
            &mut checker,
            &stop,
            1000,
            &found_tx,
            &stats,
        )
        .unwrap();

        assert_eq!(outcome, WorkerOutcome::Found);
        assert_eq!(found_rx.recv().unwrap(), "101");
        assert!(stop.load(Ordering::Acquire));
        assert_eq!(stats.attempts(), 6); // indices 0..=5 were tried
    }

    #[test]
    fn only_the_first_winner_publishes() {
        let keyspace = binary3();
        let stop = AtomicBool::new(false);
        let stats = SearchStats::new();
        let (found_tx, found_rx) = bounded(2);

        // Adversarial data: every candidate verifies.
        let mut checker = Scripted(|_: &str| Ok(true));
        let first = search_range(
            &keyspace,
            IndexRange { start: 0, end: 4 },
            &mut checker,
            &stop,
            1000,
            &found_tx,
            &stats,
        )
        .unwrap();
        let second = search_range(
            &keyspace,
            IndexRange { start: 4, end: 8 },
            &mut checker,
            &stop,
            1000,
            &found_tx,
            &stats,
        )
        .unwrap();

        assert_eq!(first, WorkerOutcome::Found);
        assert_eq!(second, WorkerOutcome::Aborted);
        assert_eq!(found_rx.recv().unwrap(), "000");
        assert!(found_rx.try_recv().is_err(), "loser must not publish");
    }

    #[test]
    fn stops_within_poll_interval_after_the_signal() {
        let keyspace = Keyspace::new(Alphabet::new("01").unwrap(), 10).unwrap();
        let stop = AtomicBool::new(false);
        let stats = SearchStats::new();
        let (found_tx, _found_rx) = bounded(1);

        let calls = Cell::new(0u64);
        let poll_interval = 10u64;
        // A third party raises the stop signal during the 3rd check.
        let mut checker = Scripted(|_: &str| {
            calls.set(calls.get() + 1);
            if calls.get() == 3 {
                stop.store(true, Ordering::Release);
            }
            Ok(false)
        });

        let outcome = search_range(
            &keyspace,
            full_range(&keyspace),
            &mut checker,
            &stop,
            poll_interval,
            &found_tx,
            &stats,
        )
        .unwrap();

        assert_eq!(outcome, WorkerOutcome::Aborted);
        assert!(
            calls.get() <= 3 + poll_interval,
            "worker made {} calls after the signal, bound is {}",
            calls.get() - 3,
            poll_interval
        );
    }

    #[test]
    fn exhausts_without_a_hit() {
        let keyspace = binary3();
        let stop = AtomicBool::new(false);
        let stats = SearchStats::new();
        let (found_tx, found_rx) = bounded(1);

        let mut checker = Scripted(|_: &str| Ok(false));
        let outcome = search_range(
            &keyspace,
            full_range(&keyspace),
            &mut checker,
            &stop,
            3,
            &found_tx,
            &stats,
        )
        .unwrap();

        assert_eq!(outcome, WorkerOutcome::Exhausted);
        assert!(found_rx.try_recv().is_err());
        assert!(!stop.load(Ordering::Acquire), "exhaustion never raises the stop signal");
        assert_eq!(stats.attempts(), keyspace.total());
    }

    #[test]
    fn fatal_verifier_error_ends_the_walk() {
        let keyspace = binary3();
        let stop = AtomicBool::new(false);
        let stats = SearchStats::new();
        let (found_tx, _found_rx) = bounded(1);

        let mut checker = Scripted(|pwd: &str| {
            if pwd == "010" {
                Err(CrackError::Archive {
                    reason: "central directory vanished".into(),
                    path: PathBuf::from("gone.zip"),
                })
            } else {
                Ok(false)
            }
        });

        let err = search_range(
            &keyspace,
            full_range(&keyspace),
            &mut checker,
            &stop,
            1000,
            &found_tx,
            &stats,
        )
        .unwrap_err();

        assert!(matches!(err, CrackError::Archive { .. }));
        assert_eq!(stats.attempts(), 3); // "000", "001", "010"
    }
}
