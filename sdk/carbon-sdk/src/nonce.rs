//! Client-chosen submission nonces.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Strictly increasing nonce source seeded from wall-clock seconds.
///
/// The submission address's uniqueness on the ledger is the real
/// idempotency mechanism; this source only has to avoid handing out the
/// same value twice within a process. A collision with a foreign writer
/// still surfaces as `DuplicateNonce` and is the orchestrator's problem,
/// never silently remapped here.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        NonceSource::default()
    }

    /// Start above `floor`, regardless of the clock. Deterministic nonce
    /// streams for tests and replay tooling.
    pub fn starting_at(floor: u64) -> Self {
        NonceSource {
            last: AtomicU64::new(floor),
        }
    }

    /// Next nonce: wall-clock seconds, bumped past the previous value when
    /// the clock stalls or runs behind.
    pub fn next(&self) -> u64 {
        let now = unix_seconds();
        loop {
            let last = self.last.load(Ordering::Acquire);
            let candidate = if now > last { now } else { last + 1 };
            if self
                .last
                .compare_exchange(last, candidate, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return candidate;
            }
        }
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapid_calls_stay_strictly_increasing() {
        let source = NonceSource::new();
        let mut previous = source.next();
        for _ in 0..1_000 {
            let next = source.next();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_floor_dominates_a_behind_clock() {
        let floor = u64::MAX / 2;
        let source = NonceSource::starting_at(floor);
        assert_eq!(source.next(), floor + 1);
        assert_eq!(source.next(), floor + 2);
    }

    #[test]
    fn test_seeded_from_wall_clock() {
        let before = unix_seconds();
        let nonce = NonceSource::new().next();
        assert!(nonce >= before);
    }
}
