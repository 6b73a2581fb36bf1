//! Strictly increasing nanosecond timestamps.
//!
//! Event timestamps double as archive keys, so two events built within the
//! same wall-clock tick must still get distinct, ordered timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Wall clock with a tie-break: every reading is strictly greater than the
/// previous one, even if the wall clock stalls or steps backwards.
#[derive(Debug)]
pub struct MonotonicClock {
    last: AtomicI64,
}

static PROCESS_CLOCK: MonotonicClock = MonotonicClock::new();

impl MonotonicClock {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(i64::MIN),
        }
    }

    /// Clock shared by every event built in this process.
    pub fn process() -> &'static MonotonicClock {
        &PROCESS_CLOCK
    }

    /// Current UTC time in nanoseconds since the Unix epoch, bumped by one
    /// nanosecond past the last reading when needed.
    pub fn now_nanos(&self) -> i64 {
        // `None` only past year 2262.
        let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);

        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let next = wall.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    #[test]
    fn readings_strictly_increase() {
        let clock = MonotonicClock::new();
        let mut prev = clock.now_nanos();
        for _ in 0..10_000 {
            let next = clock.now_nanos();
            assert!(next > prev, "{next} <= {prev}");
            prev = next;
        }
    }

    #[test]
    fn concurrent_readings_are_unique() {
        let clock = Arc::new(MonotonicClock::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let clock = clock.clone();
                std::thread::spawn(move || (0..1_000).map(|_| clock.now_nanos()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = BTreeSet::new();
        for handle in handles {
            for nanos in handle.join().unwrap() {
                assert!(seen.insert(nanos), "duplicate timestamp {nanos}");
            }
        }
        assert_eq!(seen.len(), 8_000);
    }

    #[test]
    fn tracks_wall_clock() {
        let before = Utc::now().timestamp_nanos_opt().unwrap();
        let reading = MonotonicClock::new().now_nanos();
        assert!(reading >= before);
    }
}
