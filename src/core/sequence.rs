//! Per-payload-type sequence numbering

use std::sync::atomic::{AtomicU32, Ordering};

/// Monotonically increasing message counter
///
/// Each payload type owns one process-wide instance, reached through
/// [`SensorPayload::sequence_counter`](crate::core::message::SensorPayload).
/// Sequence numbers are therefore independent across payload types and not
/// comparable between them.
///
/// Deliberately not `Clone`: a copied counter would hand out duplicate
/// sequence numbers.
#[derive(Debug, Default)]
pub struct SequenceCounter(AtomicU32);

impl SequenceCounter {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Return the current value and increment. First call returns 0.
    pub fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn starts_at_zero_and_increments() {
        let counter = SequenceCounter::new();
        assert_eq!(counter.next(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
    }

    #[test]
    fn strictly_increasing() {
        let counter = SequenceCounter::new();
        let mut last = counter.next();
        for _ in 0..1000 {
            let next = counter.next();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn concurrent_next_yields_distinct_values() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1000;

        let counter = SequenceCounter::new();
        let seen = Mutex::new(HashSet::new());

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    let mut local = Vec::with_capacity(PER_THREAD);
                    for _ in 0..PER_THREAD {
                        local.push(counter.next());
                    }
                    seen.lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .extend(local);
                });
            }
        });

        let seen = seen.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(seen.len(), THREADS * PER_THREAD);
    }
}
