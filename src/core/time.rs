//! Monotonic nanosecond timestamps

use std::sync::OnceLock;
use std::time::Instant;

/// Anchor instant captured on first use. All `Timestamp::now()` readings are
/// nanoseconds elapsed since this point, so values are comparable within a
/// process run but carry no wall-clock meaning.
fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Monotonic-clock timestamp with nanosecond resolution
///
/// Within a single process, `now()` readings never decrease. Values built
/// with [`Timestamp::from_nanoseconds`] (e.g. from a deserialized header)
/// are arbitrary and only ordered relative to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Capture the current monotonic clock reading
    pub fn now() -> Self {
        Self(epoch().elapsed().as_nanos() as u64)
    }

    /// Construct from a raw nanosecond count
    pub fn from_nanoseconds(ns: u64) -> Self {
        Self(ns)
    }

    /// Nanoseconds since the process epoch
    pub fn nanoseconds(&self) -> u64 {
        self.0
    }

    /// Value converted to floating-point seconds
    pub fn seconds(&self) -> f64 {
        self.0 as f64 / 1e9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_monotonic() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        let c = Timestamp::now();
        assert!(a <= b);
        assert!(b <= c);
    }

    #[test]
    fn raw_construction_round_trips() {
        let ts = Timestamp::from_nanoseconds(1_500_000_000);
        assert_eq!(ts.nanoseconds(), 1_500_000_000);
        assert!((ts.seconds() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn ordering_follows_nanosecond_value() {
        assert!(Timestamp::from_nanoseconds(1) < Timestamp::from_nanoseconds(2));
        assert_eq!(
            Timestamp::from_nanoseconds(7),
            Timestamp::from_nanoseconds(7)
        );
    }
}
