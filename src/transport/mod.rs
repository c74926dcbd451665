//! Publish/subscribe transport over TCP
//!
//! [`Publisher`] and [`Subscriber`] wrap the socket primitive with the
//! timeout and counter discipline producers and consumers rely on;
//! [`PeriodicPublisher`] drives a publisher from a background thread and
//! [`Broker`] forwards between many publishers and many subscribers.

pub mod broker;
pub mod frame;
pub mod periodic;
pub mod publisher;
pub mod socket;
pub mod subscriber;

pub use broker::Broker;
pub use periodic::PeriodicPublisher;
pub use publisher::Publisher;
pub use socket::{PubSocket, SubSocket};
pub use subscriber::Subscriber;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a single poll wait, so cancellation and total-timeout
/// checks happen promptly even under long or infinite timeouts.
pub(crate) const POLL_SLICE: Duration = Duration::from_millis(100);

/// Interpret a configured timeout in milliseconds. Negative means wait
/// forever.
pub(crate) fn timeout_from_ms(ms: i64) -> Option<Duration> {
    if ms < 0 {
        None
    } else {
        Some(Duration::from_millis(ms as u64))
    }
}

/// Cooperative cancellation token shared between threads
///
/// Cloning hands out another handle to the same flag. Once requested, a
/// signal stays requested.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_signal_is_shared_across_clones() {
        let signal = StopSignal::new();
        let other = signal.clone();
        assert!(!other.is_requested());
        signal.request();
        assert!(other.is_requested());
    }

    #[test]
    fn timeout_interpretation() {
        assert_eq!(timeout_from_ms(-1), None);
        assert_eq!(timeout_from_ms(0), Some(Duration::ZERO));
        assert_eq!(timeout_from_ms(250), Some(Duration::from_millis(250)));
    }
}
