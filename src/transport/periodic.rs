//! Background thread publishing generated payloads at a fixed interval

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};

use crate::core::message::{Message, SensorPayload};
use crate::error::Result;
use crate::transport::publisher::Publisher;
use crate::transport::StopSignal;

/// How long one nap lasts inside the sliced inter-cycle sleep
const SLEEP_SLICE: Duration = Duration::from_millis(20);

/// Generates a payload, wraps it in an envelope, publishes it on a fixed
/// topic, sleeps, repeats. One dedicated named thread per instance.
///
/// `stop()` requests cancellation and joins the thread; a publish already
/// in flight completes, no new cycle starts afterwards. Dropping the
/// instance stops it the same way.
pub struct PeriodicPublisher<T: SensorPayload> {
    publisher: Arc<Mutex<Publisher>>,
    topic: String,
    interval: Duration,
    generator: Arc<Mutex<Box<dyn FnMut() -> T + Send>>>,
    worker: Option<JoinHandle<()>>,
    stop: StopSignal,
}

impl<T: SensorPayload> PeriodicPublisher<T> {
    pub fn new<F>(
        publisher: Arc<Mutex<Publisher>>,
        topic: impl Into<String>,
        interval: Duration,
        generator: F,
    ) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        Self {
            publisher,
            topic: topic.into(),
            interval,
            generator: Arc::new(Mutex::new(Box::new(generator))),
            worker: None,
            stop: StopSignal::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some() && !self.stop.is_requested()
    }

    /// Spawn the publishing thread. Restartable after `stop()`; a second
    /// `start()` while running is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        self.stop = StopSignal::new();

        let stop = self.stop.clone();
        let publisher = Arc::clone(&self.publisher);
        let generator = Arc::clone(&self.generator);
        let topic = self.topic.clone();
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name(format!("periodic-{topic}"))
            .spawn(move || {
                info!("periodic publisher on '{topic}' started");
                while !stop.is_requested() {
                    let payload = (generator.lock().unwrap_or_else(|e| e.into_inner()))();
                    let message = Message::new(payload);
                    let outcome = publisher
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .publish(&topic, &message);
                    if let Err(e) = outcome {
                        debug!("publish on '{topic}' failed: {e}");
                    }

                    let mut slept = Duration::ZERO;
                    while slept < interval && !stop.is_requested() {
                        let nap = (interval - slept).min(SLEEP_SLICE);
                        thread::sleep(nap);
                        slept += nap;
                    }
                }
                info!("periodic publisher on '{topic}' stopped");
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Request cancellation and wait for the thread to exit
    pub fn stop(&mut self) {
        self.stop.request();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl<T: SensorPayload> Drop for PeriodicPublisher<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
