//! Subscribing endpoint with topic filtering and a bounded-receive loop

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::{info, warn};

use crate::config::SubscriberConfig;
use crate::core::message::{Message, SensorPayload};
use crate::error::{Error, Result};
use crate::transport::socket::SubSocket;
use crate::transport::{timeout_from_ms, StopSignal, POLL_SLICE};

/// Topic-filtered message consumer
///
/// Tracks its own subscription set so `unsubscribe` of a topic that was
/// never subscribed is an error regardless of what the socket would allow.
pub struct Subscriber {
    config: SubscriberConfig,
    socket: Option<SubSocket>,
    subscriptions: HashSet<String>,
    messages_received: AtomicU64,
}

impl Subscriber {
    pub fn new(config: SubscriberConfig) -> Self {
        Self {
            config,
            socket: None,
            subscriptions: HashSet::new(),
            messages_received: AtomicU64::new(0),
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        let socket = SubSocket::connect(
            &self.config.endpoint,
            self.config.high_water_mark,
            self.config.conflate,
        )?;
        info!("subscriber connected to {}", self.config.endpoint);
        self.socket = Some(socket);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Register a topic prefix. Empty prefix matches every topic.
    pub fn subscribe(&mut self, prefix: &str) -> Result<()> {
        let socket = self.socket.as_mut().ok_or(Error::NotConnected)?;
        socket.subscribe(prefix);
        self.subscriptions.insert(prefix.to_string());
        Ok(())
    }

    /// Remove a previously registered prefix. Fails if the exact prefix
    /// string was never subscribed on this instance.
    pub fn unsubscribe(&mut self, prefix: &str) -> Result<()> {
        let socket = self.socket.as_mut().ok_or(Error::NotConnected)?;
        if !self.subscriptions.remove(prefix) {
            return Err(Error::NotSubscribed(prefix.to_string()));
        }
        socket.unsubscribe(prefix);
        Ok(())
    }

    /// Receive and deserialize one typed envelope. `None` on timeout,
    /// stop request, protocol violation, or decode failure.
    pub fn receive<T: SensorPayload>(&mut self, stop: &StopSignal) -> Option<Message<T>> {
        let data = self.receive_raw(stop)?;
        Message::<T>::deserialize(&data)
    }

    /// Receive the data part of one well-formed two-part message.
    ///
    /// Polls in bounded slices against the configured receive timeout,
    /// checking `stop` at every slice boundary. A message with any part
    /// count other than two is discarded whole and reported as `None`;
    /// the stream stays framed for later calls.
    pub fn receive_raw(&mut self, stop: &StopSignal) -> Option<Vec<u8>> {
        let socket = self.socket.as_mut()?;
        let total = timeout_from_ms(self.config.receive_timeout_ms);
        let start = Instant::now();

        while !stop.is_requested() {
            let slice = match total {
                None => POLL_SLICE,
                Some(t) => t.saturating_sub(start.elapsed()).min(POLL_SLICE),
            };
            match socket.recv_multipart(slice) {
                Ok(Some(parts)) => {
                    if parts.len() != 2 {
                        warn!("discarding message with {} parts", parts.len());
                        return None;
                    }
                    self.messages_received.fetch_add(1, Ordering::Relaxed);
                    return parts.into_iter().nth(1);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("receive failed: {e}");
                    return None;
                }
            }
            if let Some(t) = total {
                if start.elapsed() >= t {
                    return None;
                }
            }
        }
        None
    }

    /// Well-formed two-part messages received over this instance's lifetime
    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }
}
