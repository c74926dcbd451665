//! Publishing endpoint with a bounded-send discipline

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::info;

use crate::config::PublisherConfig;
use crate::core::message::{Message, SensorPayload};
use crate::error::{Error, Result};
use crate::transport::socket::PubSocket;
use crate::transport::{timeout_from_ms, POLL_SLICE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Detached,
    Bound,
    Connected,
}

/// Topic-labelled message publisher
///
/// Either binds as a server subscribers connect to directly, or connects
/// as a client feeding a broker frontend. Publishing before `bind` or
/// `connect` succeeds is an immediate error with no I/O attempted.
pub struct Publisher {
    config: PublisherConfig,
    socket: Option<PubSocket>,
    state: State,
    messages_sent: AtomicU64,
}

impl Publisher {
    pub fn new(config: PublisherConfig) -> Self {
        Self {
            config,
            socket: None,
            state: State::Detached,
            messages_sent: AtomicU64::new(0),
        }
    }

    /// Bind the configured endpoint in server role
    pub fn bind(&mut self) -> Result<()> {
        let socket = PubSocket::bound(&self.config.endpoint)?;
        info!("publisher bound to {}", self.config.endpoint);
        self.socket = Some(socket);
        self.state = State::Bound;
        Ok(())
    }

    /// Connect the configured endpoint in client role
    pub fn connect(&mut self) -> Result<()> {
        let socket = PubSocket::connected(&self.config.endpoint)?;
        info!("publisher connected to {}", self.config.endpoint);
        self.socket = Some(socket);
        self.state = State::Connected;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.state != State::Detached
    }

    /// Bound socket address, useful when the endpoint used port 0
    pub fn local_addr(&self) -> Result<SocketAddr> {
        match &self.socket {
            Some(socket) => socket.local_addr(),
            None => Err(Error::NotConnected),
        }
    }

    /// Serialize an envelope and publish it under `topic`
    pub fn publish<T: SensorPayload>(&mut self, topic: &str, message: &Message<T>) -> Result<()> {
        let mut buf = Vec::new();
        message.serialize(&mut buf);
        self.publish_raw(topic, &buf)
    }

    /// Publish raw bytes under `topic` as a two-part send (topic part,
    /// data part). Retries in bounded slices until the configured send
    /// timeout elapses; a negative timeout retries forever.
    pub fn publish_raw(&mut self, topic: &str, data: &[u8]) -> Result<()> {
        let socket = match (self.state, self.socket.as_mut()) {
            (State::Detached, _) | (_, None) => return Err(Error::NotConnected),
            (_, Some(socket)) => socket,
        };

        let total = timeout_from_ms(self.config.send_timeout_ms);
        let start = Instant::now();
        loop {
            let slice = match total {
                None => POLL_SLICE,
                Some(t) => t.saturating_sub(start.elapsed()).min(POLL_SLICE),
            };
            if socket.send_multipart(&[topic.as_bytes(), data], slice)? {
                self.messages_sent.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            if let Some(t) = total {
                if start.elapsed() >= t {
                    return Err(Error::Timeout);
                }
            }
        }
    }

    /// Messages successfully published over this instance's lifetime
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_before_bind_fails_without_io() {
        let mut publisher = Publisher::new(PublisherConfig::default());
        assert!(matches!(
            publisher.publish_raw("topic", &[1, 2, 3]),
            Err(Error::NotConnected)
        ));
        assert_eq!(publisher.messages_sent(), 0);
        assert!(!publisher.is_active());
    }

    #[test]
    fn bind_invalid_endpoint_leaves_publisher_unusable() {
        let mut publisher = Publisher::new(PublisherConfig {
            endpoint: "bogus://nowhere".into(),
            ..Default::default()
        });
        assert!(publisher.bind().is_err());
        assert!(!publisher.is_active());
        assert!(matches!(
            publisher.publish_raw("t", &[]),
            Err(Error::NotConnected)
        ));
    }

    #[test]
    fn bind_ephemeral_port_and_count_sends() {
        let mut publisher = Publisher::new(PublisherConfig {
            endpoint: "tcp://127.0.0.1:0".into(),
            ..Default::default()
        });
        publisher.bind().unwrap();
        assert!(publisher.is_active());
        assert_ne!(publisher.local_addr().unwrap().port(), 0);

        // No subscribers connected: still a successful send
        publisher.publish_raw("topic", &[0xDE]).unwrap();
        publisher.publish_raw("topic", &[0xAD]).unwrap();
        assert_eq!(publisher.messages_sent(), 2);
    }
}
