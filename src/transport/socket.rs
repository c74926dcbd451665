//! TCP pub/sub socket primitive
//!
//! A publishing socket either binds a listener and fans out to every
//! connected subscriber, or connects upstream to a broker frontend. A
//! subscribing socket connects to a publisher (or broker backend) and
//! filters arriving messages by topic prefix on its own side.

use std::collections::{HashSet, VecDeque};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::frame;

/// Translate a `tcp://host:port` endpoint into a socket address string.
/// `*` as host means bind all interfaces.
pub(crate) fn endpoint_addr(endpoint: &str) -> Result<String> {
    let rest = endpoint
        .strip_prefix("tcp://")
        .ok_or_else(|| Error::InvalidEndpoint(endpoint.to_string()))?;
    let (host, port) = rest
        .rsplit_once(':')
        .ok_or_else(|| Error::InvalidEndpoint(endpoint.to_string()))?;
    if host.is_empty() || port.is_empty() || port.parse::<u16>().is_err() {
        return Err(Error::InvalidEndpoint(endpoint.to_string()));
    }
    let host = if host == "*" { "0.0.0.0" } else { host };
    Ok(format!("{host}:{port}"))
}

fn min_timeout(slice: Duration) -> Duration {
    // set_read_timeout / set_write_timeout reject a zero duration
    slice.max(Duration::from_millis(1))
}

enum Role {
    /// Server: accept subscribers, fan out every send
    Listening {
        listener: TcpListener,
        clients: Vec<TcpStream>,
    },
    /// Client: single stream up to a broker frontend
    Upstream(TcpStream),
}

/// Publish side of the socket pair
pub struct PubSocket {
    role: Role,
}

impl PubSocket {
    /// Bind a listener on the endpoint. Port 0 picks an ephemeral port,
    /// queryable through [`local_addr`](Self::local_addr).
    pub fn bound(endpoint: &str) -> Result<Self> {
        let addr = endpoint_addr(endpoint)?;
        let listener = TcpListener::bind(&addr)?;
        listener.set_nonblocking(true)?;
        debug!("pub socket listening on {addr}");
        Ok(Self {
            role: Role::Listening {
                listener,
                clients: Vec::new(),
            },
        })
    }

    /// Connect upstream to a broker frontend
    pub fn connected(endpoint: &str) -> Result<Self> {
        let addr = endpoint_addr(endpoint)?;
        let stream = TcpStream::connect(&addr)?;
        stream.set_nodelay(true)?;
        debug!("pub socket connected to {addr}");
        Ok(Self {
            role: Role::Upstream(stream),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        match &self.role {
            Role::Listening { listener, .. } => Ok(listener.local_addr()?),
            Role::Upstream(stream) => Ok(stream.local_addr()?),
        }
    }

    fn accept_pending(listener: &TcpListener, clients: &mut Vec<TcpStream>) -> Result<()> {
        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    stream.set_nonblocking(false)?;
                    stream.set_nodelay(true)?;
                    debug!("subscriber connected from {peer}");
                    clients.push(stream);
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Send one multipart message, waiting at most `slice` for writability.
    ///
    /// Listening role: newly connected subscribers are accepted first, then
    /// the message is written to every client; clients that fail are
    /// dropped, clients that merely stall skip this message. Always reports
    /// `Ok(true)` since delivery to zero subscribers is still a send.
    ///
    /// Upstream role: `Ok(false)` when the upstream would block before any
    /// byte was written, so the caller can retry within its total timeout.
    pub fn send_multipart(&mut self, parts: &[&[u8]], slice: Duration) -> Result<bool> {
        let slice = min_timeout(slice);
        match &mut self.role {
            Role::Listening { listener, clients } => {
                Self::accept_pending(listener, clients)?;
                let mut keep = Vec::with_capacity(clients.len());
                for mut client in clients.drain(..) {
                    client.set_write_timeout(Some(slice))?;
                    match frame::write_message(&mut client, parts) {
                        Ok(true) => keep.push(client),
                        Ok(false) => {
                            // Stalled but alive, drop the message not the client
                            trace!("slow subscriber, message skipped");
                            keep.push(client);
                        }
                        Err(e) => {
                            debug!("dropping subscriber: {e}");
                        }
                    }
                }
                *clients = keep;
                Ok(true)
            }
            Role::Upstream(stream) => {
                stream.set_write_timeout(Some(slice))?;
                Ok(frame::write_message(stream, parts)?)
            }
        }
    }
}

/// Subscribe side of the socket pair
pub struct SubSocket {
    stream: TcpStream,
    subscriptions: HashSet<Vec<u8>>,
    queue: VecDeque<Vec<Vec<u8>>>,
    high_water_mark: usize,
    conflate: bool,
}

impl SubSocket {
    pub fn connect(endpoint: &str, high_water_mark: usize, conflate: bool) -> Result<Self> {
        let addr = endpoint_addr(endpoint)?;
        let stream = TcpStream::connect(&addr)?;
        stream.set_nodelay(true)?;
        debug!("sub socket connected to {addr}");
        Ok(Self {
            stream,
            subscriptions: HashSet::new(),
            queue: VecDeque::new(),
            high_water_mark: high_water_mark.max(1),
            conflate,
        })
    }

    pub fn subscribe(&mut self, prefix: &str) {
        self.subscriptions.insert(prefix.as_bytes().to_vec());
    }

    pub fn unsubscribe(&mut self, prefix: &str) -> bool {
        self.subscriptions.remove(prefix.as_bytes())
    }

    /// No subscriptions means nothing is delivered; an empty prefix
    /// matches every topic.
    fn matches(&self, parts: &[Vec<u8>]) -> bool {
        let topic = match parts.first() {
            Some(t) => t,
            None => return false,
        };
        self.subscriptions
            .iter()
            .any(|prefix| topic.starts_with(prefix))
    }

    fn enqueue(&mut self, parts: Vec<Vec<u8>>) {
        if self.conflate {
            if let Some(topic) = parts.first().cloned() {
                self.queue.retain(|m| m.first() != Some(&topic));
            }
        }
        self.queue.push_back(parts);
        while self.queue.len() > self.high_water_mark {
            self.queue.pop_front();
        }
    }

    /// Receive at most one complete multipart message within `slice`.
    /// Filtered-out messages consume the attempt and report `None`; the
    /// caller's outer loop retries against its total timeout.
    pub fn recv_multipart(&mut self, slice: Duration) -> Result<Option<Vec<Vec<u8>>>> {
        if let Some(msg) = self.queue.pop_front() {
            return Ok(Some(msg));
        }

        self.stream.set_read_timeout(Some(min_timeout(slice)))?;
        let parts = match frame::read_message(&mut self.stream)? {
            Some(parts) => parts,
            None => return Ok(None),
        };
        if self.matches(&parts) {
            self.enqueue(parts);
        }

        if self.conflate {
            self.drain_ready()?;
        }

        Ok(self.queue.pop_front())
    }

    /// In conflate mode pull everything already buffered on the stream so
    /// only the newest message per topic survives in the queue.
    fn drain_ready(&mut self) -> Result<()> {
        self.stream.set_read_timeout(Some(Duration::from_millis(1)))?;
        for _ in 0..64 {
            match frame::read_message(&mut self.stream) {
                Ok(Some(parts)) => {
                    if self.matches(&parts) {
                        self.enqueue(parts);
                    }
                }
                Ok(None) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
