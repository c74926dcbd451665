//! Many-to-many forwarding proxy
//!
//! Publishers connect to the frontend endpoint and push their multipart
//! messages; everything is re-broadcast verbatim on a backend publishing
//! socket that subscribers connect to. Pure forwarder, no inspection.

use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::error::Result;
use crate::transport::socket::{endpoint_addr, PubSocket};
use crate::transport::{frame, StopSignal};

/// Poll granularity for idle frontend streams
const IDLE_WAIT: Duration = Duration::from_millis(5);

/// Messages forwarded from one publisher before moving to the next, so a
/// chatty publisher cannot starve the rest.
const BATCH_LIMIT: usize = 8;

pub struct Broker {
    frontend: String,
    backend: String,
}

impl Broker {
    pub fn new(frontend: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            frontend: frontend.into(),
            backend: backend.into(),
        }
    }

    /// Run the forwarding loop until `stop` is requested. Blocks the
    /// calling thread.
    pub fn run(&self, stop: &StopSignal) -> Result<()> {
        let frontend_addr = endpoint_addr(&self.frontend)?;
        let listener = TcpListener::bind(&frontend_addr)?;
        listener.set_nonblocking(true)?;
        let mut backend = PubSocket::bound(&self.backend)?;
        info!(
            "broker forwarding {} -> {}",
            self.frontend, self.backend
        );

        let mut publishers: Vec<TcpStream> = Vec::new();
        while !stop.is_requested() {
            self.accept_publishers(&listener, &mut publishers)?;

            let mut forwarded = false;
            let mut i = 0;
            while i < publishers.len() {
                match Self::forward_from(&mut publishers[i], &mut backend) {
                    Ok(n) => {
                        forwarded |= n > 0;
                        i += 1;
                    }
                    Err(e) => {
                        debug!("dropping publisher: {e}");
                        publishers.swap_remove(i);
                    }
                }
            }

            if !forwarded {
                thread::sleep(IDLE_WAIT);
            }
        }
        info!("broker stopped");
        Ok(())
    }

    fn accept_publishers(
        &self,
        listener: &TcpListener,
        publishers: &mut Vec<TcpStream>,
    ) -> Result<()> {
        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    stream.set_nonblocking(false)?;
                    stream.set_nodelay(true)?;
                    stream.set_read_timeout(Some(IDLE_WAIT))?;
                    info!("publisher connected from {peer}");
                    publishers.push(stream);
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Drain up to [`BATCH_LIMIT`] ready messages from one publisher
    fn forward_from(stream: &mut TcpStream, backend: &mut PubSocket) -> Result<usize> {
        let mut count = 0;
        while count < BATCH_LIMIT {
            match frame::read_message(stream)? {
                Some(parts) => {
                    let refs: Vec<&[u8]> = parts.iter().map(|p| p.as_slice()).collect();
                    backend.send_multipart(&refs, IDLE_WAIT)?;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}
