//! Stream framing for multipart messages
//!
//! Each part on the wire is `[u32 big-endian length][u8 flags][bytes]`.
//! Flags bit 0 set means more parts follow; a multipart message is a run of
//! parts ending with the bit clear. Readers always consume whole messages,
//! so a malformed part count can never desynchronize the stream.

use std::io::{self, Read, Write};
use std::net::TcpStream;

/// More parts follow in the same message
pub const FLAG_MORE: u8 = 0x01;

const PART_HEADER_LEN: usize = 5;

/// Upper bound on a single part body
pub const MAX_PART_LEN: usize = 16 * 1024 * 1024;

/// Retries allowed once a message is partially transferred. A peer that
/// stalls mid-message this long is treated as broken.
const MAX_MID_MESSAGE_STALLS: u32 = 50;

/// Encode a whole multipart message into one contiguous buffer
pub fn encode_message(parts: &[&[u8]]) -> io::Result<Vec<u8>> {
    let total: usize = parts
        .iter()
        .map(|p| PART_HEADER_LEN + p.len())
        .sum();
    let mut buf = Vec::with_capacity(total);
    for (i, part) in parts.iter().enumerate() {
        if part.len() > MAX_PART_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "message part exceeds size limit",
            ));
        }
        let flags = if i + 1 < parts.len() { FLAG_MORE } else { 0 };
        buf.extend_from_slice(&(part.len() as u32).to_be_bytes());
        buf.push(flags);
        buf.extend_from_slice(part);
    }
    Ok(buf)
}

/// Write a full multipart message.
///
/// Returns `Ok(false)` when the write timed out before any byte went out,
/// so the caller can retry the whole message within its own budget. Once
/// bytes are on the wire the message must complete; a persistent stall
/// becomes a `TimedOut` error.
pub fn write_message(stream: &mut TcpStream, parts: &[&[u8]]) -> io::Result<bool> {
    let buf = encode_message(parts)?;
    let mut written = 0;
    let mut stalls = 0;
    while written < buf.len() {
        match stream.write(&buf[written..]) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => {
                written += n;
                stalls = 0;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                if written == 0 {
                    return Ok(false);
                }
                stalls += 1;
                if stalls >= MAX_MID_MESSAGE_STALLS {
                    return Err(io::ErrorKind::TimedOut.into());
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Fill `buf` completely from the stream.
///
/// `Ok(false)` means a clean timeout before the first byte of the message
/// (`committed == false` and nothing read yet). After any byte has arrived
/// the fill keeps retrying up to the stall cap, then fails with `TimedOut`.
fn fill(stream: &mut TcpStream, buf: &mut [u8], mut committed: bool) -> io::Result<bool> {
    let mut filled = 0;
    let mut stalls = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => {
                filled += n;
                committed = true;
                stalls = 0;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                if !committed {
                    return Ok(false);
                }
                stalls += 1;
                if stalls >= MAX_MID_MESSAGE_STALLS {
                    return Err(io::ErrorKind::TimedOut.into());
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Read one complete multipart message.
///
/// `Ok(None)` means the configured read timeout elapsed before a message
/// started. Once the first header byte arrives the whole message is read
/// through, every part of it, before returning.
pub fn read_message(stream: &mut TcpStream) -> io::Result<Option<Vec<Vec<u8>>>> {
    let mut parts = Vec::new();
    let mut committed = false;
    loop {
        let mut header = [0u8; PART_HEADER_LEN];
        if !fill(stream, &mut header, committed)? {
            return Ok(None);
        }
        committed = true;

        let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let flags = header[4];
        if len > MAX_PART_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "message part exceeds size limit",
            ));
        }

        let mut body = vec![0u8; len];
        fill(stream, &mut body, true)?;
        parts.push(body);

        if flags & FLAG_MORE == 0 {
            return Ok(Some(parts));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Duration;

    fn stream_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn encode_layout() {
        let buf = encode_message(&[b"topic", b"data"]).unwrap();
        assert_eq!(&buf[0..4], 5u32.to_be_bytes());
        assert_eq!(buf[4], FLAG_MORE);
        assert_eq!(&buf[5..10], b"topic");
        assert_eq!(&buf[10..14], 4u32.to_be_bytes());
        assert_eq!(buf[14], 0);
        assert_eq!(&buf[15..19], b"data");
    }

    #[test]
    fn round_trip_over_loopback() {
        let (mut tx, mut rx) = stream_pair();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        assert!(write_message(&mut tx, &[b"camera", &[1, 2, 3]]).unwrap());
        let parts = read_message(&mut rx).unwrap().unwrap();
        assert_eq!(parts, vec![b"camera".to_vec(), vec![1, 2, 3]]);
    }

    #[test]
    fn empty_parts_round_trip() {
        let (mut tx, mut rx) = stream_pair();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        assert!(write_message(&mut tx, &[b"", b""]).unwrap());
        let parts = read_message(&mut rx).unwrap().unwrap();
        assert_eq!(parts, vec![Vec::<u8>::new(), Vec::new()]);
    }

    #[test]
    fn three_part_message_is_read_whole() {
        let (mut tx, mut rx) = stream_pair();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        assert!(write_message(&mut tx, &[b"a", b"b", b"c"]).unwrap());
        assert!(write_message(&mut tx, &[b"next", b"ok"]).unwrap());

        let first = read_message(&mut rx).unwrap().unwrap();
        assert_eq!(first.len(), 3);
        // Stream still framed for the following message
        let second = read_message(&mut rx).unwrap().unwrap();
        assert_eq!(second, vec![b"next".to_vec(), b"ok".to_vec()]);
    }

    #[test]
    fn quiet_stream_times_out_cleanly() {
        let (_tx, mut rx) = stream_pair();
        rx.set_read_timeout(Some(Duration::from_millis(30))).unwrap();
        assert!(read_message(&mut rx).unwrap().is_none());
    }

    #[test]
    fn closed_peer_is_an_error() {
        let (tx, mut rx) = stream_pair();
        drop(tx);
        rx.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
        assert!(read_message(&mut rx).is_err());
    }

    #[test]
    fn oversized_part_rejected_at_encode() {
        let big = vec![0u8; MAX_PART_LEN + 1];
        assert!(encode_message(&[&big]).is_err());
    }
}
