//! Message envelope: fixed 16-byte header plus a typed sensor payload

use crate::core::codec::{self, ByteReader};
use crate::core::sequence::SequenceCounter;
use crate::core::time::Timestamp;

/// Fixed-layout envelope header, 16 bytes little-endian on the wire:
/// timestamp at offset 0, sequence number at 8, type tag at 12,
/// reserved padding at 14.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub timestamp_ns: u64,
    pub sequence_number: u32,
    pub message_type: u16,
    pub reserved: u16,
}

impl MessageHeader {
    /// Encoded size in bytes
    pub const ENCODED_LEN: usize = 16;

    pub fn serialize(&self, buf: &mut Vec<u8>) {
        codec::put_u64(buf, self.timestamp_ns);
        codec::put_u32(buf, self.sequence_number);
        codec::put_u16(buf, self.message_type);
        codec::put_u16(buf, self.reserved);
    }

    /// Decode from the first 16 bytes, ignoring anything after them.
    /// Returns `None` when fewer than 16 bytes are given.
    pub fn deserialize(data: &[u8]) -> Option<Self> {
        let mut r = ByteReader::new(data);
        Some(Self {
            timestamp_ns: r.read_u64()?,
            sequence_number: r.read_u32()?,
            message_type: r.read_u16()?,
            reserved: r.read_u16()?,
        })
    }
}

/// The closed set of payload types an envelope can carry.
///
/// Implementations own their wire layout (sensor id first, then the fixed
/// fields in declaration order) and expose the per-type process-wide
/// sequence counter used when stamping headers.
pub trait SensorPayload: Default + Send + 'static {
    /// Producer-assigned sensor identifier, may be empty
    fn sensor_id(&self) -> &str;

    /// Payload-level capture timestamp. Independent of the header timestamp,
    /// which is stamped later at envelope construction. The two may diverge.
    fn timestamp_ns(&self) -> u64;

    /// Append the wire encoding to `buf`
    fn serialize(&self, buf: &mut Vec<u8>);

    /// Decode from `data`, `None` when bytes run out mid-field
    fn deserialize(data: &[u8]) -> Option<Self>;

    /// The process-wide sequence counter for this payload type
    fn sequence_counter() -> &'static SequenceCounter;
}

/// Typed envelope pairing a [`MessageHeader`] with one payload value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message<T: SensorPayload> {
    pub header: MessageHeader,
    pub payload: T,
}

impl<T: SensorPayload> Message<T> {
    /// Wrap a payload, stamping the header with the current time and the
    /// next sequence number for `T`.
    pub fn new(payload: T) -> Self {
        Self {
            header: MessageHeader {
                timestamp_ns: Timestamp::now().nanoseconds(),
                sequence_number: T::sequence_counter().next(),
                message_type: 0,
                reserved: 0,
            },
            payload,
        }
    }

    /// Append header then payload to `buf`. Pure append, existing buffer
    /// content is left in place.
    pub fn serialize(&self, buf: &mut Vec<u8>) {
        self.header.serialize(buf);
        self.payload.serialize(buf);
    }

    /// Decode a whole envelope. `None` when the header is short or the
    /// payload bytes do not decode.
    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < MessageHeader::ENCODED_LEN {
            return None;
        }
        let header = MessageHeader::deserialize(data)?;
        let payload = T::deserialize(&data[MessageHeader::ENCODED_LEN..])?;
        Some(Self { header, payload })
    }
}
