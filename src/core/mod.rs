//! Envelope core: timestamps, sequence numbering, wire codec, message types

pub mod codec;
pub mod message;
pub mod sequence;
pub mod time;

pub use message::{Message, MessageHeader, SensorPayload};
pub use sequence::SequenceCounter;
pub use time::Timestamp;
