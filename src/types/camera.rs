//! Camera frame metadata payload

use crate::core::codec::{self, ByteReader};
use crate::core::message::SensorPayload;
use crate::core::sequence::SequenceCounter;

static CAMERA_SEQUENCE: SequenceCounter = SequenceCounter::new();

/// Per-frame camera metadata. Wire order: sensor_id, timestamp_ns,
/// frame_id, width, height, encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraFrameData {
    pub sensor_id: String,
    /// Capture time set by the producer, may differ from the envelope header
    pub timestamp_ns: u64,
    pub frame_id: u32,
    pub width: u32,
    pub height: u32,
    /// Pixel format label, e.g. "RGB8"
    pub encoding: String,
}

impl SensorPayload for CameraFrameData {
    fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    fn serialize(&self, buf: &mut Vec<u8>) {
        codec::put_str(buf, &self.sensor_id);
        codec::put_u64(buf, self.timestamp_ns);
        codec::put_u32(buf, self.frame_id);
        codec::put_u32(buf, self.width);
        codec::put_u32(buf, self.height);
        codec::put_str(buf, &self.encoding);
    }

    fn deserialize(data: &[u8]) -> Option<Self> {
        let mut r = ByteReader::new(data);
        Some(Self {
            sensor_id: r.read_string()?,
            timestamp_ns: r.read_u64()?,
            frame_id: r.read_u32()?,
            width: r.read_u32()?,
            height: r.read_u32()?,
            encoding: r.read_string()?,
        })
    }

    fn sequence_counter() -> &'static SequenceCounter {
        &CAMERA_SEQUENCE
    }
}
