//! Lidar scan summary payload

use crate::core::codec::{self, ByteReader};
use crate::core::message::SensorPayload;
use crate::core::sequence::SequenceCounter;

static LIDAR_SEQUENCE: SequenceCounter = SequenceCounter::new();

/// Per-revolution scan summary. Wire order: sensor_id, timestamp_ns,
/// num_points, scan_duration_ms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LidarScanData {
    pub sensor_id: String,
    pub timestamp_ns: u64,
    pub num_points: u32,
    pub scan_duration_ms: f32,
}

impl SensorPayload for LidarScanData {
    fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    fn serialize(&self, buf: &mut Vec<u8>) {
        codec::put_str(buf, &self.sensor_id);
        codec::put_u64(buf, self.timestamp_ns);
        codec::put_u32(buf, self.num_points);
        codec::put_f32(buf, self.scan_duration_ms);
    }

    fn deserialize(data: &[u8]) -> Option<Self> {
        let mut r = ByteReader::new(data);
        Some(Self {
            sensor_id: r.read_string()?,
            timestamp_ns: r.read_u64()?,
            num_points: r.read_u32()?,
            scan_duration_ms: r.read_f32()?,
        })
    }

    fn sequence_counter() -> &'static SequenceCounter {
        &LIDAR_SEQUENCE
    }
}
