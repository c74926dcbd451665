//! Inertial measurement payload

use crate::core::codec::{self, ByteReader};
use crate::core::message::SensorPayload;
use crate::core::sequence::SequenceCounter;

static IMU_SEQUENCE: SequenceCounter = SequenceCounter::new();

/// One accelerometer + gyroscope sample. Acceleration in m/s^2, angular
/// rate in rad/s. Wire order: sensor_id, timestamp_ns, accel x/y/z,
/// gyro x/y/z.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImuData {
    pub sensor_id: String,
    pub timestamp_ns: u64,
    pub accel_x: f32,
    pub accel_y: f32,
    pub accel_z: f32,
    pub gyro_x: f32,
    pub gyro_y: f32,
    pub gyro_z: f32,
}

impl SensorPayload for ImuData {
    fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    fn serialize(&self, buf: &mut Vec<u8>) {
        codec::put_str(buf, &self.sensor_id);
        codec::put_u64(buf, self.timestamp_ns);
        codec::put_f32(buf, self.accel_x);
        codec::put_f32(buf, self.accel_y);
        codec::put_f32(buf, self.accel_z);
        codec::put_f32(buf, self.gyro_x);
        codec::put_f32(buf, self.gyro_y);
        codec::put_f32(buf, self.gyro_z);
    }

    fn deserialize(data: &[u8]) -> Option<Self> {
        let mut r = ByteReader::new(data);
        Some(Self {
            sensor_id: r.read_string()?,
            timestamp_ns: r.read_u64()?,
            accel_x: r.read_f32()?,
            accel_y: r.read_f32()?,
            accel_z: r.read_f32()?,
            gyro_x: r.read_f32()?,
            gyro_y: r.read_f32()?,
            gyro_z: r.read_f32()?,
        })
    }

    fn sequence_counter() -> &'static SequenceCounter {
        &IMU_SEQUENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let sample = ImuData {
            sensor_id: "imu0".into(),
            timestamp_ns: 1_000_000,
            accel_x: 0.01,
            accel_y: -0.02,
            accel_z: 9.81,
            gyro_x: 0.001,
            gyro_y: 0.002,
            gyro_z: -0.003,
        };
        let mut buf = Vec::new();
        sample.serialize(&mut buf);
        assert_eq!(ImuData::deserialize(&buf), Some(sample));
    }

    #[test]
    fn f32_extremes_survive_bit_for_bit() {
        let sample = ImuData {
            sensor_id: "imu0".into(),
            timestamp_ns: 0,
            accel_x: f32::MAX,
            accel_y: f32::MIN,
            accel_z: f32::MIN_POSITIVE,
            gyro_x: f32::EPSILON,
            gyro_y: f32::INFINITY,
            gyro_z: f32::NEG_INFINITY,
        };
        let mut buf = Vec::new();
        sample.serialize(&mut buf);
        let back = ImuData::deserialize(&buf).unwrap();
        assert_eq!(back.accel_x.to_bits(), sample.accel_x.to_bits());
        assert_eq!(back.accel_y.to_bits(), sample.accel_y.to_bits());
        assert_eq!(back.accel_z.to_bits(), sample.accel_z.to_bits());
        assert_eq!(back.gyro_x.to_bits(), sample.gyro_x.to_bits());
        assert_eq!(back.gyro_y.to_bits(), sample.gyro_y.to_bits());
        assert_eq!(back.gyro_z.to_bits(), sample.gyro_z.to_bits());
    }

    #[test]
    fn truncated_input_fails() {
        let sample = ImuData {
            sensor_id: "imu".into(),
            ..Default::default()
        };
        let mut buf = Vec::new();
        sample.serialize(&mut buf);
        for len in 0..buf.len() {
            assert!(ImuData::deserialize(&buf[..len]).is_none());
        }
    }
}
