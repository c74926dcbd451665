//! Simulated IMU publishing samples on topic "imu"

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::time::Timestamp;
use crate::error::Result;
use crate::sensors::Sensor;
use crate::transport::{PeriodicPublisher, Publisher};
use crate::types::ImuData;

/// 100 Hz by default
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

pub struct ImuSensor {
    id: String,
    periodic: PeriodicPublisher<ImuData>,
}

impl ImuSensor {
    pub fn new(
        id: impl Into<String>,
        publisher: Arc<Mutex<Publisher>>,
        interval: Duration,
    ) -> Self {
        let id = id.into();
        let sensor_id = id.clone();
        let mut tick: u64 = 0;
        let periodic = PeriodicPublisher::new(publisher, "imu", interval, move || {
            // Gentle oscillation around gravity, deterministic per tick
            let t = tick as f32 * 0.01;
            tick = tick.wrapping_add(1);
            ImuData {
                sensor_id: sensor_id.clone(),
                timestamp_ns: Timestamp::now().nanoseconds(),
                accel_x: 0.05 * t.sin(),
                accel_y: 0.05 * t.cos(),
                accel_z: 9.81,
                gyro_x: 0.002 * (t * 0.5).sin(),
                gyro_y: 0.002 * (t * 0.5).cos(),
                gyro_z: 0.001 * t.sin(),
            }
        });
        Self { id, periodic }
    }
}

impl Sensor for ImuSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "imu"
    }

    fn start(&mut self) -> Result<()> {
        self.periodic.start()
    }

    fn stop(&mut self) {
        self.periodic.stop();
    }

    fn is_active(&self) -> bool {
        self.periodic.is_running()
    }
}
