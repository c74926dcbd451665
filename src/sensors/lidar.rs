//! Simulated lidar publishing scan summaries on topic "lidar"

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::time::Timestamp;
use crate::error::Result;
use crate::sensors::Sensor;
use crate::transport::{PeriodicPublisher, Publisher};
use crate::types::LidarScanData;

/// One full revolution every 100 ms by default
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Points per simulated revolution (0.25 degree resolution)
const POINTS_PER_SCAN: u32 = 1440;

pub struct LidarSensor {
    id: String,
    periodic: PeriodicPublisher<LidarScanData>,
}

impl LidarSensor {
    pub fn new(
        id: impl Into<String>,
        publisher: Arc<Mutex<Publisher>>,
        interval: Duration,
    ) -> Self {
        let id = id.into();
        let sensor_id = id.clone();
        let scan_duration_ms = interval.as_secs_f32() * 1000.0;
        let periodic = PeriodicPublisher::new(publisher, "lidar", interval, move || {
            LidarScanData {
                sensor_id: sensor_id.clone(),
                timestamp_ns: Timestamp::now().nanoseconds(),
                num_points: POINTS_PER_SCAN,
                scan_duration_ms,
            }
        });
        Self { id, periodic }
    }
}

impl Sensor for LidarSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "lidar"
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
