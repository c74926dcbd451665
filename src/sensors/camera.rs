//! Simulated camera publishing frame metadata on topic "camera"

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::time::Timestamp;
use crate::error::Result;
use crate::sensors::Sensor;
use crate::transport::{PeriodicPublisher, Publisher};
use crate::types::CameraFrameData;

/// Frames are 1920x1080 RGB8 at roughly 30 Hz by default
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(33);

pub struct CameraSensor {
    id: String,
    periodic: PeriodicPublisher<CameraFrameData>,
}

impl CameraSensor {
    pub fn new(
        id: impl Into<String>,
        publisher: Arc<Mutex<Publisher>>,
        interval: Duration,
    ) -> Self {
        let id = id.into();
        let sensor_id = id.clone();
        let mut frame_id: u32 = 0;
        let periodic = PeriodicPublisher::new(publisher, "camera", interval, move || {
            let frame = CameraFrameData {
                sensor_id: sensor_id.clone(),
                timestamp_ns: Timestamp::now().nanoseconds(),
                frame_id,
                width: 1920,
                height: 1080,
                encoding: "RGB8".to_string(),
            };
            frame_id = frame_id.wrapping_add(1);
            frame
        });
        Self { id, periodic }
    }
}

impl Sensor for CameraSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "camera"
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
