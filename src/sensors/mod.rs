//! Simulated sensors and their registry

pub mod camera;
pub mod imu;
pub mod lidar;

pub use camera::CameraSensor;
pub use imu::ImuSensor;
pub use lidar::LidarSensor;

use std::collections::BTreeMap;

use log::info;
use serde::Serialize;

use crate::error::Result;

/// A startable/stoppable telemetry source
pub trait Sensor: Send {
    /// Unique identifier within the daemon
    fn id(&self) -> &str;

    /// Sensor family label: "camera", "lidar", "imu"
    fn kind(&self) -> &'static str;

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Snapshot of one sensor for the status API
#[derive(Debug, Clone, Serialize)]
pub struct SensorStatus {
    pub id: String,
    pub kind: String,
    pub active: bool,
}

/// Registry of sensors keyed by id, iteration in id order
#[derive(Default)]
pub struct SensorManager {
    sensors: BTreeMap<String, Box<dyn Sensor>>,
}

impl SensorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sensor under its own id, replacing any previous sensor
    /// with the same id.
    pub fn add(&mut self, sensor: Box<dyn Sensor>) {
        self.sensors.insert(sensor.id().to_string(), sensor);
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Box<dyn Sensor>> {
        self.sensors.get_mut(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.sensors.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn start_all(&mut self) -> Result<()> {
        for sensor in self.sensors.values_mut() {
            sensor.start()?;
            info!("sensor '{}' started", sensor.id());
        }
        Ok(())
    }

    pub fn stop_all(&mut self) {
        for sensor in self.sensors.values_mut() {
            sensor.stop();
            info!("sensor '{}' stopped", sensor.id());
        }
    }

    pub fn statuses(&self) -> Vec<SensorStatus> {
        self.sensors
            .values()
            .map(|s| SensorStatus {
                id: s.id().to_string(),
                kind: s.kind().to_string(),
                active: s.is_active(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSensor {
        id: String,
        active: bool,
    }

    impl Sensor for FakeSensor {
        fn id(&self) -> &str {
            &self.id
        }
        fn kind(&self) -> &'static str {
            "fake"
        }
        fn start(&mut self) -> Result<()> {
            self.active = true;
            Ok(())
        }
        fn stop(&mut self) {
            self.active = false;
        }
        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn fake(id: &str) -> Box<dyn Sensor> {
        Box::new(FakeSensor {
            id: id.to_string(),
            active: false,
        })
    }

    #[test]
    fn registry_keeps_id_order() {
        let mut manager = SensorManager::new();
        manager.add(fake("lidar0"));
        manager.add(fake("cam0"));
        manager.add(fake("imu0"));
        assert_eq!(manager.ids(), ["cam0", "imu0", "lidar0"]);
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn start_and_stop_all() {
        let mut manager = SensorManager::new();
        manager.add(fake("a"));
        manager.add(fake("b"));

        manager.start_all().unwrap();
        assert!(manager.statuses().iter().all(|s| s.active));

        manager.stop_all();
        assert!(manager.statuses().iter().all(|s| !s.active));
    }

    #[test]
    fn individual_lookup() {
        let mut manager = SensorManager::new();
        manager.add(fake("cam0"));

        assert!(manager.get_mut("missing").is_none());
        let sensor = manager.get_mut("cam0").unwrap();
        sensor.start().unwrap();
        assert!(sensor.is_active());
    }
}
