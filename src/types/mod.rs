//! Sensor payload records carried inside the message envelope

pub mod camera;
pub mod imu;
pub mod lidar;

pub use camera::CameraFrameData;
pub use imu::ImuData;
pub use lidar::LidarScanData;
