//! dhara: typed sensor telemetry streaming over TCP pub/sub
//!
//! Producers wrap camera, lidar, and IMU records in a fixed-header binary
//! envelope and publish them under topic strings; consumers subscribe by
//! topic prefix and get the typed records back. The daemon binary runs
//! simulated sensors behind a REST control surface; `dhara-broker`
//! forwards between many publishers and many subscribers.

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod sensors;
pub mod transport;
pub mod types;

pub use config::{AppConfig, PublisherConfig, SubscriberConfig};
pub use self::core::{Message, MessageHeader, SensorPayload, SequenceCounter, Timestamp};
pub use error::{Error, Result};
pub use transport::{Broker, PeriodicPublisher, Publisher, StopSignal, Subscriber};
pub use types::{CameraFrameData, ImuData, LidarScanData};
