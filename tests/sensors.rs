//! Simulated sensor streaming through a shared publisher

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dhara::config::{PublisherConfig, SubscriberConfig};
use dhara::sensors::{CameraSensor, ImuSensor, Sensor, SensorManager};
use dhara::transport::{Publisher, StopSignal, Subscriber};
use dhara::types::{CameraFrameData, ImuData};
use dhara::Message;

fn bound_publisher() -> Arc<Mutex<Publisher>> {
    let mut publisher = Publisher::new(PublisherConfig {
        endpoint: "tcp://127.0.0.1:0".into(),
        ..Default::default()
    });
    publisher.bind().unwrap();
    Arc::new(Mutex::new(publisher))
}

fn subscriber_for(publisher: &Arc<Mutex<Publisher>>, topic: &str) -> Subscriber {
    let port = publisher
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .local_addr()
        .unwrap()
        .port();
    let mut subscriber = Subscriber::new(SubscriberConfig {
        endpoint: format!("tcp://127.0.0.1:{port}"),
        receive_timeout_ms: 2000,
        ..Default::default()
    });
    subscriber.connect().unwrap();
    subscriber.subscribe(topic).unwrap();
    subscriber
}

#[test]
fn imu_sensor_streams_samples() {
    let publisher = bound_publisher();
    let mut subscriber = subscriber_for(&publisher, "imu");

    let mut sensor = ImuSensor::new("imu0", Arc::clone(&publisher), Duration::from_millis(10));
    assert!(!sensor.is_active());
    sensor.start().unwrap();
    assert!(sensor.is_active());

    let stop = StopSignal::new();
    let message: Message<ImuData> = subscriber.receive(&stop).expect("imu sample expected");
    assert_eq!(message.payload.sensor_id, "imu0");
    assert_eq!(message.payload.accel_z, 9.81);

    sensor.stop();
    assert!(!sensor.is_active());
}

#[test]
fn camera_sensor_frame_ids_increase() {
    let publisher = bound_publisher();
    let mut subscriber = subscriber_for(&publisher, "camera");

    let mut sensor = CameraSensor::new("cam0", Arc::clone(&publisher), Duration::from_millis(10));
    sensor.start().unwrap();

    let stop = StopSignal::new();
    let first: Message<CameraFrameData> = subscriber.receive(&stop).expect("frame expected");
    let second: Message<CameraFrameData> = subscriber.receive(&stop).expect("frame expected");
    sensor.stop();

    assert_eq!(first.payload.width, 1920);
    assert_eq!(first.payload.height, 1080);
    assert_eq!(first.payload.encoding, "RGB8");
    assert!(second.payload.frame_id > first.payload.frame_id);
    assert!(second.header.sequence_number > first.header.sequence_number);
}

#[test]
fn manager_controls_sensor_lifecycle() {
    let publisher = bound_publisher();

    let mut manager = SensorManager::new();
    manager.add(Box::new(ImuSensor::new(
        "imu0",
        Arc::clone(&publisher),
        Duration::from_millis(10),
    )));
    manager.add(Box::new(CameraSensor::new(
        "cam0",
        Arc::clone(&publisher),
        Duration::from_millis(10),
    )));
    assert_eq!(manager.ids(), ["cam0", "imu0"]);

    manager.start_all().unwrap();
    assert!(manager.statuses().iter().all(|s| s.active));

    manager.stop_all();
    assert!(manager.statuses().iter().all(|s| !s.active));

    // Individual restart after a global stop
    let sensor = manager.get_mut("imu0").unwrap();
    sensor.start().unwrap();
    assert!(sensor.is_active());
    sensor.stop();
}
