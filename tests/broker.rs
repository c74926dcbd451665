//! Publisher -> broker -> subscriber forwarding

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use dhara::config::{PublisherConfig, SubscriberConfig};
use dhara::transport::{Broker, Publisher, StopSignal, Subscriber};

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn broker_forwards_between_endpoints() {
    let frontend_port = free_port();
    let backend_port = free_port();
    let frontend = format!("tcp://127.0.0.1:{frontend_port}");
    let backend = format!("tcp://127.0.0.1:{backend_port}");

    let stop = StopSignal::new();
    let broker_stop = stop.clone();
    let broker = Broker::new(frontend.clone(), backend.clone());
    let broker_thread = thread::spawn(move || broker.run(&broker_stop));

    // The broker binds inside run(); retry until its frontend is up
    let mut publisher = Publisher::new(PublisherConfig {
        endpoint: frontend,
        ..Default::default()
    });
    let mut connected = false;
    for _ in 0..100 {
        if publisher.connect().is_ok() {
            connected = true;
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert!(connected, "broker frontend never came up");

    let mut subscriber = Subscriber::new(SubscriberConfig {
        endpoint: backend,
        receive_timeout_ms: 3000,
        ..Default::default()
    });
    subscriber.connect().unwrap();
    subscriber.subscribe("relay").unwrap();

    publisher.publish_raw("relay", &[0xCA, 0xFE]).unwrap();

    let receive_stop = StopSignal::new();
    let data = subscriber
        .receive_raw(&receive_stop)
        .expect("forwarded message expected");
    assert_eq!(data, [0xCA, 0xFE]);

    stop.request();
    broker_thread.join().unwrap().unwrap();
}
