//! Streaming daemon: simulated sensors publishing over TCP pub/sub with a
//! REST control surface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};

use dhara::api::{self, ApiState};
use dhara::config::AppConfig;
use dhara::sensors::{CameraSensor, ImuSensor, LidarSensor, SensorManager};
use dhara::transport::{Publisher, StopSignal};
use dhara::{Error, Result};

fn parse_config_path() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => return args.next().map(PathBuf::from),
            other if !other.starts_with('-') => return Some(PathBuf::from(other)),
            _ => {}
        }
    }
    None
}

fn load_config() -> Result<AppConfig> {
    match parse_config_path() {
        Some(path) if path.exists() => {
            let config = AppConfig::from_file(&path)?;
            info!("loaded config from {}", path.display());
            Ok(config)
        }
        Some(path) => {
            warn!("config file {} not found, using defaults", path.display());
            Ok(AppConfig::default())
        }
        None => Ok(AppConfig::default()),
    }
}

fn run() -> Result<()> {
    let config = load_config()?;

    let mut publisher = Publisher::new(config.publisher.clone());
    publisher.bind()?;
    let publisher = Arc::new(Mutex::new(publisher));

    let mut manager = SensorManager::new();
    manager.add(Box::new(CameraSensor::new(
        "cam0",
        Arc::clone(&publisher),
        Duration::from_millis(config.sensors.camera_interval_ms),
    )));
    manager.add(Box::new(LidarSensor::new(
        "lidar0",
        Arc::clone(&publisher),
        Duration::from_millis(config.sensors.lidar_interval_ms),
    )));
    manager.add(Box::new(ImuSensor::new(
        "imu0",
        Arc::clone(&publisher),
        Duration::from_millis(config.sensors.imu_interval_ms),
    )));
    let manager = Arc::new(Mutex::new(manager));

    manager
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .start_all()?;

    let stop = StopSignal::new();
    let ctrlc_stop = stop.clone();
    ctrlc::set_handler(move || {
        info!("shutdown requested");
        ctrlc_stop.request();
    })
    .map_err(|e| Error::Other(format!("failed to install signal handler: {e}")))?;

    let api_worker = if config.api.enabled {
        let listen: SocketAddr = config
            .api
            .listen
            .parse()
            .map_err(|e| Error::Other(format!("bad api listen address: {e}")))?;
        let state = ApiState {
            manager: Arc::clone(&manager),
            publisher: Arc::clone(&publisher),
            started: Instant::now(),
        };
        let api_stop = stop.clone();
        Some(
            thread::Builder::new()
                .name("api".to_string())
                .spawn(move || {
                    if let Err(e) = api::serve(listen, state, api_stop) {
                        error!("api server failed: {e}");
                    }
                })?,
        )
    } else {
        None
    };

    info!("streaming on {}, ctrl-c to stop", config.publisher.endpoint);
    while !stop.is_requested() {
        thread::sleep(Duration::from_millis(200));
    }

    manager.lock().unwrap_or_else(|e| e.into_inner()).stop_all();
    if let Some(handle) = api_worker {
        let _ = handle.join();
    }

    let sent = publisher
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .messages_sent();
    info!("shut down after {sent} messages");
    Ok(())
}

fn main() {
    let config_level = load_config_level();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config_level))
        .init();

    if let Err(e) = run() {
        error!("fatal: {e}");
        std::process::exit(1);
    }
}

/// Peek the configured log level before full startup so logger init can
/// honor it. Falls back to "info" when the config is missing or broken.
fn load_config_level() -> String {
    parse_config_path()
        .filter(|p| p.exists())
        .and_then(|p| AppConfig::from_file(p).ok())
        .map(|c| c.logging.level)
        .unwrap_or_else(|| "info".to_string())
}
