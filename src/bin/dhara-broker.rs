//! Standalone forwarding broker: publishers connect to the frontend,
//! subscribers to the backend.

use log::{error, info};

use dhara::transport::{Broker, StopSignal};
use dhara::{Error, Result};

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let frontend = args.next().unwrap_or_else(|| "tcp://*:5555".to_string());
    let backend = args.next().unwrap_or_else(|| "tcp://*:5556".to_string());

    let stop = StopSignal::new();
    let ctrlc_stop = stop.clone();
    ctrlc::set_handler(move || {
        info!("shutdown requested");
        ctrlc_stop.request();
    })
    .map_err(|e| Error::Other(format!("failed to install signal handler: {e}")))?;

    Broker::new(frontend, backend).run(&stop)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("fatal: {e}");
        std::process::exit(1);
    }
}
