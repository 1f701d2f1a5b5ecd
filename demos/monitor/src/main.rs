//! Minimal example binary: brings up an RSI session from environment
//! configuration, logs every connection transition, and prints the
//! running statistics once a second.
//!
//! No signal handling, no CLI parsing, no terminal UI — kill the process
//! to stop it. See the crate's top-level docs for the library surface
//! this wraps.

use kuka_rsi::{Config, Rsi};

fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let rsi = Rsi::new();

    rsi.init(Some(config)).expect("failed to initialize RSI session");
    rsi.set_callbacks(
        None,
        Some(Box::new(|connected| {
            if connected {
                tracing::info!("robot connected");
            } else {
                tracing::warn!("robot connection lost");
            }
        })),
    )
    .expect("failed to register callbacks");

    rsi.start().expect("failed to start RSI worker");
    tracing::info!("listening for robot packets, printing statistics every second");

    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
        let stats = rsi.statistics().expect("session initialized");
        tracing::info!(
            received = stats.packets_received,
            sent = stats.packets_sent,
            avg_ms = stats.avg_response_time_ms,
            max_ms = stats.max_response_time_ms,
            late = stats.late_responses,
            connected = stats.is_connected,
            "stats"
        );
    }
}
