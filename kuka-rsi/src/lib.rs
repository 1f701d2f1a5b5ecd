//! Controller-side endpoint of the KUKA Robot Sensor Interface (RSI)
//! protocol: a real-time UDP exchange in which a KUKA robot emits a
//! telemetry packet every ~4 ms and expects a correction packet back
//! inside the same cycle window.
//!
//! ```no_run
//! use kuka_rsi::{Config, Rsi};
//!
//! let rsi = Rsi::new();
//! rsi.init(Some(Config::default())).unwrap();
//! rsi.start().unwrap();
//!
//! let position = rsi.cartesian_position().unwrap();
//! println!("robot at x={}", position.x);
//!
//! rsi.stop().unwrap();
//! rsi.cleanup().unwrap();
//! ```

mod callbacks;
mod clock;
mod codec;
mod config;
mod context;
mod error;
mod priority;
mod socket;
mod state;
mod worker;

pub use callbacks::{ConnectionCallback, DataCallback};
pub use config::Config;
pub use context::{default_instance, Rsi};
pub use error::{error_string, Error, Result};
pub use state::{CartesianCorrection, CartesianPosition, JointPosition, Statistics};

/// Re-exported for callers who want to parse or render RSI frames
/// directly without standing up a full [`Rsi`] session — e.g. to drive a
/// robot-side frame generator in integration tests.
pub mod frame {
    pub use crate::codec::{parse, render, ParsedFrame, RESPONSE_BUFFER_SIZE};
}
