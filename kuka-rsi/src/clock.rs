//! Monotonic microsecond timestamp source.
//!
//! Used for statistics and liveness-timeout detection. Never wall-clock:
//! NTP steps or DST changes must not perturb latency measurements or
//! falsely trip the connection-lost watchdog.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Microseconds since an arbitrary, process-local epoch.
///
/// Only differences between two `now_us()` calls are meaningful; the
/// absolute value carries no wall-clock significance.
pub fn now_us() -> u64 {
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_us_is_monotonic() {
        let a = now_us();
        std::thread::sleep(std::time::Duration::from_micros(200));
        let b = now_us();
        assert!(b > a);
    }
}
