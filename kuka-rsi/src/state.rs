//! Shared data model and the mutex-protected block the worker and clients
//! exchange state through.

use std::sync::Mutex;

/// Robot pose in Cartesian coordinates, as reported by the `<RIst>` element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CartesianPosition {
    /// X position, millimetres.
    pub x: f64,
    /// Y position, millimetres.
    pub y: f64,
    /// Z position, millimetres.
    pub z: f64,
    /// A rotation, degrees (ZYX Euler convention).
    pub a: f64,
    /// B rotation, degrees.
    pub b: f64,
    /// C rotation, degrees.
    pub c: f64,
    /// Capture time, microseconds ([`crate::clock::now_us`]).
    pub timestamp_us: u64,
    /// Cycle counter echoed from the robot's `<IPOC>` element.
    pub ipoc: u32,
}

/// Robot joint angles, as reported by the `<AIPos>` element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointPosition {
    /// Joint angles in degrees, indexed 0..5 for axes A1..A6.
    pub axis: [f64; 6],
    /// Capture time, microseconds.
    pub timestamp_us: u64,
    /// Cycle counter echoed from the robot's `<IPOC>` element.
    pub ipoc: u32,
}

/// Cartesian correction deltas applied to the robot's commanded pose for
/// the next cycle. The zero value (`Default`) is a no-op correction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CartesianCorrection {
    /// X correction, millimetres.
    pub x: f64,
    /// Y correction, millimetres.
    pub y: f64,
    /// Z correction, millimetres.
    pub z: f64,
    /// A correction, degrees.
    pub a: f64,
    /// B correction, degrees.
    pub b: f64,
    /// C correction, degrees.
    pub c: f64,
}

/// Running counters and latency aggregates for an RSI session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Total inbound datagrams that parsed far enough to yield an IPOC.
    pub packets_received: u64,
    /// Total replies successfully handed to `sendto`.
    pub packets_sent: u64,
    /// Running mean of per-cycle processing time, milliseconds.
    pub avg_response_time_ms: f64,
    /// Minimum observed per-cycle processing time, milliseconds.
    pub min_response_time_ms: f64,
    /// Maximum observed per-cycle processing time, milliseconds.
    pub max_response_time_ms: f64,
    /// Count of cycles whose processing time exceeded the 4 ms budget.
    pub late_responses: u64,
    /// Count of liveness-timeout transitions from connected to disconnected.
    pub connection_lost_count: u64,
    /// Whether a robot packet has arrived within the liveness-timeout window.
    pub is_connected: bool,
    /// Timestamp of the most recently received packet, microseconds.
    pub last_packet_timestamp_us: u64,
}

/// Sentinel `min_response_time_ms` a fresh session starts with, so the
/// first sample always wins the `<` comparison in [`Statistics::record_cycle`].
const MIN_RESPONSE_SENTINEL_MS: f64 = 9999.0;

impl Default for Statistics {
    fn default() -> Self {
        Self {
            packets_received: 0,
            packets_sent: 0,
            avg_response_time_ms: 0.0,
            min_response_time_ms: MIN_RESPONSE_SENTINEL_MS,
            max_response_time_ms: 0.0,
            late_responses: 0,
            connection_lost_count: 0,
            is_connected: false,
            last_packet_timestamp_us: 0,
        }
    }
}

/// Cycles whose processing time exceeds this budget count as "late".
pub const CYCLE_BUDGET_MS: f64 = 4.0;

impl Statistics {
    /// Fold one cycle's processing time into the running aggregates.
    /// Uses Welford's incremental mean update rather than the original's
    /// full-recompute formula — equivalent result, no precision drift
    /// as `packets_received` grows across a long-running session.
    pub fn record_cycle(&mut self, processing_time_ms: f64, now_us: u64) {
        self.packets_received += 1;
        self.last_packet_timestamp_us = now_us;

        let n = self.packets_received as f64;
        self.avg_response_time_ms += (processing_time_ms - self.avg_response_time_ms) / n;

        if processing_time_ms < self.min_response_time_ms {
            self.min_response_time_ms = processing_time_ms;
        }
        if processing_time_ms > self.max_response_time_ms {
            self.max_response_time_ms = processing_time_ms;
        }
        if processing_time_ms > CYCLE_BUDGET_MS {
            self.late_responses += 1;
        }
    }
}

/// The one mutable block shared between the worker and client threads.
#[derive(Debug, Default)]
pub struct Shared {
    pub cartesian: CartesianPosition,
    pub joints: JointPosition,
    pub correction: CartesianCorrection,
    pub stats: Statistics,
}

/// Mutex-guarded [`Shared`] block plus the accessor methods every client
/// thread and the worker go through. No field is ever exposed by reference;
/// every accessor copies the whole struct in or out under the lock.
#[derive(Debug, Default)]
pub struct SharedState {
    inner: Mutex<Shared>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cartesian_position(&self) -> CartesianPosition {
        self.inner.lock().expect("RSI shared-state mutex poisoned").cartesian
    }

    pub fn joint_position(&self) -> JointPosition {
        self.inner.lock().expect("RSI shared-state mutex poisoned").joints
    }

    pub fn statistics(&self) -> Statistics {
        self.inner.lock().expect("RSI shared-state mutex poisoned").stats
    }

    pub fn set_correction(&self, correction: CartesianCorrection) {
        self.inner.lock().expect("RSI shared-state mutex poisoned").correction = correction;
    }

    /// Run `f` with exclusive access to the shared block. Used only by the
    /// worker, which is the sole writer of positions and statistics.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        let mut guard = self.inner.lock().expect("RSI shared-state mutex poisoned");
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_round_trip_by_value() {
        let shared = SharedState::new();
        shared.set_correction(CartesianCorrection { x: 1.25, ..Default::default() });
        assert_eq!(shared.statistics().packets_received, 0);

        shared.with_lock(|s| {
            s.cartesian.x = 100.0;
            s.cartesian.ipoc = 7;
        });

        let pos = shared.cartesian_position();
        assert_eq!(pos.x, 100.0);
        assert_eq!(pos.ipoc, 7);
    }

    #[test]
    fn statistics_min_avg_max_ordering_holds() {
        let mut stats = Statistics::default();
        for sample in [1.0, 3.0, 2.0, 5.0, 0.5] {
            stats.record_cycle(sample, 0);
        }
        assert!(stats.min_response_time_ms <= stats.avg_response_time_ms);
        assert!(stats.avg_response_time_ms <= stats.max_response_time_ms);
        assert_eq!(stats.min_response_time_ms, 0.5);
        assert_eq!(stats.max_response_time_ms, 5.0);
    }

    #[test]
    fn late_responses_count_cycles_over_budget() {
        let mut stats = Statistics::default();
        stats.record_cycle(1.0, 0);
        stats.record_cycle(4.5, 0);
        stats.record_cycle(6.0, 0);
        assert_eq!(stats.late_responses, 2);
        assert!(stats.late_responses <= stats.packets_received);
    }

    #[test]
    fn last_write_wins_under_concurrent_corrections() {
        use std::sync::Arc;
        use std::thread;

        let shared = Arc::new(SharedState::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let shared = Arc::clone(&shared);
            handles.push(thread::spawn(move || {
                shared.set_correction(CartesianCorrection { x: i as f64, ..Default::default() });
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // No torn value: x must equal exactly one of the writers' inputs.
        let x = shared.with_lock(|s| s.correction.x);
        assert!((0..8).any(|i| x == i as f64));
    }
}
