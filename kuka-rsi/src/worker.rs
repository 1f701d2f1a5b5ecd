//! The real-time network worker: owns the UDP socket and drives the
//! receive/parse/respond cycle on a dedicated OS thread.
//!
//! This is deliberately a plain `std::thread`, not a task on an async
//! executor: raising this one thread's scheduling priority would be
//! meaningless if the runtime could also schedule unrelated work onto the
//! same OS thread. The loop itself never blocks on its own accord — the
//! socket is non-blocking and the only synchronization is a short-lived
//! mutex acquisition — so there is nothing an async runtime would buy us.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::callbacks::Callbacks;
use crate::clock::now_us;
use crate::codec;
use crate::config::Config;
use crate::priority;
use crate::state::SharedState;

/// Datagrams larger than this are truncated by `recv_from`; an RSI sensor
/// frame comfortably fits in a quarter of this.
const RECV_BUFFER_SIZE: usize = 4096;

/// Handle to the spawned worker thread and its shutdown flag.
pub struct Worker {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn the worker thread, which immediately starts polling `socket`.
    pub fn spawn(
        socket: UdpSocket,
        config: Config,
        state: Arc<SharedState>,
        callbacks: Arc<Callbacks>,
    ) -> std::io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);

        let handle = std::thread::Builder::new()
            .name("kuka-rsi-worker".into())
            .spawn(move || run(socket, config, state, callbacks, thread_shutdown))?;

        Ok(Self { shutdown, handle: Some(handle) })
    }

    /// Signal the worker to exit and join it, waiting up to one second —
    /// the same budget the original grants `pthread_join`/`WaitForSingleObject`.
    pub fn stop(mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    socket: UdpSocket,
    config: Config,
    state: Arc<SharedState>,
    callbacks: Arc<Callbacks>,
    shutdown: Arc<AtomicBool>,
) {
    priority::raise_thread_priority(config.verbose);
    if config.verbose {
        tracing::info!("RSI: network worker started");
    }

    let mut recv_buf = [0u8; RECV_BUFFER_SIZE];

    while !shutdown.load(Ordering::Relaxed) {
        match socket.recv_from(&mut recv_buf) {
            Ok((len, peer)) => {
                process_datagram(&recv_buf[..len], peer, &socket, &config, &state, &callbacks);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => {
                if config.verbose {
                    tracing::warn!("RSI: recv_from error: {e}");
                }
            }
        }

        check_liveness_timeout(&config, &state, &callbacks);

        // Cooperative yield, never a sleep: sleeping would add latency to
        // the next recvfrom that a 4 ms cycle budget cannot absorb.
        cooperative_yield();
    }

    if config.verbose {
        tracing::info!("RSI: network worker exiting");
    }
}

fn process_datagram(
    datagram: &[u8],
    peer: SocketAddr,
    socket: &UdpSocket,
    config: &Config,
    state: &SharedState,
    callbacks: &Callbacks,
) {
    let start = now_us();

    let Ok(text) = std::str::from_utf8(datagram) else {
        return;
    };
    let Some(frame) = codec::parse(text) else {
        // Missing or unparsable IPOC: drop entirely, no reply, no state
        // update, no statistics increment.
        return;
    };

    let newly_connected = {
        let was_connected = state.with_lock(|s| s.stats.is_connected);
        if !was_connected {
            state.with_lock(|s| s.stats.is_connected = true);
        }
        !was_connected
    };
    if newly_connected {
        callbacks.fire_connection(true);
    }

    let both_parsed = frame.cartesian.is_some() && frame.joints.is_some();

    let (cartesian_snapshot, joints_snapshot, rendered) = state.with_lock(|s| {
        if let Some(cartesian) = frame.cartesian {
            s.cartesian = cartesian;
        }
        if let Some(joints) = frame.joints {
            s.joints = joints;
        }
        let rendered = codec::render(&s.correction, frame.ipoc_text);
        (s.cartesian, s.joints, rendered)
    });

    if both_parsed {
        callbacks.fire_data(&cartesian_snapshot, &joints_snapshot);
    }

    let mut sent = false;
    if let Some(reply) = rendered {
        sent = socket.send_to(reply.as_bytes(), peer).is_ok();
    }

    let end = now_us();
    let processing_time_ms = (end - start) as f64 / 1000.0;

    state.with_lock(|s| {
        s.stats.record_cycle(processing_time_ms, end);
        if sent {
            s.stats.packets_sent += 1;
        }
    });

    if processing_time_ms > crate::state::CYCLE_BUDGET_MS && config.verbose {
        tracing::warn!("RSI: slow cycle: {processing_time_ms:.3} ms");
    }
}

fn check_liveness_timeout(config: &Config, state: &SharedState, callbacks: &Callbacks) {
    if config.timeout_ms == 0 {
        return;
    }

    let timed_out = state.with_lock(|s| {
        if !s.stats.is_connected {
            return false;
        }
        let elapsed_us = now_us().saturating_sub(s.stats.last_packet_timestamp_us);
        if elapsed_us > config.timeout_ms as u64 * 1000 {
            s.stats.is_connected = false;
            s.stats.connection_lost_count += 1;
            true
        } else {
            false
        }
    });

    if timed_out {
        if config.verbose {
            tracing::warn!("RSI: connection timeout after {} ms", config.timeout_ms);
        }
        callbacks.fire_connection(false);
    }
}

#[cfg(unix)]
fn cooperative_yield() {
    let _ = nix::sched::sched_yield();
}

#[cfg(windows)]
fn cooperative_yield() {
    unsafe {
        windows_sys::Win32::System::Threading::SwitchToThread();
    }
}
