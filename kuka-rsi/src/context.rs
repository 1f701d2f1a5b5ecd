//! The lifecycle control surface: `Rsi`, the handle clients drive through
//! `init` → `start` → `stop` → `cleanup`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::callbacks::{Callbacks, ConnectionCallback, DataCallback};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::priority;
use crate::socket;
use crate::state::{CartesianCorrection, CartesianPosition, JointPosition, SharedState, Statistics};
use crate::worker::Worker;

/// One RSI session: owns the worker once running, the shared state, the
/// callback trio, and the two lifecycle flags described in the data
/// model (`initialized`, `running`).
///
/// The original C library keeps exactly one process-wide static context.
/// This type is a handle instead, so a process can host more than one
/// session (useful in tests, which spin up many short-lived sessions
/// against loopback peers) — callers who want the original's "one static
/// library" ergonomics can reach for [`default_instance`].
pub struct Rsi {
    initialized: AtomicBool,
    running: AtomicBool,
    config: Mutex<Config>,
    state: Arc<SharedState>,
    callbacks: Arc<Callbacks>,
    worker: Mutex<Option<Worker>>,
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            running: AtomicBool::new(false),
            config: Mutex::new(Config::default()),
            state: Arc::new(SharedState::new()),
            callbacks: Arc::new(Callbacks::default()),
            worker: Mutex::new(None),
        }
    }
}

impl Rsi {
    /// Construct a fresh, uninitialised handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the context, seed statistics, and apply process-wide tuning.
    /// `config: None` installs [`Config::default`].
    pub fn init(&self, config: Option<Config>) -> Result<()> {
        if self.initialized.load(Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }

        let config = config.unwrap_or_default();
        let verbose = config.verbose;

        *self.config.lock().expect("config mutex poisoned") = config;
        self.state.with_lock(|s| {
            s.cartesian = CartesianPosition::default();
            s.joints = JointPosition::default();
            s.correction = CartesianCorrection::default();
            s.stats = Statistics::default();
        });
        self.callbacks.set(None, None);

        priority::apply_process_tuning(verbose);

        self.initialized.store(true, Ordering::SeqCst);
        if verbose {
            tracing::info!("RSI: initialized");
        }
        Ok(())
    }

    /// Bind the data and connection callbacks. Must be called while
    /// initialised and not running.
    pub fn set_callbacks(
        &self,
        data: Option<Box<DataCallback>>,
        connection: Option<Box<ConnectionCallback>>,
    ) -> Result<()> {
        self.require_initialized()?;
        if self.running.load(Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }
        self.callbacks.set(data, connection);
        Ok(())
    }

    /// Bind the socket and spawn the worker thread.
    pub fn start(&self) -> Result<()> {
        self.require_initialized()?;
        if self.running.load(Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }

        let config = self.config.lock().expect("config mutex poisoned").clone();
        let bound = socket::bind(&config)?;

        let worker = Worker::spawn(bound, config.clone(), Arc::clone(&self.state), Arc::clone(&self.callbacks))
            .map_err(|e| {
                if config.verbose {
                    tracing::warn!("RSI: failed to spawn worker thread: {e}");
                }
                Error::ThreadFailed
            })?;

        *self.worker.lock().expect("worker mutex poisoned") = Some(worker);
        self.running.store(true, Ordering::SeqCst);
        if config.verbose {
            tracing::info!("RSI: started successfully");
        }
        Ok(())
    }

    /// Signal the worker to stop, join it (1 second budget), and release
    /// the socket.
    pub fn stop(&self) -> Result<()> {
        self.require_initialized()?;
        if !self.running.load(Ordering::SeqCst) {
            return Err(Error::NotRunning);
        }

        if let Some(worker) = self.worker.lock().expect("worker mutex poisoned").take() {
            worker.stop();
        }
        self.running.store(false, Ordering::SeqCst);

        let verbose = self.config.lock().expect("config mutex poisoned").verbose;
        if verbose {
            tracing::info!("RSI: stopped successfully");
        }
        Ok(())
    }

    /// Stop if still running, tear down process-wide tuning, and return
    /// to the uninitialised state so the handle can be reused.
    pub fn cleanup(&self) -> Result<()> {
        self.require_initialized()?;

        if self.running.load(Ordering::SeqCst) {
            self.stop()?;
        }

        let verbose = self.config.lock().expect("config mutex poisoned").verbose;
        priority::cleanup_process_tuning(verbose);
        self.initialized.store(false, Ordering::SeqCst);
        if verbose {
            tracing::info!("RSI: cleaned up successfully");
        }
        Ok(())
    }

    /// Copy out the latest Cartesian position.
    pub fn cartesian_position(&self) -> Result<CartesianPosition> {
        self.require_running()?;
        Ok(self.state.cartesian_position())
    }

    /// Copy out the latest joint position.
    pub fn joint_position(&self) -> Result<JointPosition> {
        self.require_running()?;
        Ok(self.state.joint_position())
    }

    /// Overwrite the pending correction, field-by-field, for the next
    /// reply the worker renders. Sticky: the library never zeros it on
    /// its own (§4.3) — clients wanting one-shot behaviour re-zero it
    /// themselves after each commanded motion.
    pub fn set_cartesian_correction(&self, correction: CartesianCorrection) -> Result<()> {
        self.require_running()?;
        self.state.set_correction(correction);
        Ok(())
    }

    /// Copy out the current statistics snapshot.
    pub fn statistics(&self) -> Result<Statistics> {
        self.require_initialized()?;
        Ok(self.state.statistics())
    }

    fn require_initialized(&self) -> Result<()> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::InitFailed)
        }
    }

    fn require_running(&self) -> Result<()> {
        self.require_initialized()?;
        if self.running.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::NotRunning)
        }
    }
}

static DEFAULT_INSTANCE: OnceLock<Rsi> = OnceLock::new();

/// The process-wide default session, for callers that want the original
/// C library's "one static instance" ergonomics instead of owning an
/// [`Rsi`] handle themselves.
pub fn default_instance() -> &'static Rsi {
    DEFAULT_INSTANCE.get_or_init(Rsi::new)
}
