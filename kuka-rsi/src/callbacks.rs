//! User-supplied callbacks, invoked by the worker outside the shared-state
//! lock.
//!
//! The C API passed raw function pointers plus a `void* user_data`; this
//! crate has no ABI surface to preserve, so callbacks are boxed `Fn`
//! trait objects and `user_data` collapses into whatever the closure
//! captures.

use std::sync::Mutex;

use crate::state::{CartesianPosition, JointPosition};

/// Called once per cycle in which both the cartesian and joint positions
/// parsed successfully. Runs on the worker thread, outside the
/// shared-state lock — keep it fast, and never call back into [`crate::Rsi::stop`]
/// or [`crate::Rsi::cleanup`] from inside it, which would deadlock the
/// worker join.
pub type DataCallback = dyn Fn(&CartesianPosition, &JointPosition) + Send + Sync;

/// Called on every connection-state transition, with the new state.
/// Same reentrancy caveat as [`DataCallback`].
pub type ConnectionCallback = dyn Fn(bool) + Send + Sync;

#[derive(Default)]
pub struct Callbacks {
    data: Mutex<Option<Box<DataCallback>>>,
    connection: Mutex<Option<Box<ConnectionCallback>>>,
}

impl Callbacks {
    pub fn set(
        &self,
        data: Option<Box<DataCallback>>,
        connection: Option<Box<ConnectionCallback>>,
    ) {
        *self.data.lock().expect("callback mutex poisoned") = data;
        *self.connection.lock().expect("callback mutex poisoned") = connection;
    }

    pub fn fire_data(&self, cartesian: &CartesianPosition, joints: &JointPosition) {
        if let Some(cb) = self.data.lock().expect("callback mutex poisoned").as_ref() {
            cb(cartesian, joints);
        }
    }

    pub fn fire_connection(&self, connected: bool) {
        if let Some(cb) = self.connection.lock().expect("callback mutex poisoned").as_ref() {
            cb(connected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn data_callback_fires_with_snapshot() {
        let callbacks = Callbacks::default();
        let seen_ipoc = Arc::new(AtomicUsize::new(0));
        let seen_ipoc_cb = Arc::clone(&seen_ipoc);

        callbacks.set(
            Some(Box::new(move |cart: &CartesianPosition, _joints: &JointPosition| {
                seen_ipoc_cb.store(cart.ipoc as usize, Ordering::SeqCst);
            })),
            None,
        );

        let cart = CartesianPosition { ipoc: 42, ..Default::default() };
        callbacks.fire_data(&cart, &JointPosition::default());
        assert_eq!(seen_ipoc.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn connection_callback_fires_with_new_state() {
        let callbacks = Callbacks::default();
        let last = Arc::new(AtomicUsize::new(2));
        let last_cb = Arc::clone(&last);
        callbacks.set(None, Some(Box::new(move |connected| {
            last_cb.store(connected as usize, Ordering::SeqCst);
        })));

        callbacks.fire_connection(true);
        assert_eq!(last.load(Ordering::SeqCst), 1);
        callbacks.fire_connection(false);
        assert_eq!(last.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unset_callbacks_are_a_no_op() {
        let callbacks = Callbacks::default();
        callbacks.fire_data(&CartesianPosition::default(), &JointPosition::default());
        callbacks.fire_connection(true);
    }
}
