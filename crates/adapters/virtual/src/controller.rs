//! Virtual PID controller that records every setpoint pushed at it.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use brewrig_app::ports::SetpointController;

/// A simulated PID. Cheap to clone; clones share the same state.
#[derive(Clone, Default)]
pub struct VirtualController {
    state: Arc<Mutex<ControllerState>>,
}

#[derive(Default)]
struct ControllerState {
    setpoints: Vec<f64>,
    mode: Option<String>,
    duty: f64,
}

impl VirtualController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently pushed setpoint.
    #[must_use]
    pub fn current_setpoint(&self) -> Option<f64> {
        self.lock().setpoints.last().copied()
    }

    /// Every setpoint pushed, in order.
    #[must_use]
    pub fn setpoint_history(&self) -> Vec<f64> {
        self.lock().setpoints.clone()
    }

    /// Operating mode reported in status snapshots; `"off"` when unset.
    #[must_use]
    pub fn mode(&self) -> String {
        self.lock().mode.clone().unwrap_or_else(|| "off".to_string())
    }

    pub fn set_mode(&self, mode: impl Into<String>) {
        self.lock().mode = Some(mode.into());
    }

    #[must_use]
    pub fn duty(&self) -> f64 {
        self.lock().duty
    }

    pub fn set_duty(&self, duty: f64) {
        self.lock().duty = duty;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SetpointController for VirtualController {
    fn set_setpoint(&self, value: f64) -> impl Future<Output = ()> + Send {
        self.lock().setpoints.push(value);
        async {}
    }
}
