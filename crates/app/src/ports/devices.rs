//! Device registry port — resolving probe names to live hardware bindings.
//!
//! Triggers store probe *names* and resolve them through this registry at
//! the moment a handle is needed. Handles are shared with the PID
//! subsystem, which owns their thread-safety; the application core only
//! reads temperatures and writes setpoints.

use std::future::Future;

use brewrig_domain::temperature::TemperatureScale;

/// A live temperature probe handle.
pub trait TemperatureProbe: Send + Sync {
    /// The probe's current reading, in its own scale.
    fn current_temperature(&self) -> impl Future<Output = f64> + Send;

    /// The scale the probe reports in.
    fn scale(&self) -> TemperatureScale;
}

/// A PID controller accepting setpoint updates.
pub trait SetpointController: Send + Sync {
    /// Push a new target setpoint.
    fn set_setpoint(&self, value: f64) -> impl Future<Output = ()> + Send;
}

/// Resolves logical probe names to live device handles.
pub trait DeviceRegistry {
    type Probe: TemperatureProbe;
    type Controller: SetpointController;

    /// Look up the probe registered under `name`.
    fn probe(&self, name: &str) -> impl Future<Output = Option<Self::Probe>> + Send;

    /// Look up the PID controller attached to the probe named `probe_name`.
    fn controller(&self, probe_name: &str) -> impl Future<Output = Option<Self::Controller>> + Send;
}
