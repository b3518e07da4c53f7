//! # brewrig-adapter-virtual
//!
//! Simulated rig devices, wired the same way real hardware would be:
//! probes with settable readings, controllers that record every setpoint
//! pushed at them, and a [`VirtualRig`] that assembles vessels into the
//! status snapshot shape the recorder consumes.
//!
//! Used by the daemon's demo mode and by end-to-end tests; no IO anywhere.

pub mod controller;
pub mod notifier;
pub mod probe;
pub mod rig;

pub use controller::VirtualController;
pub use notifier::InMemoryNotifier;
pub use probe::VirtualProbe;
pub use rig::VirtualRig;
