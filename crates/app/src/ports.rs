//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

pub mod devices;
pub mod notifications;
pub mod status_source;
pub mod time_series;

pub use devices::{DeviceRegistry, SetpointController, TemperatureProbe};
pub use notifications::NotificationSink;
pub use status_source::StatusSource;
pub use time_series::TimeSeriesStore;
