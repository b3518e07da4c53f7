//! Virtual temperature probe with an externally settable reading.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use brewrig_app::ports::TemperatureProbe;
use brewrig_domain::temperature::TemperatureScale;

/// A simulated probe. Cheap to clone; clones share the same reading.
#[derive(Clone)]
pub struct VirtualProbe {
    name: String,
    scale: TemperatureScale,
    reading: Arc<Mutex<f64>>,
}

impl VirtualProbe {
    #[must_use]
    pub fn new(name: impl Into<String>, scale: TemperatureScale, reading: f64) -> Self {
        Self {
            name: name.into(),
            scale,
            reading: Arc::new(Mutex::new(reading)),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the simulated reading, e.g. from a demo ramp or a test.
    pub fn set_temperature(&self, value: f64) {
        *self.reading.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        *self.reading.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TemperatureProbe for VirtualProbe {
    fn current_temperature(&self) -> impl Future<Output = f64> + Send {
        let value = self.temperature();
        async move { value }
    }

    fn scale(&self) -> TemperatureScale {
        self.scale
    }
}
