//! Virtual rig — a complete simulated brewery.
//!
//! Assembles vessels (probe + optional PID) into the status snapshot shape
//! the recorder consumes, and doubles as the device registry the trigger
//! engine resolves probe names through.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Value, json};

use brewrig_app::ports::{DeviceRegistry, StatusSource};
use brewrig_domain::error::StatusSourceError;
use brewrig_domain::snapshot::StatusSnapshot;

use crate::controller::VirtualController;
use crate::probe::VirtualProbe;

/// A simulated brewery rig. Cheap to clone; clones share vessels.
#[derive(Clone, Default)]
pub struct VirtualRig {
    inner: Arc<RigInner>,
}

#[derive(Default)]
struct RigInner {
    vessels: Mutex<Vec<VirtualVessel>>,
    elapsed: AtomicU64,
}

#[derive(Clone)]
struct VirtualVessel {
    name: String,
    probe: VirtualProbe,
    controller: Option<VirtualController>,
}

impl VirtualRig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vessel under the probe's reference name.
    pub fn add_vessel(
        &self,
        name: impl Into<String>,
        probe: VirtualProbe,
        controller: Option<VirtualController>,
    ) {
        self.vessels().push(VirtualVessel {
            name: name.into(),
            probe,
            controller,
        });
    }

    fn vessels(&self) -> std::sync::MutexGuard<'_, Vec<VirtualVessel>> {
        self.inner
            .vessels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn vessel_named(&self, name: &str) -> Option<VirtualVessel> {
        self.vessels()
            .iter()
            .find(|vessel| vessel.name == name)
            .cloned()
    }
}

impl StatusSource for VirtualRig {
    fn current_status(
        &self,
    ) -> impl Future<Output = Result<StatusSnapshot, StatusSourceError>> + Send {
        let vessels: Vec<Value> = self
            .vessels()
            .iter()
            .map(|vessel| {
                let mut entry = json!({
                    "name": vessel.name,
                    "tempprobe": {"temp": vessel.probe.temperature()},
                });
                if let Some(controller) = &vessel.controller {
                    entry["pidstatus"] = json!({
                        "mode": controller.mode(),
                        "duty": controller.duty(),
                    });
                }
                entry
            })
            .collect();
        // The elapsed counter moves on every sample, exactly like a real
        // rig's brew clock.
        let elapsed = self.inner.elapsed.fetch_add(1, Ordering::Relaxed);
        let snapshot = StatusSnapshot::new(json!({
            "vessels": vessels,
            "elapsed": elapsed,
        }));
        async move { Ok(snapshot) }
    }
}

impl DeviceRegistry for VirtualRig {
    type Probe = VirtualProbe;
    type Controller = VirtualController;

    fn probe(&self, name: &str) -> impl Future<Output = Option<VirtualProbe>> + Send {
        let probe = self.vessel_named(name).map(|vessel| vessel.probe);
        async move { probe }
    }

    fn controller(&self, probe_name: &str) -> impl Future<Output = Option<VirtualController>> + Send {
        let controller = self
            .vessel_named(probe_name)
            .and_then(|vessel| vessel.controller);
        async move { controller }
    }
}
