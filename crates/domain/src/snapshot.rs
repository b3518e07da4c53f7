//! Status snapshot — a point-in-time reading of the whole rig.
//!
//! The rig's status is an externally-produced JSON tree without a fixed
//! schema: a map of vessels carrying whatever probes and controllers are
//! wired up at that moment. The snapshot wraps that tree untouched and
//! exposes the typed extraction the recorder needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::series::{Metric, MetricSample};

/// One sampled reading of the rig's state at an instant.
///
/// ```text
/// { "vessels": [ { "name": "Mash",
///                  "tempprobe": { "temp": 65.5 },
///                  "pidstatus": { "mode": "auto", "duty": 50 } } ],
///   "elapsed": 120 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot(Value);

impl StatusSnapshot {
    /// Elapsed-time key excluded from top-level change comparison.
    pub const ELAPSED_KEY: &str = "elapsed";

    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON tree.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Extract one sample per recordable vessel metric.
    ///
    /// A vessel without a `name` is skipped entirely. A vessel contributes
    /// a temperature sample when it carries `tempprobe.temp` and a duty
    /// sample when it carries `pidstatus` (see [`duty_of`] for how duty is
    /// derived).
    #[must_use]
    pub fn metric_samples(&self) -> Vec<MetricSample> {
        let mut samples = Vec::new();
        let Some(vessels) = self.0.get("vessels").and_then(Value::as_array) else {
            return samples;
        };
        for vessel in vessels {
            let Some(name) = vessel.get("name").and_then(Value::as_str) else {
                continue;
            };
            if let Some(temp) = vessel
                .get("tempprobe")
                .and_then(|probe| probe.get("temp"))
                .and_then(Value::as_f64)
            {
                samples.push(MetricSample {
                    vessel: name.to_string(),
                    metric: Metric::Temperature,
                    value: temp,
                });
            }
            if let Some(pid) = vessel.get("pidstatus") {
                samples.push(MetricSample {
                    vessel: name.to_string(),
                    metric: Metric::Duty,
                    value: duty_of(pid),
                });
            }
        }
        samples
    }
}

/// Derive the recorded duty cycle from a `pidstatus` object.
///
/// `actualduty` wins when present; otherwise the commanded `duty` counts
/// only while the controller is not switched off.
fn duty_of(pid: &Value) -> f64 {
    if let Some(actual) = pid.get("actualduty").and_then(Value::as_f64) {
        return actual;
    }
    let off = pid
        .get("mode")
        .and_then(Value::as_str)
        .is_none_or(|mode| mode == "off");
    if off {
        0.0
    } else {
        pid.get("duty").and_then(Value::as_f64).unwrap_or(0.0)
    }
}
