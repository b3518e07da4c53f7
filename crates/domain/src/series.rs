//! Time-series value objects — recorded metrics and points.

use serde::{Deserialize, Serialize};

/// Which per-vessel series a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Duty,
}

impl Metric {
    /// File-name suffix of the metric's CSV series (`<vessel>-<suffix>.csv`).
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Temperature => "temp",
            Self::Duty => "duty",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// One appended sample in a `(vessel, metric)` series.
///
/// Points are append-only: never mutated, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp_millis: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    #[must_use]
    pub fn new(timestamp_millis: i64, value: f64) -> Self {
        Self {
            timestamp_millis,
            value,
        }
    }

    /// Wire format of one appended line, CRLF-terminated.
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        format!("{},{}\r\n", self.timestamp_millis, self.value)
    }
}

/// A metric value extracted from one vessel of a snapshot, not yet bound
/// to a sample time.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub vessel: String,
    pub metric: Metric,
    pub value: f64,
}

impl MetricSample {
    /// Bind the sample to a timestamp, producing an appendable point.
    #[must_use]
    pub fn at(&self, timestamp_millis: i64) -> TimeSeriesPoint {
        TimeSeriesPoint::new(timestamp_millis, self.value)
    }
}
