//! Time-series store port — append-only persistence for recording runs.

use std::future::Future;

use brewrig_domain::error::PersistenceError;
use brewrig_domain::series::{Metric, TimeSeriesPoint};
use brewrig_domain::snapshot::StatusSnapshot;
use brewrig_domain::time::Timestamp;

/// Append-only sink for one recording run's raw log and CSV series.
///
/// A run is opened with [`begin_run`](Self::begin_run) and isolated from
/// every other run; points and snapshots are only ever appended, never
/// rewritten.
pub trait TimeSeriesStore {
    /// Open a fresh, isolated log tree for a run starting at `started_at`.
    fn begin_run(
        &self,
        started_at: Timestamp,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Append a snapshot to the run's raw log.
    fn append_raw(
        &self,
        snapshot: &StatusSnapshot,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Append one point to the `(vessel, metric)` series.
    fn append_point(
        &self,
        vessel: &str,
        metric: Metric,
        point: TimeSeriesPoint,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}
