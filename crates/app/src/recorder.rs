//! Status recorder — periodic sampling with change detection and
//! back-fill.
//!
//! The recorder owns a background task that samples the rig at a fixed
//! interval and persists only the deltas. When a change follows a long
//! flat stretch, a synthetic point carrying the *previous* values is
//! written just before the new one, so piecewise-linear plots stay
//! rectangular instead of interpolating a diagonal across the stretch.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use brewrig_domain::diff::is_different;
use brewrig_domain::snapshot::StatusSnapshot;
use brewrig_domain::time::{Timestamp, now};

use crate::ports::{StatusSource, TimeSeriesStore};

/// Default interval between samples.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(5000);

/// Periodic sampling loop over a status source, persisting deltas to a
/// time-series store.
///
/// The recorder is either stopped or running; starting a running recorder
/// is a no-op and stopping interrupts the current sleep.
pub struct StatusRecorder<S, T> {
    source: S,
    store: T,
    interval: Duration,
    worker: Option<Worker>,
}

struct Worker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl<S, T> StatusRecorder<S, T>
where
    S: StatusSource + Clone + Send + Sync + 'static,
    T: TimeSeriesStore + Clone + Send + Sync + 'static,
{
    /// Create a stopped recorder sampling every `interval`.
    pub fn new(source: S, store: T, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
            worker: None,
        }
    }

    /// Whether the background worker is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Start the background sampling task.
    ///
    /// Each start opens a fresh recording run named by its start time, so
    /// every run gets an isolated log tree.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let (shutdown, signal) = watch::channel(false);
        let source = self.source.clone();
        let store = self.store.clone();
        let interval = self.interval;
        let handle = tokio::spawn(sample_loop(source, store, interval, signal));
        self.worker = Some(Worker { shutdown, handle });
        tracing::info!("status recorder started");
    }

    /// Stop the background task and wait for it to finish.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown.send(true);
            let _ = worker.handle.await;
            tracing::info!("status recorder stopped");
        }
    }
}

async fn sample_loop<S, T>(source: S, store: T, interval: Duration, mut shutdown: watch::Receiver<bool>)
where
    S: StatusSource + Send + Sync,
    T: TimeSeriesStore + Send + Sync,
{
    if let Err(error) = store.begin_run(now()).await {
        tracing::error!(%error, "could not open recording run");
        return;
    }

    let interval_millis = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
    let mut last: Option<StatusSnapshot> = None;
    let mut last_changed: Option<Timestamp> = None;

    loop {
        let current = match source.current_status().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::error!(%error, "status source failed, recorder exiting");
                return;
            }
        };

        if is_different(last.as_ref(), &current) {
            let at = now();
            if let Err(error) = store.append_raw(&current).await {
                tracing::warn!(%error, "could not append snapshot to raw log");
            }
            if let (Some(previous), Some(changed_at)) = (last.as_ref(), last_changed) {
                let gap = at.signed_duration_since(changed_at);
                if gap > chrono::Duration::milliseconds(interval_millis) {
                    // Pin the end of the flat stretch with the old values
                    // before the new point lands.
                    let backfill_at = at - chrono::Duration::milliseconds(interval_millis);
                    write_points(&store, backfill_at.timestamp_millis(), previous).await;
                }
            }
            write_points(&store, at.timestamp_millis(), &current).await;
            last = Some(current);
            last_changed = Some(at);
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => {
                tracing::info!("status recorder shutting down");
                return;
            }
        }
    }
}

/// Append one CSV point per vessel metric. A failed write for one metric
/// is logged and must not abort the others.
async fn write_points<T: TimeSeriesStore>(store: &T, timestamp_millis: i64, snapshot: &StatusSnapshot) {
    for sample in snapshot.metric_samples() {
        let point = sample.at(timestamp_millis);
        if let Err(error) = store.append_point(&sample.vessel, sample.metric, point).await {
            tracing::warn!(
                vessel = %sample.vessel,
                metric = %sample.metric,
                %error,
                "could not append series point",
            );
        }
    }
}
