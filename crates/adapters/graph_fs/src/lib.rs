//! # brewrig-adapter-graph-fs
//!
//! Filesystem implementation of the [`TimeSeriesStore`] port.
//!
//! Every recording run gets an isolated directory named by its start time:
//!
//! ```text
//! graph-data/
//!   1400000000000/
//!     raw.log          — "[" + comma-joined serialized snapshots
//!     Mash-temp.csv    — "<epochMillis>,<temperature>\r\n" per line
//!     Mash-duty.csv    — "<epochMillis>,<dutyPercent>\r\n" per line
//! ```
//!
//! The raw log is intentionally never closed with a trailing `]`; consumers
//! append the bracket themselves when they want valid JSON. Every write is
//! one open-append-close unit so a crash never leaves a torn file handle.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use brewrig_app::ports::TimeSeriesStore;
use brewrig_domain::error::PersistenceError;
use brewrig_domain::series::{Metric, TimeSeriesPoint};
use brewrig_domain::snapshot::StatusSnapshot;
use brewrig_domain::time::Timestamp;

/// File name of the per-run snapshot log.
const RAW_LOG: &str = "raw.log";

/// Filesystem-backed time-series store rooted at a graph-data directory.
///
/// Cheap to clone; clones share the same active run.
#[derive(Clone)]
pub struct FsGraphStore {
    root: PathBuf,
    run: Arc<Mutex<Option<RunState>>>,
}

struct RunState {
    dir: PathBuf,
    raw_log_started: bool,
}

impl FsGraphStore {
    /// Create a store that places run directories under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            run: Arc::new(Mutex::new(None)),
        }
    }

    /// Directory of the active run, if one has been opened.
    pub async fn run_dir(&self) -> Option<PathBuf> {
        self.run.lock().await.as_ref().map(|run| run.dir.clone())
    }
}

impl TimeSeriesStore for FsGraphStore {
    fn begin_run(
        &self,
        started_at: Timestamp,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        async move {
            let dir = self.root.join(started_at.timestamp_millis().to_string());
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| io_error(&dir, source))?;
            *self.run.lock().await = Some(RunState {
                dir,
                raw_log_started: false,
            });
            Ok(())
        }
    }

    fn append_raw(
        &self,
        snapshot: &StatusSnapshot,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        async move {
            let serialized = serde_json::to_string(snapshot)?;
            let mut guard = self.run.lock().await;
            let run = guard.as_mut().ok_or(PersistenceError::NoActiveRun)?;
            let prefix = if run.raw_log_started { "," } else { "[" };
            append(&run.dir.join(RAW_LOG), format!("{prefix}{serialized}").as_bytes()).await?;
            run.raw_log_started = true;
            Ok(())
        }
    }

    fn append_point(
        &self,
        vessel: &str,
        metric: Metric,
        point: TimeSeriesPoint,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        async move {
            let guard = self.run.lock().await;
            let run = guard.as_ref().ok_or(PersistenceError::NoActiveRun)?;
            let path = run.dir.join(format!("{vessel}-{}.csv", metric.suffix()));
            append(&path, point.to_csv_line().as_bytes()).await
        }
    }
}

/// One open-append-close unit; the file is created on first use.
async fn append(path: &Path, data: &[u8]) -> Result<(), PersistenceError> {
    let result = async {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.flush().await
    }
    .await;
    result.map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use serde_json::json;

    fn run_start() -> Timestamp {
        chrono::Utc.timestamp_millis_opt(1_400_000_000_000).unwrap()
    }

    fn snapshot(temp: f64) -> StatusSnapshot {
        StatusSnapshot::new(json!({
            "vessels": [{"name": "Mash", "tempprobe": {"temp": temp}}],
            "elapsed": 0,
        }))
    }

    async fn store_with_run(root: &Path) -> FsGraphStore {
        let store = FsGraphStore::new(root);
        store.begin_run(run_start()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn should_create_run_directory_named_by_epoch_millis() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_run(dir.path()).await;

        let run_dir = store.run_dir().await.unwrap();
        assert_eq!(run_dir, dir.path().join("1400000000000"));
        assert!(run_dir.is_dir());
    }

    #[tokio::test]
    async fn should_open_raw_log_with_bracket_and_join_with_commas() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_run(dir.path()).await;

        store.append_raw(&snapshot(65.0)).await.unwrap();
        store.append_raw(&snapshot(66.0)).await.unwrap();

        let raw = std::fs::read_to_string(store.run_dir().await.unwrap().join("raw.log")).unwrap();
        assert!(raw.starts_with('['));
        assert!(!raw.ends_with(']'));
        // Closing the array by hand yields valid JSON.
        let entries: Vec<serde_json::Value> = serde_json::from_str(&format!("{raw}]")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["vessels"][0]["tempprobe"]["temp"], json!(65.0));
    }

    #[tokio::test]
    async fn should_append_crlf_terminated_csv_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_run(dir.path()).await;

        store
            .append_point("Mash", Metric::Temperature, TimeSeriesPoint::new(1, 65.0))
            .await
            .unwrap();
        store
            .append_point("Mash", Metric::Temperature, TimeSeriesPoint::new(2, 66.5))
            .await
            .unwrap();

        let csv = std::fs::read_to_string(
            store.run_dir().await.unwrap().join("Mash-temp.csv"),
        )
        .unwrap();
        assert_eq!(csv, "1,65\r\n2,66.5\r\n");
    }

    #[tokio::test]
    async fn should_write_each_metric_to_its_own_series_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_run(dir.path()).await;

        store
            .append_point("Mash", Metric::Temperature, TimeSeriesPoint::new(1, 65.0))
            .await
            .unwrap();
        store
            .append_point("Mash", Metric::Duty, TimeSeriesPoint::new(1, 50.0))
            .await
            .unwrap();

        let run_dir = store.run_dir().await.unwrap();
        assert!(run_dir.join("Mash-temp.csv").is_file());
        assert!(run_dir.join("Mash-duty.csv").is_file());
    }

    #[tokio::test]
    async fn should_reject_writes_before_a_run_is_opened() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsGraphStore::new(dir.path());

        let raw = store.append_raw(&snapshot(65.0)).await;
        assert!(matches!(raw, Err(PersistenceError::NoActiveRun)));

        let point = store
            .append_point("Mash", Metric::Temperature, TimeSeriesPoint::new(1, 65.0))
            .await;
        assert!(matches!(point, Err(PersistenceError::NoActiveRun)));
    }

    #[tokio::test]
    async fn should_isolate_runs_in_separate_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsGraphStore::new(dir.path());

        store.begin_run(run_start()).await.unwrap();
        store.append_raw(&snapshot(65.0)).await.unwrap();
        let first_dir = store.run_dir().await.unwrap();

        let later = chrono::Utc.timestamp_millis_opt(1_400_000_060_000).unwrap();
        store.begin_run(later).await.unwrap();
        store.append_raw(&snapshot(66.0)).await.unwrap();
        let second_dir = store.run_dir().await.unwrap();

        assert_ne!(first_dir, second_dir);
        // Each run's log re-opens with its own bracket.
        let second = std::fs::read_to_string(second_dir.join("raw.log")).unwrap();
        assert!(second.starts_with('['));
    }

    #[tokio::test]
    async fn should_share_active_run_between_clones() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_run(dir.path()).await;
        let clone = store.clone();

        store.append_raw(&snapshot(65.0)).await.unwrap();
        clone.append_raw(&snapshot(66.0)).await.unwrap();

        let raw = std::fs::read_to_string(store.run_dir().await.unwrap().join("raw.log")).unwrap();
        // The clone continued the same log instead of re-opening it.
        assert!(raw.starts_with('['));
        let entries: Vec<serde_json::Value> = serde_json::from_str(&format!("{raw}]")).unwrap();
        assert_eq!(entries.len(), 2);
    }
}
