//! # brewrig-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound
//!   ports):
//!   - `StatusSource` — the live rig's current snapshot
//!   - `TimeSeriesStore` — append-only persistence for recording runs
//!   - `DeviceRegistry` — resolve probe names to live probe/PID handles
//!   - `NotificationSink` — operator notifications with retraction
//! - Provide the **use-case services**:
//!   - `StatusRecorder` — periodic sampling with change detection
//!   - `TriggerEngine` — activate, wait on, and deactivate triggers
//!   - `SequenceRunner` — drive a recipe's triggers one at a time
//! - Orchestrate domain objects without knowing *how* persistence or
//!   device IO works
//!
//! ## Dependency rule
//! Depends on `brewrig-domain` only (plus `tokio::sync`/`tokio::time` for
//! channels and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod ports;
pub mod recorder;
pub mod sequence_runner;
pub mod trigger_engine;
