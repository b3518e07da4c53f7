//! # brewrig-domain
//!
//! Pure domain model for the brewrig brewing process-control system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **StatusSnapshot** (a point-in-time reading of the whole rig)
//!   and the per-vessel metric extraction over it
//! - Define the **snapshot differ** (deep structural change detection)
//! - Define **TemperatureTrigger** (a recipe step that gates progression on
//!   a physical condition) and the position-ordered **TriggerSequence**
//! - Define time-series value objects (metrics, points)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod diff;
pub mod sequence;
pub mod series;
pub mod snapshot;
pub mod temperature;
pub mod timer;
pub mod trigger;
