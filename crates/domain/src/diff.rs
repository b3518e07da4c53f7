//! Deep structural comparison between two status snapshots.
//!
//! The recorder samples the rig every few seconds but only persists
//! changes, so the comparison must ignore the one field guaranteed to move
//! on every sample: the top-level elapsed-time counter. The exclusion is
//! deliberately narrow — a key named `elapsed` nested deeper in the tree
//! takes part in the comparison like any other value.

use serde_json::{Map, Value};

use crate::snapshot::StatusSnapshot;

/// Whether `current` differs from the previously recorded snapshot.
///
/// A missing previous snapshot always counts as different, so the first
/// sample of a run is recorded unconditionally. Map comparison is
/// key-order-insensitive; sequence comparison is positional.
#[must_use]
pub fn is_different(previous: Option<&StatusSnapshot>, current: &StatusSnapshot) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    match (previous.as_value(), current.as_value()) {
        (Value::Object(prev), Value::Object(cur)) => {
            maps_differ(prev, cur, Some(StatusSnapshot::ELAPSED_KEY))
        }
        (prev, cur) => values_differ(prev, cur),
    }
}

/// A key present on one side and absent on the other reads as `null` and
/// compares like any other leaf.
fn maps_differ(previous: &Map<String, Value>, current: &Map<String, Value>, skip: Option<&str>) -> bool {
    if previous.len() != current.len() {
        return true;
    }
    previous
        .iter()
        .filter(|(key, _)| skip != Some(key.as_str()))
        .any(|(key, prev)| values_differ(prev, current.get(key).unwrap_or(&Value::Null)))
}

fn sequences_differ(previous: &[Value], current: &[Value]) -> bool {
    previous.len() != current.len()
        || previous
            .iter()
            .zip(current)
            .any(|(prev, cur)| values_differ(prev, cur))
}

fn values_differ(previous: &Value, current: &Value) -> bool {
    match (previous, current) {
        (Value::Object(prev), Value::Object(cur)) => maps_differ(prev, cur, None),
        (Value::Array(prev), Value::Array(cur)) => sequences_differ(prev, cur),
        (prev, cur) => prev != cur,
    }
}
