//! Status source port — the live rig's current reading.

use std::future::Future;

use brewrig_domain::error::StatusSourceError;
use brewrig_domain::snapshot::StatusSnapshot;

/// Produces the rig's current status snapshot on demand.
pub trait StatusSource {
    /// Sample the rig's state right now.
    fn current_status(
        &self,
    ) -> impl Future<Output = Result<StatusSnapshot, StatusSourceError>> + Send;
}
