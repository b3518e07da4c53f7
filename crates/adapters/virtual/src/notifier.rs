//! In-memory notification sink.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use brewrig_app::ports::NotificationSink;
use brewrig_domain::id::NotificationId;

/// Keeps posted notifications in memory until they are retracted.
///
/// Cheap to clone; clones share the same message board.
#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    active: Arc<Mutex<HashMap<NotificationId, String>>>,
}

impl InMemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages currently posted, in no particular order.
    #[must_use]
    pub fn active_messages(&self) -> Vec<String> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<NotificationId, String>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSink for InMemoryNotifier {
    fn post(&self, message: String) -> impl Future<Output = NotificationId> + Send {
        let id = NotificationId::new();
        self.lock().insert(id, message);
        async move { id }
    }

    fn retract(&self, id: NotificationId) -> impl Future<Output = ()> + Send {
        self.lock().remove(&id);
        async {}
    }
}
