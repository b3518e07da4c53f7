//! Sequence runner — executes a recipe's triggers one at a time.

use tokio::sync::watch;

use brewrig_domain::sequence::TriggerSequence;

use crate::ports::{DeviceRegistry, NotificationSink};
use crate::trigger_engine::{TriggerEngine, WaitOutcome};

/// How a sequence run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every trigger completed or was skipped.
    Completed,
    /// A wait was interrupted; the remaining triggers were not run.
    Cancelled,
}

/// Drives a [`TriggerSequence`] front to back, one blocking wait at a
/// time.
pub struct SequenceRunner<R, N> {
    engine: TriggerEngine<R, N>,
}

impl<R: DeviceRegistry, N: NotificationSink> SequenceRunner<R, N> {
    pub fn new(engine: TriggerEngine<R, N>) -> Self {
        Self { engine }
    }

    /// Run the sequence until it is exhausted or cancelled.
    ///
    /// Each trigger is activated, waited on, then deactivated before the
    /// cursor moves. A skipped trigger (missing preconditions) does not
    /// stop the recipe; a cancellation does.
    pub async fn run(
        &self,
        sequence: &mut TriggerSequence,
        cancel: watch::Receiver<bool>,
    ) -> RunOutcome {
        loop {
            let Some(trigger) = sequence.current_mut() else {
                return RunOutcome::Completed;
            };
            self.engine.activate(trigger).await;
            let outcome = self.engine.wait_for_trigger(trigger, cancel.clone()).await;
            self.engine.deactivate(trigger).await;

            if outcome == WaitOutcome::Cancelled {
                tracing::info!(position = trigger.position(), "recipe run cancelled");
                return RunOutcome::Cancelled;
            }
            sequence.advance();
        }
    }
}
