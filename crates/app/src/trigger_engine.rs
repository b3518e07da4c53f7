//! Trigger engine — drives a temperature trigger against live devices.
//!
//! The engine owns no device state: probes and controllers are resolved
//! through the registry port at the moment they are needed, so a recipe
//! edit or a re-wired rig takes effect on the very next operation.

use std::time::Duration;

use tokio::sync::watch;

use brewrig_domain::error::ParseError;
use brewrig_domain::temperature::TemperatureScale;
use brewrig_domain::time::now;
use brewrig_domain::trigger::{TemperatureTrigger, TriggerStatus};

use crate::ports::{DeviceRegistry, NotificationSink, SetpointController, TemperatureProbe};

/// Default interval between probe polls while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Which configuration was missing when a wait was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPrecondition {
    TargetTemperature,
    Probe,
    DirectionMode,
}

/// Outcome of [`TriggerEngine::wait_for_trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The condition was met; any distinct exit setpoint has been pushed.
    Completed,
    /// The wait was interrupted before the condition was met; the exit
    /// setpoint has not been pushed.
    Cancelled,
    /// A precondition was unmet; the wait returned without blocking.
    Skipped(MissingPrecondition),
}

/// Drives trigger activation, waiting, and deactivation against the
/// device registry and notification ports.
pub struct TriggerEngine<R, N> {
    registry: R,
    notifier: N,
    poll_interval: Duration,
}

impl<R: DeviceRegistry, N: NotificationSink> TriggerEngine<R, N> {
    pub fn new(registry: R, notifier: N) -> Self {
        Self {
            registry,
            notifier,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the probe polling cadence.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Activate a trigger: push its target setpoint to the attached PID
    /// and raise an operator notification naming the target.
    pub async fn activate(&self, trigger: &mut TemperatureTrigger) {
        trigger.activate();
        self.push_setpoint(trigger, trigger.target_temp()).await;

        let scale = self.probe_scale(trigger).await;
        let message = match (trigger.target_temp(), trigger.probe_name()) {
            (Some(target), Some(probe)) => {
                format!("Waiting for {probe} to reach {target:.2}{scale}")
            }
            _ => format!("Trigger {} activated", trigger.position()),
        };
        let id = self.notifier.post(message).await;
        trigger.set_notification(id);
    }

    /// Deactivate a trigger and retract its notification.
    pub async fn deactivate(&self, trigger: &mut TemperatureTrigger) {
        trigger.deactivate();
        if let Some(id) = trigger.take_notification() {
            self.notifier.retract(id).await;
        }
    }

    /// Apply a live recipe edit. When the trigger is active the new target
    /// is pushed to the controller immediately, without waiting for
    /// re-activation.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the parameter bag is malformed; the
    /// trigger keeps its previous configuration.
    pub async fn update_live(
        &self,
        trigger: &mut TemperatureTrigger,
        params: &serde_json::Value,
    ) -> Result<(), ParseError> {
        trigger.update(params)?;
        if trigger.is_active() {
            self.push_setpoint(trigger, trigger.target_temp()).await;
        }
        Ok(())
    }

    /// Block until the trigger's condition holds.
    ///
    /// Unmet preconditions (no target, unresolvable probe, no mode) log a
    /// warning and return [`WaitOutcome::Skipped`] without blocking. There
    /// is no timeout: an unreachable target blocks until `cancel` fires —
    /// dropping the cancel sender counts as cancellation.
    pub async fn wait_for_trigger(
        &self,
        trigger: &mut TemperatureTrigger,
        mut cancel: watch::Receiver<bool>,
    ) -> WaitOutcome {
        if trigger.target_temp().is_none() {
            tracing::warn!(position = trigger.position(), "no target temperature set");
            return WaitOutcome::Skipped(MissingPrecondition::TargetTemperature);
        }
        let probe = match trigger.probe_name() {
            Some(name) => match self.registry.probe(name).await {
                Some(probe) => probe,
                None => {
                    tracing::warn!(probe = name, "temperature probe did not resolve");
                    return WaitOutcome::Skipped(MissingPrecondition::Probe);
                }
            },
            None => {
                tracing::warn!(position = trigger.position(), "no temperature probe set");
                return WaitOutcome::Skipped(MissingPrecondition::Probe);
            }
        };
        if trigger.mode().is_none() {
            tracing::warn!(position = trigger.position(), "no direction mode set");
            return WaitOutcome::Skipped(MissingPrecondition::DirectionMode);
        }

        self.push_setpoint(trigger, trigger.target_temp()).await;
        trigger.mark_started(now());

        loop {
            let reading = probe.current_temperature().await;
            if !trigger.still_waiting(reading, probe.scale()) {
                break;
            }
            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                _ = cancel.changed() => {
                    tracing::warn!(position = trigger.position(), "temperature trigger interrupted");
                    return WaitOutcome::Cancelled;
                }
            }
        }

        if trigger.exit_temp() != trigger.target_temp() {
            self.push_setpoint(trigger, trigger.exit_temp()).await;
        }
        WaitOutcome::Completed
    }

    /// Project a trigger's status, resolving the probe for its scale.
    pub async fn status(&self, trigger: &TemperatureTrigger) -> TriggerStatus {
        trigger.status(self.probe_scale(trigger).await)
    }

    /// Push a setpoint to the controller attached to the trigger's probe.
    ///
    /// A probe without a controller is informational, not an error: the
    /// trigger still completes by polling the probe directly.
    async fn push_setpoint(&self, trigger: &TemperatureTrigger, setpoint: Option<f64>) {
        let (Some(name), Some(setpoint)) = (trigger.probe_name(), setpoint) else {
            return;
        };
        match self.registry.controller(name).await {
            Some(controller) => controller.set_setpoint(setpoint).await,
            None => tracing::info!(
                probe = name,
                "probe has no PID attached, trigger will wait on the probe directly",
            ),
        }
    }

    async fn probe_scale(&self, trigger: &TemperatureTrigger) -> TemperatureScale {
        match trigger.probe_name() {
            Some(name) => self
                .registry
                .probe(name)
                .await
                .map_or_else(TemperatureScale::default, |probe| probe.scale()),
            None => TemperatureScale::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use brewrig_domain::id::NotificationId;

    // ── Fake devices ───────────────────────────────────────────────

    #[derive(Clone)]
    struct FakeProbe {
        reading: Arc<Mutex<f64>>,
        scale: TemperatureScale,
    }

    impl FakeProbe {
        fn at(reading: f64) -> Self {
            Self {
                reading: Arc::new(Mutex::new(reading)),
                scale: TemperatureScale::Celsius,
            }
        }

        fn set(&self, reading: f64) {
            *self.reading.lock().unwrap() = reading;
        }
    }

    impl TemperatureProbe for FakeProbe {
        fn current_temperature(&self) -> impl Future<Output = f64> + Send {
            let value = *self.reading.lock().unwrap();
            async move { value }
        }

        fn scale(&self) -> TemperatureScale {
            self.scale
        }
    }

    #[derive(Clone, Default)]
    struct FakeController {
        setpoints: Arc<Mutex<Vec<f64>>>,
    }

    impl FakeController {
        fn history(&self) -> Vec<f64> {
            self.setpoints.lock().unwrap().clone()
        }
    }

    impl SetpointController for FakeController {
        fn set_setpoint(&self, value: f64) -> impl Future<Output = ()> + Send {
            self.setpoints.lock().unwrap().push(value);
            async {}
        }
    }

    #[derive(Clone, Default)]
    struct FakeRegistry {
        probes: Arc<Mutex<HashMap<String, FakeProbe>>>,
        controllers: Arc<Mutex<HashMap<String, FakeController>>>,
    }

    impl FakeRegistry {
        fn with_probe(self, name: &str, probe: FakeProbe) -> Self {
            self.probes.lock().unwrap().insert(name.to_string(), probe);
            self
        }

        fn with_controller(self, name: &str, controller: FakeController) -> Self {
            self.controllers
                .lock()
                .unwrap()
                .insert(name.to_string(), controller);
            self
        }
    }

    impl DeviceRegistry for FakeRegistry {
        type Probe = FakeProbe;
        type Controller = FakeController;

        fn probe(&self, name: &str) -> impl Future<Output = Option<FakeProbe>> + Send {
            let probe = self.probes.lock().unwrap().get(name).cloned();
            async move { probe }
        }

        fn controller(&self, probe_name: &str) -> impl Future<Output = Option<FakeController>> + Send {
            let controller = self.controllers.lock().unwrap().get(probe_name).cloned();
            async move { controller }
        }
    }

    #[derive(Clone, Default)]
    struct SpyNotifier {
        active: Arc<Mutex<HashMap<NotificationId, String>>>,
    }

    impl SpyNotifier {
        fn active_messages(&self) -> Vec<String> {
            self.active.lock().unwrap().values().cloned().collect()
        }
    }

    impl NotificationSink for SpyNotifier {
        fn post(&self, message: String) -> impl Future<Output = NotificationId> + Send {
            let id = NotificationId::new();
            self.active.lock().unwrap().insert(id, message);
            async move { id }
        }

        fn retract(&self, id: NotificationId) -> impl Future<Output = ()> + Send {
            self.active.lock().unwrap().remove(&id);
            async {}
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn mash_params(target: &str, exit: &str, mode: &str) -> serde_json::Value {
        json!({
            "targetTemperature": target,
            "exitTemperature": exit,
            "method": "Mash",
            "stepType": "Saccharification",
            "tempprobe": "Mash",
            "mode": mode,
        })
    }

    fn engine(
        registry: FakeRegistry,
        notifier: SpyNotifier,
    ) -> TriggerEngine<FakeRegistry, SpyNotifier> {
        TriggerEngine::new(registry, notifier).with_poll_interval(Duration::from_millis(5))
    }

    fn cancel_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    // ── Precondition tests ─────────────────────────────────────────

    #[tokio::test]
    async fn should_skip_wait_without_target_temperature() {
        let engine = engine(FakeRegistry::default(), SpyNotifier::default());
        let mut trigger = TemperatureTrigger::new(0);
        let (_tx, rx) = cancel_channel();

        let outcome = engine.wait_for_trigger(&mut trigger, rx).await;
        assert_eq!(
            outcome,
            WaitOutcome::Skipped(MissingPrecondition::TargetTemperature)
        );
        assert!(trigger.started_at().is_none());
    }

    #[tokio::test]
    async fn should_skip_wait_when_probe_does_not_resolve() {
        let engine = engine(FakeRegistry::default(), SpyNotifier::default());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("65", "", "INCREASE")).unwrap();
        let (_tx, rx) = cancel_channel();

        let outcome = engine.wait_for_trigger(&mut trigger, rx).await;
        assert_eq!(outcome, WaitOutcome::Skipped(MissingPrecondition::Probe));
    }

    #[tokio::test]
    async fn should_skip_wait_without_direction_mode() {
        let registry = FakeRegistry::default().with_probe("Mash", FakeProbe::at(60.0));
        let engine = engine(registry, SpyNotifier::default());
        let mut trigger = TemperatureTrigger::new(0);
        trigger.set_target_temp(65.0);
        trigger.set_probe_name("Mash");
        let (_tx, rx) = cancel_channel();

        let outcome = engine.wait_for_trigger(&mut trigger, rx).await;
        assert_eq!(
            outcome,
            WaitOutcome::Skipped(MissingPrecondition::DirectionMode)
        );
    }

    // ── Wait predicate tests ───────────────────────────────────────

    #[tokio::test]
    async fn should_complete_increase_wait_only_above_target() {
        let probe = FakeProbe::at(65.0);
        let controller = FakeController::default();
        let registry = FakeRegistry::default()
            .with_probe("Mash", probe.clone())
            .with_controller("Mash", controller.clone());
        let notifier = SpyNotifier::default();
        let trigger =
            TemperatureTrigger::from_params(0, &mash_params("65", "", "INCREASE")).unwrap();
        let (_tx, rx) = cancel_channel();

        let handle = tokio::spawn({
            let engine = engine(registry, notifier);
            let mut trigger = trigger;
            async move { engine.wait_for_trigger(&mut trigger, rx).await }
        });

        // Exactly on target is not enough for an INCREASE trigger.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!handle.is_finished());

        probe.set(65.1);
        let outcome = handle.await.unwrap();
        assert_eq!(outcome, WaitOutcome::Completed);
    }

    #[tokio::test]
    async fn should_complete_decrease_wait_only_below_target() {
        let probe = FakeProbe::at(70.0);
        let registry = FakeRegistry::default().with_probe("Mash", probe.clone());
        let trigger =
            TemperatureTrigger::from_params(0, &mash_params("70", "", "DECREASE")).unwrap();
        let (_tx, rx) = cancel_channel();

        let handle = tokio::spawn({
            let engine = engine(registry, SpyNotifier::default());
            let mut trigger = trigger;
            async move { engine.wait_for_trigger(&mut trigger, rx).await }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!handle.is_finished());

        probe.set(69.9);
        assert_eq!(handle.await.unwrap(), WaitOutcome::Completed);
    }

    #[tokio::test]
    async fn should_record_start_timestamp_when_wait_begins() {
        let registry = FakeRegistry::default().with_probe("Mash", FakeProbe::at(70.0));
        let engine = engine(registry, SpyNotifier::default());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("65", "", "INCREASE")).unwrap();
        let (_tx, rx) = cancel_channel();

        engine.wait_for_trigger(&mut trigger, rx).await;
        assert!(trigger.started_at().is_some());
    }

    // ── Setpoint tests ─────────────────────────────────────────────

    #[tokio::test]
    async fn should_push_exit_setpoint_once_after_completion() {
        let controller = FakeController::default();
        let registry = FakeRegistry::default()
            .with_probe("Mash", FakeProbe::at(70.0))
            .with_controller("Mash", controller.clone());
        let engine = engine(registry, SpyNotifier::default());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("65", "62", "INCREASE")).unwrap();
        let (_tx, rx) = cancel_channel();

        let outcome = engine.wait_for_trigger(&mut trigger, rx).await;
        assert_eq!(outcome, WaitOutcome::Completed);
        assert_eq!(controller.history(), vec![65.0, 62.0]);
    }

    #[tokio::test]
    async fn should_not_push_exit_setpoint_when_equal_to_target() {
        let controller = FakeController::default();
        let registry = FakeRegistry::default()
            .with_probe("Mash", FakeProbe::at(70.0))
            .with_controller("Mash", controller.clone());
        let engine = engine(registry, SpyNotifier::default());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("65", "", "INCREASE")).unwrap();
        let (_tx, rx) = cancel_channel();

        engine.wait_for_trigger(&mut trigger, rx).await;
        assert_eq!(controller.history(), vec![65.0]);
    }

    #[tokio::test]
    async fn should_cancel_wait_without_pushing_exit_setpoint() {
        let controller = FakeController::default();
        let registry = FakeRegistry::default()
            .with_probe("Mash", FakeProbe::at(60.0))
            .with_controller("Mash", controller.clone());
        let trigger =
            TemperatureTrigger::from_params(0, &mash_params("65", "62", "INCREASE")).unwrap();
        let (tx, rx) = cancel_channel();

        let handle = tokio::spawn({
            let engine = engine(registry, SpyNotifier::default());
            let mut trigger = trigger;
            async move { engine.wait_for_trigger(&mut trigger, rx).await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        assert_eq!(handle.await.unwrap(), WaitOutcome::Cancelled);
        assert_eq!(controller.history(), vec![65.0]);
    }

    #[tokio::test]
    async fn should_wait_on_probe_directly_when_no_controller_attached() {
        let registry = FakeRegistry::default().with_probe("Mash", FakeProbe::at(70.0));
        let engine = engine(registry, SpyNotifier::default());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("65", "", "INCREASE")).unwrap();
        let (_tx, rx) = cancel_channel();

        let outcome = engine.wait_for_trigger(&mut trigger, rx).await;
        assert_eq!(outcome, WaitOutcome::Completed);
    }

    // ── Activation & live-update tests ─────────────────────────────

    #[tokio::test]
    async fn should_push_target_and_notify_on_activation() {
        let controller = FakeController::default();
        let registry = FakeRegistry::default()
            .with_probe("Mash", FakeProbe::at(60.0))
            .with_controller("Mash", controller.clone());
        let notifier = SpyNotifier::default();
        let engine = engine(registry, notifier.clone());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("66.5", "", "INCREASE")).unwrap();

        engine.activate(&mut trigger).await;

        assert!(trigger.is_active());
        assert_eq!(controller.history(), vec![66.5]);
        let messages = notifier.active_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("66.50C"));
        assert!(messages[0].contains("Mash"));
    }

    #[tokio::test]
    async fn should_retract_notification_on_deactivation() {
        let registry = FakeRegistry::default().with_probe("Mash", FakeProbe::at(60.0));
        let notifier = SpyNotifier::default();
        let engine = engine(registry, notifier.clone());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("66.5", "", "INCREASE")).unwrap();

        engine.activate(&mut trigger).await;
        engine.deactivate(&mut trigger).await;

        assert!(!trigger.is_active());
        assert!(notifier.active_messages().is_empty());
    }

    #[tokio::test]
    async fn should_repush_target_when_updating_active_trigger() {
        let controller = FakeController::default();
        let registry = FakeRegistry::default()
            .with_probe("Mash", FakeProbe::at(60.0))
            .with_controller("Mash", controller.clone());
        let engine = engine(registry, SpyNotifier::default());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("66.5", "", "INCREASE")).unwrap();

        engine.activate(&mut trigger).await;
        engine
            .update_live(&mut trigger, &mash_params("68", "", "INCREASE"))
            .await
            .unwrap();

        assert_eq!(controller.history(), vec![66.5, 68.0]);
    }

    #[tokio::test]
    async fn should_not_push_setpoint_when_updating_inactive_trigger() {
        let controller = FakeController::default();
        let registry = FakeRegistry::default()
            .with_probe("Mash", FakeProbe::at(60.0))
            .with_controller("Mash", controller.clone());
        let engine = engine(registry, SpyNotifier::default());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("66.5", "", "INCREASE")).unwrap();

        engine
            .update_live(&mut trigger, &mash_params("68", "", "INCREASE"))
            .await
            .unwrap();

        assert!(controller.history().is_empty());
    }

    #[tokio::test]
    async fn should_reject_malformed_live_update() {
        let registry = FakeRegistry::default().with_probe("Mash", FakeProbe::at(60.0));
        let engine = engine(registry, SpyNotifier::default());
        let mut trigger =
            TemperatureTrigger::from_params(0, &mash_params("66.5", "", "INCREASE")).unwrap();

        let result = engine
            .update_live(&mut trigger, &mash_params("warm", "", "INCREASE"))
            .await;

        assert!(result.is_err());
        assert_eq!(trigger.target_temp(), Some(66.5));
    }

    #[tokio::test]
    async fn should_resolve_probe_scale_for_status() {
        let registry = FakeRegistry::default().with_probe("Mash", FakeProbe::at(60.0));
        let engine = engine(registry, SpyNotifier::default());
        let trigger =
            TemperatureTrigger::from_params(0, &mash_params("66.5", "", "INCREASE")).unwrap();

        let status = engine.status(&trigger).await;
        assert_eq!(status.target, "66.50C");
    }
}
