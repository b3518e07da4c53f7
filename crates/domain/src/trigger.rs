//! Temperature trigger — a recipe step that holds until a probe condition
//! is met.
//!
//! A trigger stores the probe *name*, never a live handle: the handle is
//! resolved through the device registry each time it is needed, so a
//! re-wired rig takes effect without touching recipe state. Parameter bags
//! arrive as JSON objects from the recipe editor and are always applied
//! whole, never partially.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::id::NotificationId;
use crate::temperature::{TemperatureScale, parse_decimal};
use crate::time::Timestamp;

/// Direction the temperature must move for the trigger to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionMode {
    /// No direction given — the wait holds while the reading stays within
    /// two canonical degrees of the target.
    #[default]
    None,
    /// Heating: the wait holds until the reading passes above the target.
    Increase,
    /// Cooling: the wait holds until the reading passes below the target.
    Decrease,
}

impl DirectionMode {
    /// Map a parameter string onto a mode. Anything that is not a known
    /// direction (including the editor's empty option) reads as
    /// [`DirectionMode::None`].
    #[must_use]
    pub fn from_param(raw: &str) -> Self {
        match raw {
            "INCREASE" => Self::Increase,
            "DECREASE" => Self::Decrease,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for DirectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Increase => f.write_str("INCREASE"),
            Self::Decrease => f.write_str("DECREASE"),
        }
    }
}

/// A recipe step that blocks progression until a vessel reaches a
/// temperature, coordinating with the PID attached to the probe.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureTrigger {
    position: i32,
    active: bool,
    target_temp: Option<f64>,
    exit_temp: Option<f64>,
    probe: Option<String>,
    mode: Option<DirectionMode>,
    method: String,
    step_type: String,
    started_at: Option<Timestamp>,
    notification: Option<NotificationId>,
}

impl TemperatureTrigger {
    /// Create an empty trigger at a position; configuration is filled in
    /// later through [`update`](Self::update).
    #[must_use]
    pub fn new(position: i32) -> Self {
        Self {
            position,
            active: false,
            target_temp: None,
            exit_temp: None,
            probe: None,
            mode: None,
            method: String::new(),
            step_type: String::new(),
            started_at: None,
            notification: None,
        }
    }

    /// Build a trigger from a parameter bag.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when a required field is absent or a numeric
    /// field cannot be parsed.
    pub fn from_params(position: i32, params: &Value) -> Result<Self, ParseError> {
        let mut trigger = Self::new(position);
        trigger.update(params)?;
        Ok(trigger)
    }

    /// Replace the trigger's configuration with a full new parameter bag.
    ///
    /// Every field is read again — the bag is never partial. An absent or
    /// empty `exitTemperature` falls back to the target temperature.
    /// Nothing is mutated when parsing fails.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when a required field is absent or a numeric
    /// field cannot be parsed.
    pub fn update(&mut self, params: &Value) -> Result<(), ParseError> {
        let target = parse_decimal("targetTemperature", &required(params, "targetTemperature")?)?;
        let exit = match optional(params, "exitTemperature") {
            Some(raw) if !raw.is_empty() => parse_decimal("exitTemperature", &raw)?,
            _ => target,
        };
        let method = required(params, "method")?;
        let step_type = required(params, "stepType")?;
        let probe = required(params, "tempprobe")?;
        let mode = DirectionMode::from_param(&required(params, "mode")?);

        self.target_temp = Some(target);
        self.exit_temp = Some(exit);
        self.probe = Some(probe);
        self.method = method;
        self.step_type = step_type;
        self.mode = Some(mode);
        Ok(())
    }

    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the trigger as the one the recipe is currently gated on.
    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    #[must_use]
    pub fn target_temp(&self) -> Option<f64> {
        self.target_temp
    }

    /// Override the target setpoint outside a full parameter update, e.g.
    /// when a recipe imports a step's start temperature.
    pub fn set_target_temp(&mut self, target: f64) {
        self.target_temp = Some(target);
    }

    pub fn set_exit_temp(&mut self, exit: f64) {
        self.exit_temp = Some(exit);
    }

    /// Point the trigger at another probe by name.
    pub fn set_probe_name(&mut self, name: impl Into<String>) {
        self.probe = Some(name.into());
    }

    /// The setpoint applied once the target is reached. Defaults to the
    /// target temperature when never configured.
    #[must_use]
    pub fn exit_temp(&self) -> Option<f64> {
        self.exit_temp.or(self.target_temp)
    }

    #[must_use]
    pub fn probe_name(&self) -> Option<&str> {
        self.probe.as_deref()
    }

    #[must_use]
    pub fn mode(&self) -> Option<DirectionMode> {
        self.mode
    }

    #[must_use]
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Record when the blocking wait began.
    pub fn mark_started(&mut self, at: Timestamp) {
        self.started_at = Some(at);
    }

    /// Remember the operator notification raised on activation.
    pub fn set_notification(&mut self, id: NotificationId) {
        self.notification = Some(id);
    }

    /// Hand back the notification handle for retraction.
    pub fn take_notification(&mut self) -> Option<NotificationId> {
        self.notification.take()
    }

    /// Whether the wait should keep blocking for the given probe reading.
    ///
    /// `Increase` holds while the reading has not passed above the target
    /// and `Decrease` while it has not passed below — both boundaries
    /// inclusive, so a reading exactly on target keeps waiting. Without a
    /// direction the wait holds while the reading stays *within* two
    /// canonical degrees of the target.
    #[must_use]
    pub fn still_waiting(&self, reading: f64, scale: TemperatureScale) -> bool {
        let Some(target) = self.target_temp else {
            return false;
        };
        match self.mode.unwrap_or_default() {
            DirectionMode::Increase => reading <= target,
            DirectionMode::Decrease => reading >= target,
            DirectionMode::None => scale.delta_to_fahrenheit((reading - target).abs()) <= 2.0,
        }
    }

    /// Project the trigger into its reporting shape.
    ///
    /// `scale` is the resolved probe's scale; the start timestamp renders
    /// as an empty string until the wait has begun.
    #[must_use]
    pub fn status(&self, scale: TemperatureScale) -> TriggerStatus {
        let target = self
            .target_temp
            .map(|temp| format!("{temp:.2}{scale}"))
            .unwrap_or_default();
        let mut description = format!("{}: {}", self.method, self.step_type);
        if let Some(mode) = self.mode {
            let _ = write!(description, " ({mode})");
        }
        TriggerStatus {
            position: self.position,
            start: self
                .started_at
                .map(|at| at.format("%Y/%m/%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            target,
            description,
            active: self.active.to_string(),
        }
    }
}

/// Read-only reporting projection of a trigger, as rendered to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerStatus {
    pub position: i32,
    pub start: String,
    pub target: String,
    pub description: String,
    pub active: String,
}

fn required(params: &Value, field: &'static str) -> Result<String, ParseError> {
    optional(params, field).ok_or(ParseError::MissingField(field))
}

/// Parameter values arrive as JSON strings from the recipe editor but may
/// also be plain numbers or booleans; all are read through their string
/// form.
fn optional(params: &Value, field: &str) -> Option<String> {
    match params.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
