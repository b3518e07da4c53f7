//! Brew timer — a named, position-ordered countdown slot on the rig.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A named timer shown alongside the brew controls.
///
/// Timers share the triggers' position ordering but carry no gating logic;
/// they only count and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewTimer {
    name: String,
    position: i32,
    mode: Option<String>,
}

impl BrewTimer {
    /// Create a timer.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is empty.
    pub fn new(name: impl Into<String>, position: i32) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name,
            position,
            mode: None,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with spaces replaced, safe for file names and element ids.
    #[must_use]
    pub fn safe_name(&self) -> String {
        self.name.replace(' ', "_")
    }

    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    pub fn set_mode(&mut self, mode: impl Into<String>) {
        self.mode = Some(mode.into());
    }
}
