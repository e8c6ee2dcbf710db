//! Actuator command / response record.
//!
//! The same shape carries both roles; `is_response` tells them apart.
//! A response is only ever produced by [`ActuatorRecord::to_response`],
//! which copies the triggering request field-for-field.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_VAL, RecordMeta};

// ───────────────────────────────────────────────────────────────
// Command
// ───────────────────────────────────────────────────────────────

/// Actuator command.  Encoded on the wire as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Command {
    #[default]
    Off,
    On,
    /// Any other integer; answered with status -1.
    Unknown(i32),
}

impl Command {
    pub const OFF: i32 = 0;
    pub const ON: i32 = 1;
}

impl From<i32> for Command {
    fn from(raw: i32) -> Self {
        match raw {
            Self::OFF => Self::Off,
            Self::ON => Self::On,
            other => Self::Unknown(other),
        }
    }
}

impl From<Command> for i32 {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Off => Command::OFF,
            Command::On => Command::ON,
            Command::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "OFF"),
            Self::On => write!(f, "ON"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ActuatorRecord
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActuatorRecord {
    #[serde(flatten)]
    meta: RecordMeta,
    #[serde(default)]
    command: Command,
    #[serde(default)]
    value: f64,
    #[serde(default)]
    state_data: String,
    #[serde(default)]
    is_response: bool,
}

impl ActuatorRecord {
    /// A fresh OFF request addressed to actuator type `type_id`.
    pub fn new(name: impl Into<String>, type_id: i32) -> Self {
        Self {
            meta: RecordMeta::new(name, type_id),
            command: Command::Off,
            value: DEFAULT_VAL,
            state_data: String::new(),
            is_response: false,
        }
    }

    pub fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    pub fn name(&self) -> &str {
        self.meta.name()
    }

    pub fn type_id(&self) -> i32 {
        self.meta.type_id()
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn state_data(&self) -> &str {
        &self.state_data
    }

    pub fn is_response(&self) -> bool {
        self.is_response
    }

    pub fn set_command(&mut self, command: Command) {
        self.command = command;
        self.meta.touch();
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.meta.touch();
    }

    pub fn set_state_data(&mut self, state_data: impl Into<String>) {
        self.state_data = state_data.into();
        self.meta.touch();
    }

    pub fn set_as_response(&mut self) {
        self.is_response = true;
        self.meta.touch();
    }

    /// Builder-style command + target value.
    #[must_use]
    pub fn with_command(mut self, command: Command, value: f64) -> Self {
        self.set_command(command);
        self.set_value(value);
        self
    }

    #[must_use]
    pub fn with_state_data(mut self, state_data: impl Into<String>) -> Self {
        self.set_state_data(state_data);
        self
    }

    /// Derive the response to this request: a field copy, status-coded
    /// and flagged as a response.
    pub fn to_response(&self, status_code: i32) -> Self {
        let mut resp = self.clone();
        resp.meta.set_status_code(status_code);
        resp.set_as_response();
        resp
    }

    /// Merge every field of `other` into `self`.
    pub fn update_from(&mut self, other: &Self) {
        self.meta.update_from(&other.meta);
        self.command = other.command;
        self.value = other.value;
        self.state_data.clone_from(&other.state_data);
        self.is_response = other.is_response;
    }
}
