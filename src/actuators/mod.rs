//! Actuator control tasks.
//!
//! ```text
//!               update_actuator(req)
//!   ┌──────┐  ───────────────────────▶  ┌──────────────────────────────┐
//!   │ Idle │                            │ Applied(command, value, data) │
//!   └──────┘                            └──────────────┬───────────────┘
//!                                         identical    │   different
//!                                         triple ──▶ None (no hook)
//!                                                      └─▶ hook ─▶ response
//! ```
//!
//! A task only accepts commands addressed to its own type ID.  Repeating
//! the exact `(command, value, state_data)` triple never fires a hook
//! twice, so command delivery is idempotent.

pub mod manager;

use log::{debug, info, warn};

use crate::app::ports::ActuatorPort;
use crate::data::{
    ActuatorRecord, Command, HUMIDIFIER_ACTUATOR_NAME, HUMIDIFIER_ACTUATOR_TYPE,
    HVAC_ACTUATOR_NAME, HVAC_ACTUATOR_TYPE, LED_DISPLAY_ACTUATOR_NAME, LED_DISPLAY_ACTUATOR_TYPE,
};

pub use manager::ActuatorManager;

/// Status code for a command the task does not understand.
pub const STATUS_UNKNOWN_COMMAND: i32 = -1;

/// Characters the LED display can hold.
pub const LED_DISPLAY_CAPACITY: usize = 64;

pub type LedText = heapless::String<LED_DISPLAY_CAPACITY>;

// ───────────────────────────────────────────────────────────────
// Actuator kinds
// ───────────────────────────────────────────────────────────────

/// What an actuator task drives.
pub enum ActuatorKind {
    /// Emulated heating / cooling unit.
    Hvac,
    /// Emulated humidifier.
    Humidifier,
    /// Emulated text display; holds what is currently shown.
    LedDisplay(LedText),
    /// Real or mock hardware behind [`ActuatorPort`].
    Device(Box<dyn ActuatorPort>),
}

impl ActuatorKind {
    pub fn led_display() -> Self {
        Self::LedDisplay(LedText::new())
    }

    fn activate(&mut self, value: f64, state_data: &str) -> i32 {
        match self {
            Self::Hvac => {
                info!("HVAC on, target {:.1}\u{00b0}C", value);
                0
            }
            Self::Humidifier => {
                info!("humidifier on, target {:.1}%RH", value);
                0
            }
            Self::LedDisplay(text) => {
                if state_data.is_empty() {
                    debug!("LED display: nothing to show");
                    return 0;
                }
                text.clear();
                for c in state_data.chars() {
                    if text.push(c).is_err() {
                        warn!("LED display: text truncated to {} bytes", LED_DISPLAY_CAPACITY);
                        break;
                    }
                }
                info!("LED display: \"{}\"", text);
                0
            }
            Self::Device(dev) => dev.activate(value, state_data),
        }
    }

    fn deactivate(&mut self, value: f64, state_data: &str) -> i32 {
        match self {
            Self::Hvac => {
                info!("HVAC off");
                0
            }
            Self::Humidifier => {
                info!("humidifier off");
                0
            }
            Self::LedDisplay(text) => {
                text.clear();
                info!("LED display cleared");
                0
            }
            Self::Device(dev) => dev.deactivate(value, state_data),
        }
    }
}

impl core::fmt::Debug for ActuatorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hvac => write!(f, "Hvac"),
            Self::Humidifier => write!(f, "Humidifier"),
            Self::LedDisplay(text) => write!(f, "LedDisplay({:?})", text.as_str()),
            Self::Device(_) => write!(f, "Device"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ActuatorTask
// ───────────────────────────────────────────────────────────────

/// Last triple handed to a hook.  `value` is compared bit-for-bit.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AppliedState {
    command: Command,
    value_bits: u64,
    state_data: String,
}

impl AppliedState {
    fn of(record: &ActuatorRecord) -> Self {
        Self {
            command: record.command(),
            value_bits: record.value().to_bits(),
            state_data: record.state_data().to_owned(),
        }
    }
}

/// One actuator: type gate, dedup guard and hook dispatch.
#[derive(Debug)]
pub struct ActuatorTask {
    type_id: i32,
    kind: ActuatorKind,
    /// `None` while idle: the first command always applies.
    last_applied: Option<AppliedState>,
    latest_response: ActuatorRecord,
}

impl ActuatorTask {
    pub fn new(name: impl Into<String>, type_id: i32, kind: ActuatorKind) -> Self {
        let mut latest_response = ActuatorRecord::new(name, type_id);
        latest_response.set_as_response();
        Self {
            type_id,
            kind,
            last_applied: None,
            latest_response,
        }
    }

    pub fn hvac() -> Self {
        Self::new(HVAC_ACTUATOR_NAME, HVAC_ACTUATOR_TYPE, ActuatorKind::Hvac)
    }

    pub fn humidifier() -> Self {
        Self::new(HUMIDIFIER_ACTUATOR_NAME, HUMIDIFIER_ACTUATOR_TYPE, ActuatorKind::Humidifier)
    }

    pub fn led_display() -> Self {
        Self::new(
            LED_DISPLAY_ACTUATOR_NAME,
            LED_DISPLAY_ACTUATOR_TYPE,
            ActuatorKind::led_display(),
        )
    }

    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    pub fn kind(&self) -> &ActuatorKind {
        &self.kind
    }

    /// Text on an LED display task; `None` for other kinds.
    pub fn display_text(&self) -> Option<&str> {
        match &self.kind {
            ActuatorKind::LedDisplay(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.last_applied.is_none()
    }

    /// Running merge of every response this task has produced.
    pub fn latest_response(&self) -> &ActuatorRecord {
        &self.latest_response
    }

    /// Apply a command.
    ///
    /// Returns `None` for an absent record, a foreign type ID, or an exact
    /// repeat of the last applied triple.  Otherwise fires the matching
    /// hook and returns the response derived from `record`.
    pub fn update_actuator(&mut self, record: Option<&ActuatorRecord>) -> Option<ActuatorRecord> {
        let Some(req) = record else {
            warn!("actuator {}: no command given", self.type_id);
            return None;
        };
        if req.type_id() != self.type_id {
            warn!(
                "actuator {}: ignoring command for type {}",
                self.type_id,
                req.type_id()
            );
            return None;
        }

        let incoming = AppliedState::of(req);
        if self.last_applied.as_ref() == Some(&incoming) {
            debug!(
                "actuator {}: repeat of {} {} suppressed",
                self.type_id,
                req.command(),
                req.value()
            );
            return None;
        }

        let status = match req.command() {
            Command::On => self.kind.activate(req.value(), req.state_data()),
            Command::Off => self.kind.deactivate(req.value(), req.state_data()),
            Command::Unknown(raw) => {
                warn!("actuator {}: unknown command {}", self.type_id, raw);
                STATUS_UNKNOWN_COMMAND
            }
        };
        self.last_applied = Some(incoming);

        let resp = req.to_response(status);
        self.latest_response.update_from(&resp);
        Some(resp)
    }
}
