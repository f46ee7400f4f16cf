use crate::error::ControlError;
use crate::messaging::{ConfigUpdateMessage, ControlMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub const DEFAULT_MOISTURE_SETPOINT: f64 = 60.0;

pub const KEY_MODE: &str = "modo";
pub const KEY_SETPOINT: &str = "setpoint";
pub const KEY_MANUAL_COMMAND: &str = "comando_manual";

/// Decides who drives the pump
///
/// In `Automatic` mode the controller compares the soil moisture against
/// the setpoint, in `Manual` mode it follows the operator's command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ControlMode {
    #[default]
    #[serde(rename = "AUTOMATICO", alias = "AUTOMATIC")]
    Automatic,
    #[serde(rename = "MANUAL")]
    Manual,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Automatic => "AUTOMATICO",
            ControlMode::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlMode {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("AUTOMATICO") || trimmed.eq_ignore_ascii_case("AUTOMATIC")
        {
            Ok(ControlMode::Automatic)
        } else if trimmed.eq_ignore_ascii_case("MANUAL") {
            Ok(ControlMode::Manual)
        } else {
            Err(ControlError::InvalidMode(s.to_owned()))
        }
    }
}

/// The singleton control record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub mode: ControlMode,
    pub moisture_setpoint: f64,
    pub manual_pump_command: bool,
}

impl std::default::Default for Configuration {
    fn default() -> Self {
        Configuration {
            mode: ControlMode::Automatic,
            moisture_setpoint: DEFAULT_MOISTURE_SETPOINT,
            manual_pump_command: false,
        }
    }
}

impl Configuration {
    pub fn apply(&mut self, update: &ConfigUpdate) {
        match update {
            ConfigUpdate::Mode(mode) => self.mode = *mode,
            ConfigUpdate::Setpoint(setpoint) => self.moisture_setpoint = *setpoint,
            ConfigUpdate::ManualCommand(active) => self.manual_pump_command = *active,
        }
    }

    /// Shapes the configuration the way the controller polls it
    pub fn control_message(&self) -> ControlMessage {
        ControlMessage {
            mode: self.mode,
            setpoint: self.moisture_setpoint,
            manual_command: u8::from(self.manual_pump_command),
        }
    }
}

/// A single operator change, one case per updatable field
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    Mode(ControlMode),
    Setpoint(f64),
    ManualCommand(bool),
}

impl ConfigUpdate {
    /// Parses a free-form `chave`/`valor` pair
    pub fn parse(key: &str, value: &Value) -> Result<Self, ControlError> {
        match key {
            KEY_MODE => match value {
                Value::String(mode) => Ok(ConfigUpdate::Mode(mode.parse()?)),
                other => Err(ControlError::InvalidMode(other.to_string())),
            },
            KEY_SETPOINT => coerce_f64(value)
                .map(ConfigUpdate::Setpoint)
                .ok_or_else(|| ControlError::InvalidValue(key.to_owned(), value.to_string())),
            KEY_MANUAL_COMMAND => coerce_bool(value)
                .map(ConfigUpdate::ManualCommand)
                .ok_or_else(|| ControlError::InvalidValue(key.to_owned(), value.to_string())),
            _ => Err(ControlError::InvalidKey(key.to_owned())),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ConfigUpdate::Mode(_) => KEY_MODE,
            ConfigUpdate::Setpoint(_) => KEY_SETPOINT,
            ConfigUpdate::ManualCommand(_) => KEY_MANUAL_COMMAND,
        }
    }
}

impl fmt::Display for ConfigUpdate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigUpdate::Mode(mode) => write!(f, "{}", mode),
            ConfigUpdate::Setpoint(setpoint) => write!(f, "{}", setpoint),
            ConfigUpdate::ManualCommand(active) => write!(f, "{}", u8::from(*active)),
        }
    }
}

impl TryFrom<ConfigUpdateMessage> for ConfigUpdate {
    type Error = ControlError;

    fn try_from(msg: ConfigUpdateMessage) -> Result<Self, Self::Error> {
        ConfigUpdate::parse(&msg.key, &msg.value)
    }
}

/// Accepts `true`/`false`, integers and integer strings; non-zero is `true`
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i != 0)
            .or_else(|| n.as_f64().map(|f| f.trunc() != 0.0)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|i| i != 0),
        _ => None,
    }
}

/// Accepts numbers and numeric strings, rejects non-finite values
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mode() {
        assert_eq!(
            ConfigUpdate::Mode(ControlMode::Manual),
            ConfigUpdate::parse("modo", &json!("MANUAL")).unwrap()
        );
        assert_eq!(
            ConfigUpdate::Mode(ControlMode::Automatic),
            ConfigUpdate::parse("modo", &json!("AUTOMATICO")).unwrap()
        );
        assert_eq!(
            ConfigUpdate::Mode(ControlMode::Automatic),
            ConfigUpdate::parse("modo", &json!("AUTOMATIC")).unwrap()
        );
        assert!(ConfigUpdate::parse("modo", &json!("TURBO")).is_err());
        assert!(ConfigUpdate::parse("modo", &json!(1)).is_err());
    }

    #[test]
    fn test_parse_setpoint() {
        assert_eq!(
            ConfigUpdate::Setpoint(55.5),
            ConfigUpdate::parse("setpoint", &json!(55.5)).unwrap()
        );
        assert_eq!(
            ConfigUpdate::Setpoint(40.0),
            ConfigUpdate::parse("setpoint", &json!(" 40 ")).unwrap()
        );
        assert!(ConfigUpdate::parse("setpoint", &json!("wet")).is_err());
        assert!(ConfigUpdate::parse("setpoint", &json!(null)).is_err());
    }

    #[test]
    fn test_parse_manual_command() {
        for (value, expected) in [
            (json!(1), true),
            (json!(0), false),
            (json!("1"), true),
            (json!("0"), false),
            (json!(true), true),
            (json!(false), false),
        ] {
            assert_eq!(
                ConfigUpdate::ManualCommand(expected),
                ConfigUpdate::parse("comando_manual", &value).unwrap()
            );
        }
        assert!(ConfigUpdate::parse("comando_manual", &json!("on")).is_err());
    }

    #[test]
    fn test_parse_invalid_key() {
        let err = ConfigUpdate::parse("bomba", &json!(1)).unwrap_err();
        assert_eq!(ControlError::InvalidKey("bomba".to_owned()), err);
    }

    #[test]
    fn test_apply_and_control_message() {
        let mut config = Configuration::default();
        config.apply(&ConfigUpdate::Mode(ControlMode::Manual));
        config.apply(&ConfigUpdate::Setpoint(35.0));
        config.apply(&ConfigUpdate::ManualCommand(true));

        let msg = config.control_message();
        assert_eq!(ControlMode::Manual, msg.mode);
        assert_eq!(35.0, msg.setpoint);
        assert_eq!(1, msg.manual_command);
    }
}
