use crate::control::{coerce_bool, ControlMode};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A reading as the controller reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadingMessage {
    #[serde(rename = "umidade")]
    pub soil_moisture: f64,
    #[serde(rename = "luz")]
    pub luminosity: f64,
    #[serde(rename = "bomba_ligada", default, deserialize_with = "pump_state")]
    pub pump_state: bool,
    /// Measurement time, the server clock is used when missing
    #[serde(rename = "data_hora", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ReadingMessage {
    pub fn new(soil_moisture: f64, luminosity: f64, pump_state: bool) -> Self {
        ReadingMessage {
            soil_moisture,
            luminosity,
            pump_state,
            timestamp: None,
        }
    }
}

fn pump_state<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        value => coerce_bool(&value)
            .ok_or_else(|| de::Error::custom(format!("invalid pump state: {}", value))),
    }
}

/// The configuration as the controller consumes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ControlMessage {
    #[serde(rename = "modo")]
    pub mode: ControlMode,
    pub setpoint: f64,
    /// `1` switches the pump on while in manual mode
    #[serde(rename = "comando_manual")]
    pub manual_command: u8,
}

/// A free-form operator change, see `ConfigUpdate::parse`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConfigUpdateMessage {
    #[serde(rename = "chave")]
    pub key: std::string::String,
    #[serde(rename = "valor", default)]
    #[schema(value_type = Object)]
    pub value: Value,
}
