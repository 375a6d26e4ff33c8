//! Device identifiers and telemetry records.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Leading decimal number of a power reading such as `"2.45 kW"`.
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("leading number pattern is valid")
});

/// Opaque identifier of one device (its serial number).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Operational status reported for a device.
///
/// Only `Online` and `Offline` are counted by the aggregator; anything else is
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceStatus {
    Online,
    Offline,
    Other(String),
}

impl Default for DeviceStatus {
    fn default() -> Self {
        DeviceStatus::Other(String::new())
    }
}

impl From<String> for DeviceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Online" => DeviceStatus::Online,
            "Offline" => DeviceStatus::Offline,
            _ => DeviceStatus::Other(raw),
        }
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        match status {
            DeviceStatus::Online => "Online".to_string(),
            DeviceStatus::Offline => "Offline".to_string(),
            DeviceStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => f.write_str("Online"),
            DeviceStatus::Offline => f.write_str("Offline"),
            DeviceStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Telemetry for one device, as returned by the query endpoint.
///
/// Decoding never fails on a field value. `power` and `last_updated` are kept
/// as raw JSON because the server sends them either as numbers or as strings
/// (`"2.45 kW"`, ISO timestamps), and sometimes not at all. `sn` and `status`
/// accept any scalar; `null` or a missing field gives the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default, deserialize_with = "deserialize_device_id")]
    pub sn: DeviceId,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: DeviceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Value>,
}

impl DeviceRecord {
    /// Converts one element of the response `data` list.
    ///
    /// An element that is not an object still counts as a device, with every
    /// field at its default.
    pub fn from_wire(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            log::debug!("Unreadable device record kept as unknown: {e}");
            Self::unknown()
        })
    }

    fn unknown() -> Self {
        Self {
            sn: DeviceId::default(),
            status: DeviceStatus::default(),
            power: None,
            last_updated: None,
        }
    }

    /// Power reading in kW, if it is a finite number.
    pub fn power_kw(&self) -> Option<f64> {
        self.power.as_ref().and_then(parse_power)
    }
}

/// Strings as is, other scalars in their JSON form, `null` as absent.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn deserialize_device_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DeviceId, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(DeviceId::new(scalar_to_string(value).unwrap_or_default()))
}

fn deserialize_status<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DeviceStatus, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value)
        .map(DeviceStatus::from)
        .unwrap_or_default())
}

/// Extracts a finite number from a power value.
///
/// Numbers are taken as is. Strings are read up to the end of their leading
/// decimal number, so `"12.5"` and `"12.5 kW"` both give 12.5. Anything else,
/// including `"bad"`, `null` and non-finite values, gives `None`.
pub fn parse_power(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => LEADING_NUMBER
            .find(s)
            .and_then(|m| m.as_str().trim().parse::<f64>().ok()),
        _ => None,
    };
    parsed.filter(|p| p.is_finite())
}
