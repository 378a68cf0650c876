use crate::domain::{SubstationProperties, TransmissionLineProperties};
use serde::Serialize;
use serde_json::{Map, Value};

/// Free-form feature properties as they appear in the data files.
///
/// Accessors never fail: missing or malformed values read as `None`, and
/// the typed views fall back to an empty string or zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct FeatureProperties(Map<String, Value>);

impl FeatureProperties {
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|value| !value.is_null())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Numeric value; numbers stored as strings are accepted.
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = match self.0.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Like [`Self::text`] but treats blank strings as absent.
    pub fn non_empty_text(&self, key: &str) -> Option<String> {
        self.text(key).filter(|text| !text.trim().is_empty())
    }

    pub fn text_or_default(&self, key: &str) -> String {
        self.text(key).unwrap_or_default()
    }

    /// Voltage with the display policy's null-as-zero rule applied.
    pub fn voltage_kv(&self) -> f64 {
        self.number("voltage_kv").unwrap_or(0.0)
    }

    pub fn substation(&self) -> SubstationProperties {
        SubstationProperties {
            id: self.text_or_default("id"),
            name: self.text_or_default("name"),
            voltage_kv: self.voltage_kv(),
            country: self.non_empty_text("country"),
            operator: self.non_empty_text("operator"),
        }
    }

    pub fn line(&self) -> TransmissionLineProperties {
        TransmissionLineProperties {
            id: self.text_or_default("id"),
            name: self.non_empty_text("name"),
            voltage_kv: self.voltage_kv(),
            capacity_mw: self.number("capacity_mw"),
            country: self.non_empty_text("country"),
            length_km: self.number("length_km"),
        }
    }
}

impl From<Map<String, Value>> for FeatureProperties {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
