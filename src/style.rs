use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

/// Style constants for sizing and drawing, keyed by name.
///
/// Every getter is fallible: a missing or mistyped key is reported to the
/// caller and never replaced by a default.
#[derive(Debug, Clone, Default)]
pub struct Style {
    values: Map<String, Value>,
}

impl Style {
    pub fn from_json(text: &str) -> Result<Self> {
        let values: Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self { values })
    }

    /// Sets or replaces one key, returning the updated style.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.values.remove(key);
        self
    }

    fn get(&self, key: &str) -> Result<&Value> {
        self.values.get(key).ok_or_else(|| Error::MissingStyleKey {
            key: key.to_string(),
        })
    }

    pub fn integer(&self, key: &str) -> Result<i64> {
        self.get(key)?
            .as_i64()
            .ok_or_else(|| Error::InvalidStyleValue {
                key: key.to_string(),
                expected: "an integer",
            })
    }

    pub fn number(&self, key: &str) -> Result<f64> {
        self.get(key)?
            .as_f64()
            .ok_or_else(|| Error::InvalidStyleValue {
                key: key.to_string(),
                expected: "a number",
            })
    }

    pub fn font(&self, key: &str) -> Result<FontSpec> {
        FontSpec::deserialize(self.get(key)?).map_err(|_| Error::InvalidStyleValue {
            key: key.to_string(),
            expected: "a font object with `family` and `size`",
        })
    }
}
