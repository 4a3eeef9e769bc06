//! Lenient numeric field for request bodies

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, Unexpected, Visitor};
use serde_json::Number;

/// A number sent either as a JSON number or as a numeric string.
///
/// Form bodies carry every value as text, so `age=30.5` must parse the same as
/// `{"age": 30.5}`. Anything that is not a finite number is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberField(pub Number);

impl NumberField {
    pub fn into_inner(self) -> Number {
        self.0
    }
}

struct NumberFieldVisitor;

impl<'de> Visitor<'de> for NumberFieldVisitor {
    type Value = NumberField;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(NumberField(Number::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(NumberField(Number::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Number::from_f64(v)
            .map(NumberField)
            .ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        serde_json::from_str::<Number>(v.trim())
            .map(NumberField)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for NumberField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NumberFieldVisitor)
    }
}
