//! Text fields that also accept numbers and booleans.
//!
//! YAML sources often leave scalars unquoted (`version: 1.0`, `title: 2024`).
//! These fields keep the scalar text instead of rejecting the document.

use serde::de::{Deserialize, Deserializer, Error, Unexpected};
use serde_json::Value;

const EXPECTED: &str = "a string, number or boolean";

fn scalar_text<E: Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Err(E::invalid_type(Unexpected::Unit, &EXPECTED)),
        Value::Array(_) => Err(E::invalid_type(Unexpected::Seq, &EXPECTED)),
        Value::Object(_) => Err(E::invalid_type(Unexpected::Map, &EXPECTED)),
    }
}

pub(super) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Value::deserialize(deserializer)?)
}

pub(super) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(value).map(Some),
    }
}
