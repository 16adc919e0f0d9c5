use std::fmt;
use std::str::FromStr;

use serde_json::{Number, Value};

use crate::error::{ConfigError, ConversionError};

const FALSE_WORDS: [&str; 7] = ["", "0", "false", "f", "no", "n", "off"];
const TRUE_WORDS: [&str; 6] = ["1", "true", "t", "yes", "y", "on"];

/// Target type a submitted value gets converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Int,
    Num,
    Str,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Num => "num",
            TypeTag::Str => "str",
        }
    }

    /// Reads a vtype out of loosely typed configuration. Anything other than
    /// a JSON string is rejected before the name is looked at.
    pub fn from_config(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(name) => name.parse(),
            other => Err(ConfigError::VtypeNotString(json_type_name(other))),
        }
    }

    pub fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        match self {
            TypeTag::Bool => Ok(Value::Bool(truthy(&value))),
            TypeTag::Int => to_int(&value).map(Value::from).ok_or_else(|| ConversionError {
                message: "Please enter an integer value".into(),
            }),
            TypeTag::Num => to_float(&value)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| ConversionError {
                    message: "Please enter a number".into(),
                }),
            TypeTag::Str => Ok(match value {
                Value::String(text) => Value::String(text),
                Value::Null => Value::Null,
                Value::Bool(flag) => Value::String(flag.to_string()),
                Value::Number(number) => Value::String(number.to_string()),
                other => Value::String(other.to_string()),
            }),
        }
    }
}

impl FromStr for TypeTag {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "bool" | "boolean" => Ok(TypeTag::Bool),
            "int" | "integer" => Ok(TypeTag::Int),
            "num" | "number" | "float" => Ok(TypeTag::Num),
            "str" | "string" | "uni" | "unicode" => Ok(TypeTag::Str),
            other => Err(ConfigError::InvalidVtype(other.to_string())),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truthiness used for boolean conversion and checkbox submissions.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => {
            let lowered = text.trim().to_ascii_lowercase();
            if FALSE_WORDS.contains(&lowered.as_str()) {
                false
            } else if TRUE_WORDS.contains(&lowered.as_str()) {
                true
            } else if let Ok(number) = lowered.parse::<f64>() {
                number != 0.0
            } else {
                true
            }
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => number.as_i64().or_else(|| {
            // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
            number
                .as_f64()
                .map(f64::trunc)
                .filter(|n| *n >= i64::MIN as f64 && *n < i64::MAX as f64)
                .map(|n| n as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
