use thiserror::Error;

/// Invalid constructor arguments; surfaced when the element is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid vtype \"{0}\"")]
    InvalidVtype(String),
    #[error("vtype should have been a string, got {0} instead")]
    VtypeNotString(&'static str),
    #[error("element \"{0}\" is already registered")]
    DuplicateElement(String),
    #[error("element \"{0}\" does not exist")]
    UnknownElement(String),
    #[error("invalid month style \"{0}\"")]
    InvalidMonthStyle(String),
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// A processor rejected the value it was given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValueInvalid {
    pub message: String,
}

impl ValueInvalid {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The raw value could not be coerced to the element's vtype.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConversionError {
    pub message: String,
}

/// `value()` was read on an element whose last resolution failed and
/// which has no `if_invalid` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"value\" attribute accessed, but element \"{label}\" is invalid")]
pub struct ElementInvalid {
    pub label: String,
    pub errors: Vec<String>,
}

/// Returned by form level accessors that address an element by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Invalid(#[from] ElementInvalid),
}
