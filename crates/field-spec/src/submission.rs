use serde_json::Value;

/// What the owning request pushed into an element.
///
/// `NotGiven` means no submission happened at all, which is distinct from
/// a submission that carried nothing (`Empty`). `Empty` keeps the raw
/// value (null or `""`) for redisplay.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Submission {
    #[default]
    NotGiven,
    Empty(Value),
    Given(Value),
}

impl Submission {
    /// Classifies a raw submitted value. Null and the empty string count as
    /// an empty submission; whitespace is left for the strip step to decide.
    pub fn from_value(value: Value) -> Self {
        match value {
            value if is_empty(&value) => Submission::Empty(value),
            other => Submission::Given(other),
        }
    }

    pub fn is_given(&self) -> bool {
        !matches!(self, Submission::NotGiven)
    }

    /// Raw value as submitted, `None` when nothing was submitted.
    pub fn raw(&self) -> Option<Value> {
        match self {
            Submission::NotGiven => None,
            Submission::Empty(value) | Submission::Given(value) => Some(value.clone()),
        }
    }
}

impl From<Value> for Submission {
    fn from(value: Value) -> Self {
        Submission::from_value(value)
    }
}

/// Null or the empty string.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}
