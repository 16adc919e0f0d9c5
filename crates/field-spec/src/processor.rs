use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::trace;

use crate::error::ValueInvalid;
use crate::vtype::TypeTag;

/// A capability that accepts a raw value and returns a converted one, or
/// rejects it with a human readable message.
pub trait Validator: fmt::Debug {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid>;
}

/// Adapts a closure to [`Validator`].
pub struct FnValidator<F> {
    name: String,
    func: F,
}

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("name", &self.name)
            .finish()
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(Value) -> Result<Value, ValueInvalid>,
{
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        (self.func)(value)
    }
}

/// Wraps a closure so it can be registered with `Element::add_processor`.
pub fn validator_fn<F>(name: impl Into<String>, func: F) -> Rc<dyn Validator>
where
    F: Fn(Value) -> Result<Value, ValueInvalid> + 'static,
{
    Rc::new(FnValidator {
        name: name.into(),
        func,
    })
}

/// A single step of the resolution pipeline.
#[derive(Debug, Clone)]
pub enum Step {
    Convert(TypeTag),
    Validate {
        validator: Rc<dyn Validator>,
        message: Option<String>,
    },
}

impl Step {
    /// Runs the step, yielding the message to record on failure.
    pub fn run(&self, value: Value) -> Result<Value, String> {
        match self {
            // null is the "nothing to convert" marker and passes through
            Step::Convert(_) if value.is_null() => Ok(value),
            Step::Convert(tag) => tag.convert(value).map_err(|err| err.message),
            Step::Validate { validator, message } => {
                validator.process(value).map_err(|err| match message {
                    Some(custom) => custom.clone(),
                    None => err.message,
                })
            }
        }
    }
}

/// Feeds `value` through every step in order, stopping at the first failure.
pub fn run_pipeline(steps: &[Step], value: Value) -> Result<Value, String> {
    steps.iter().enumerate().try_fold(value, |current, (index, step)| {
        trace!(index, ?step, "running pipeline step");
        step.run(current)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn reject(message: &'static str) -> Rc<dyn Validator> {
        validator_fn("reject", move |_| Err(ValueInvalid::new(message)))
    }

    #[test]
    fn pipeline_threads_values_in_order() {
        let steps = vec![
            Step::Convert(TypeTag::Int),
            Step::Validate {
                validator: validator_fn("double", |value: Value| {
                    Ok(json!(value.as_i64().unwrap_or_default() * 2))
                }),
                message: None,
            },
        ];
        assert_eq!(run_pipeline(&steps, json!("21")).unwrap(), json!(42));
    }

    #[test]
    fn first_failure_stops_the_chain() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let steps = vec![
            Step::Validate {
                validator: reject("native"),
                message: None,
            },
            Step::Validate {
                validator: validator_fn("count", move |value| {
                    counter.set(counter.get() + 1);
                    Ok(value)
                }),
                message: None,
            },
        ];
        assert_eq!(run_pipeline(&steps, json!("x")).unwrap_err(), "native");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn custom_message_replaces_native_text() {
        let step = Step::Validate {
            validator: reject("native"),
            message: Some("custom".into()),
        };
        assert_eq!(step.run(json!(1)).unwrap_err(), "custom");
    }

    #[test]
    fn conversion_skips_null() {
        assert_eq!(Step::Convert(TypeTag::Bool).run(Value::Null).unwrap(), Value::Null);
    }
}
