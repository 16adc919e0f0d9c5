use std::rc::Rc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::{ElementKind, ElementOptions};
use crate::error::ConfigError;
use crate::form::Form;
use crate::processor::Validator;
use crate::validators::{Email, Int, MaxLength, MinLength, MonthStyle, Number, OneOf, Pattern, Url};

/// Top-level JSON form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementDef>,
}

/// One element of a [`FormDef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ElementDef {
    pub kind: ElementKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Should be one of the vtype names; other JSON types are reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vtype: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaultval: Option<Value>,
    /// Pre-seeded submission, as if the owning form had already submitted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submittedval: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_missing: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_empty: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_invalid: Option<Value>,
    #[serde(default = "default_true")]
    pub strip: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxlength: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
    #[serde(default)]
    pub default_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_style: Option<String>,
    #[serde(default = "default_true")]
    pub accept_day: bool,
    #[serde(default)]
    pub use_ampm: bool,
    #[serde(default = "default_true")]
    pub use_seconds: bool,
    #[serde(default)]
    pub add_http: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processors: Vec<ProcessorDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub handlers: Vec<HandlerDef>,
}

fn default_true() -> bool {
    true
}

/// A built-in validator with an optional message override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessorDef {
    #[serde(flatten)]
    pub check: Check,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    Int,
    Number,
    MaxLength { length: usize },
    MinLength { length: usize },
    Email,
    Url {
        #[serde(default)]
        add_http: bool,
    },
    Pattern { pattern: String },
    OneOf { choices: Vec<Value> },
}

impl Check {
    fn build(&self) -> Result<Rc<dyn Validator>, ConfigError> {
        let validator: Rc<dyn Validator> = match self {
            Check::Int => Rc::new(Int),
            Check::Number => Rc::new(Number),
            Check::MaxLength { length } => Rc::new(MaxLength(*length)),
            Check::MinLength { length } => Rc::new(MinLength(*length)),
            Check::Email => Rc::new(Email),
            Check::Url { add_http } => Rc::new(Url {
                add_http: *add_http,
            }),
            Check::Pattern { pattern } => Rc::new(Pattern::new(pattern)?),
            Check::OneOf { choices } => Rc::new(OneOf::new(choices.clone())),
        };
        Ok(validator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HandlerDef {
    #[serde(rename = "match")]
    pub pattern: String,
    pub message: String,
}

impl ElementDef {
    fn options(&self) -> Result<ElementOptions, ConfigError> {
        let month_style = match &self.month_style {
            Some(style) => MonthStyle::parse(style)
                .ok_or_else(|| ConfigError::InvalidMonthStyle(style.clone()))?,
            None => MonthStyle::default(),
        };
        Ok(ElementOptions {
            vtype: self.vtype.clone(),
            defaultval: self.defaultval.clone(),
            submittedval: self.submittedval.clone(),
            if_missing: self.if_missing.clone(),
            if_empty: self.if_empty.clone(),
            if_invalid: self.if_invalid.clone(),
            strip: self.strip,
            required: self.required,
            maxlength: self.maxlength,
            choices: self.choices.clone(),
            default_ok: self.default_ok,
            checked: self.checked.clone(),
            month_style,
            accept_day: self.accept_day,
            use_ampm: self.use_ampm,
            use_seconds: self.use_seconds,
            add_http: self.add_http,
        })
    }
}

impl Form {
    /// Builds a form from its JSON definition. Labels default to the
    /// element name.
    pub fn from_def(def: &FormDef) -> Result<Self, ConfigError> {
        let mut form = Form::new(def.name.clone());
        for element_def in &def.elements {
            let label = element_def.label.as_deref().unwrap_or(&element_def.name);
            let options = element_def.options()?;
            let processors = element_def
                .processors
                .iter()
                .map(|processor| Ok((processor.check.build()?, processor.message.clone())))
                .collect::<Result<Vec<_>, ConfigError>>()?;

            let element = form.add_element(element_def.kind, &element_def.name, label, options)?;
            for (validator, message) in processors {
                element.add_processor(validator, message.as_deref());
            }
            for handler in &element_def.handlers {
                element.add_handler(handler.pattern.clone(), handler.message.clone());
            }
            for note in &element_def.notes {
                element.add_note(note.clone());
            }
        }
        Ok(form)
    }
}

/// JSON schema describing [`FormDef`] documents.
pub fn definition_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(FormDef)).unwrap_or(Value::Null)
}
