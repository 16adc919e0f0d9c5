use std::error::Error;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, ElementInvalid};
use crate::handler::{Handler, find_match};
use crate::processor::{Step, Validator, run_pipeline};
use crate::submission::{Submission, is_empty};
use crate::validators::{
    DateConverter, Email, MaxLength, MonthStyle, OneOf, TimeConverter, Url,
};
use crate::vtype::{TypeTag, truthy};

/// The kinds of field an element can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Button,
    Cancel,
    Checkbox,
    Date,
    Email,
    Hidden,
    Image,
    Password,
    Reset,
    Select,
    Submit,
    Text,
    Textarea,
    Time,
    Url,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Button => "button",
            ElementKind::Cancel => "cancel",
            ElementKind::Checkbox => "checkbox",
            ElementKind::Date => "date",
            ElementKind::Email => "email",
            ElementKind::Hidden => "hidden",
            ElementKind::Image => "image",
            ElementKind::Password => "password",
            ElementKind::Reset => "reset",
            ElementKind::Select => "select",
            ElementKind::Submit => "submit",
            ElementKind::Text => "text",
            ElementKind::Textarea => "textarea",
            ElementKind::Time => "time",
            ElementKind::Url => "url",
        }
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(kind.to_string()))
            .map_err(|_| format!("unknown element kind \"{kind}\""))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction options accepted by every element kind. Options that only
/// make sense for one kind are ignored by the others.
#[derive(Debug, Clone)]
pub struct ElementOptions {
    /// Loosely typed so that non-string configuration can be reported.
    pub vtype: Option<Value>,
    pub defaultval: Option<Value>,
    pub submittedval: Option<Value>,
    pub if_missing: Option<Value>,
    pub if_empty: Option<Value>,
    pub if_invalid: Option<Value>,
    pub strip: bool,
    pub required: bool,
    pub maxlength: Option<usize>,
    pub choices: Vec<Value>,
    pub default_ok: bool,
    pub checked: Option<Value>,
    pub month_style: MonthStyle,
    pub accept_day: bool,
    pub use_ampm: bool,
    pub use_seconds: bool,
    pub add_http: bool,
}

impl Default for ElementOptions {
    fn default() -> Self {
        Self {
            vtype: None,
            defaultval: None,
            submittedval: None,
            if_missing: None,
            if_empty: None,
            if_invalid: None,
            strip: true,
            required: false,
            maxlength: None,
            choices: Vec::new(),
            default_ok: false,
            checked: None,
            month_style: MonthStyle::MonthFirst,
            accept_day: true,
            use_ampm: false,
            use_seconds: true,
            add_http: false,
        }
    }
}

impl ElementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vtype(mut self, vtype: impl Into<Value>) -> Self {
        self.vtype = Some(vtype.into());
        self
    }

    pub fn defaultval(mut self, value: impl Into<Value>) -> Self {
        self.defaultval = Some(value.into());
        self
    }

    pub fn submittedval(mut self, value: impl Into<Value>) -> Self {
        self.submittedval = Some(value.into());
        self
    }

    pub fn if_missing(mut self, value: impl Into<Value>) -> Self {
        self.if_missing = Some(value.into());
        self
    }

    pub fn if_empty(mut self, value: impl Into<Value>) -> Self {
        self.if_empty = Some(value.into());
        self
    }

    pub fn if_invalid(mut self, value: impl Into<Value>) -> Self {
        self.if_invalid = Some(value.into());
        self
    }

    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn maxlength(mut self, maxlength: usize) -> Self {
        self.maxlength = Some(maxlength);
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_ok(mut self, default_ok: bool) -> Self {
        self.default_ok = default_ok;
        self
    }

    pub fn checked(mut self, checked: impl Into<Value>) -> Self {
        self.checked = Some(checked.into());
        self
    }

    pub fn month_style(mut self, style: MonthStyle) -> Self {
        self.month_style = style;
        self
    }

    pub fn accept_day(mut self, accept_day: bool) -> Self {
        self.accept_day = accept_day;
        self
    }

    pub fn use_ampm(mut self, use_ampm: bool) -> Self {
        self.use_ampm = use_ampm;
        self
    }

    pub fn use_seconds(mut self, use_seconds: bool) -> Self {
        self.use_seconds = use_seconds;
        self
    }

    pub fn add_http(mut self, add_http: bool) -> Self {
        self.add_http = add_http;
        self
    }
}

/// Memoized outcome of the resolution pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Resolution {
    #[default]
    Unresolved,
    Valid(Value),
    Invalid,
}

/// A single form field and its value resolution state.
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    name: String,
    label: String,
    vtype: Option<TypeTag>,
    defaultval: Option<Value>,
    submitted: Submission,
    if_missing: Option<Value>,
    if_empty: Option<Value>,
    if_invalid: Option<Value>,
    strip: bool,
    required: bool,
    default_ok: bool,
    checked: Option<Value>,
    processors: Vec<Step>,
    handlers: Vec<Handler>,
    notes: Vec<String>,
    errors: Vec<String>,
    resolution: Resolution,
}

impl Element {
    pub fn new(
        kind: ElementKind,
        name: impl Into<String>,
        label: impl Into<String>,
        options: ElementOptions,
    ) -> Result<Self, ConfigError> {
        let vtype = options
            .vtype
            .as_ref()
            .map(TypeTag::from_config)
            .transpose()?;

        let mut element = Self {
            kind,
            name: name.into(),
            label: label.into(),
            vtype,
            defaultval: options.defaultval,
            submitted: Submission::NotGiven,
            if_missing: options.if_missing,
            if_empty: options.if_empty,
            if_invalid: options.if_invalid,
            strip: options.strip,
            required: options.required,
            default_ok: options.default_ok,
            checked: options.checked,
            processors: Vec::new(),
            handlers: Vec::new(),
            notes: Vec::new(),
            errors: Vec::new(),
            resolution: Resolution::Unresolved,
        };

        match kind {
            ElementKind::Text | ElementKind::Password | ElementKind::Textarea => {
                if let Some(maxlength) = options.maxlength {
                    element.add_processor(Rc::new(MaxLength(maxlength)), None);
                }
            }
            ElementKind::Email => {
                element.add_processor(Rc::new(Email), None);
            }
            ElementKind::Url => {
                element.add_processor(
                    Rc::new(Url {
                        add_http: options.add_http,
                    }),
                    None,
                );
            }
            ElementKind::Date => {
                element.add_processor(
                    Rc::new(DateConverter {
                        month_style: options.month_style,
                        accept_day: options.accept_day,
                    }),
                    None,
                );
            }
            ElementKind::Time => {
                element.add_processor(
                    Rc::new(TimeConverter {
                        use_ampm: options.use_ampm,
                        use_seconds: options.use_seconds,
                    }),
                    None,
                );
            }
            ElementKind::Select if !options.choices.is_empty() => {
                element.add_processor(Rc::new(OneOf::new(options.choices)), None);
            }
            _ => {}
        }

        if let Some(submitted) = options.submittedval {
            element.set_submitted(submitted);
        }

        Ok(element)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vtype(&self) -> Option<TypeTag> {
        self.vtype
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn defaultval(&self) -> Option<&Value> {
        self.defaultval.as_ref()
    }

    /// Display only; never feeds into [`Element::value`].
    pub fn set_defaultval(&mut self, value: Value) {
        self.defaultval = Some(value);
    }

    pub fn submission(&self) -> &Submission {
        &self.submitted
    }

    /// Records a submission. Always discards the memoized resolution and the
    /// errors gathered for the previous submission, even if the value is
    /// unchanged.
    pub fn set_submitted(&mut self, value: Value) {
        self.submitted = Submission::from_value(value);
        self.invalidate();
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted.is_given()
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Appends a validator to the chain. When `message` is given it replaces
    /// whatever text the validator fails with.
    pub fn add_processor(&mut self, validator: Rc<dyn Validator>, message: Option<&str>) {
        self.processors.push(Step::Validate {
            validator,
            message: message.map(str::to_string),
        });
    }

    pub fn add_handler(&mut self, pattern: impl Into<String>, message: impl Into<String>) {
        self.handlers.push(Handler::any(pattern, message));
    }

    /// Like [`Element::add_handler`], restricted to errors of type `E`.
    pub fn add_handler_for<E: Error + 'static>(
        &mut self,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.handlers.push(Handler::of_type::<E>(pattern, message));
    }

    /// Turns an application error into an element error message using the
    /// registered handlers. Returns whether any handler matched.
    pub fn handle_exception(&mut self, err: &(dyn Error + 'static)) -> bool {
        match find_match(&self.handlers, err) {
            Some(handler) => {
                debug!(element = %self.name, pattern = %handler.pattern, "handler matched");
                self.errors.push(handler.message.clone());
                true
            }
            None => false,
        }
    }

    pub fn is_valid(&mut self) -> bool {
        matches!(self.resolve(), Resolution::Valid(_))
    }

    /// The fully processed value. Falls back to `if_invalid` when the
    /// element failed validation.
    pub fn value(&mut self) -> Result<Value, ElementInvalid> {
        if let Resolution::Valid(value) = self.resolve() {
            return Ok(value.clone());
        }
        match &self.if_invalid {
            Some(fallback) => Ok(fallback.clone()),
            None => Err(ElementInvalid {
                label: self.label.clone(),
                errors: self.errors.clone(),
            }),
        }
    }

    /// Value a renderer should show: the raw submission once submitted,
    /// otherwise the default. Passwords only echo with `default_ok`.
    pub fn display_value(&self) -> Option<Value> {
        if self.kind == ElementKind::Password && !self.default_ok {
            return None;
        }
        if self.kind == ElementKind::Checkbox {
            return Some(Value::Bool(self.is_checked()));
        }
        match self.submitted.raw() {
            Some(raw) => Some(raw),
            None => self.defaultval.clone(),
        }
    }

    /// Checked state for rendering a checkbox. A default value beats the
    /// `checked` option.
    pub fn is_checked(&self) -> bool {
        if let Some(raw) = self.submitted.raw() {
            return truthy(&raw);
        }
        self.defaultval
            .as_ref()
            .or(self.checked.as_ref())
            .is_some_and(truthy)
    }

    fn invalidate(&mut self) {
        if self.resolution != Resolution::Unresolved {
            debug!(element = %self.name, "submission changed, dropping resolution");
        }
        self.resolution = Resolution::Unresolved;
        self.errors.clear();
    }

    fn resolve(&mut self) -> &Resolution {
        if self.resolution == Resolution::Unresolved {
            self.resolution = match self.compute() {
                Ok(value) => {
                    debug!(element = %self.name, %value, "element resolved");
                    Resolution::Valid(value)
                }
                Err(message) => {
                    debug!(element = %self.name, %message, "element invalid");
                    self.errors.push(message);
                    Resolution::Invalid
                }
            };
        }
        &self.resolution
    }

    /// Runs the whole pipeline once, without touching any cached state.
    fn compute(&self) -> Result<Value, String> {
        let mut base = match &self.submitted {
            Submission::NotGiven => self.if_missing.clone().unwrap_or(Value::Null),
            Submission::Empty(_) => Value::Null,
            Submission::Given(value) => value.clone(),
        };

        if self.strip
            && let Value::String(text) = &base
        {
            base = Value::String(text.trim().to_string());
        }

        if is_empty(&base) {
            base = self.if_empty.clone().unwrap_or(Value::Null);
        }

        if self.required && is_empty(&base) {
            return Err(format!("\"{}\" is required", self.label));
        }

        if self.kind == ElementKind::Checkbox {
            base = Value::Bool(truthy(&base));
        }

        run_pipeline(&self.pipeline(), base)
    }

    fn pipeline(&self) -> Vec<Step> {
        self.vtype
            .map(Step::Convert)
            .into_iter()
            .chain(self.processors.iter().cloned())
            .collect()
    }
}
