//! Built-in validator capabilities backing the element kinds.
//!
//! Every validator lets null through untouched; deciding whether a missing
//! value is acceptable is the element's job (`required`, `if_empty`).

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde_json::{Value, json};

use crate::error::{ConfigError, ValueInvalid};
use crate::processor::Validator;
use crate::vtype::TypeTag;

static EMAIL_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9!#$%&'*+\-/=?^_`{|}~.]+$").expect("email user pattern")
});
static EMAIL_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z0-9][a-z0-9\-]{0,62}\.)+[a-z]{2,}$").expect("email domain pattern")
});
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[a-z][a-z0-9+.\-]*://(?:[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?)*\.[a-z]{2,}|localhost|\d{1,3}(?:\.\d{1,3}){3})(?::\d+)?(?:[/?#]\S*)?$",
    )
    .expect("url pattern")
});
static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("url scheme pattern"));
static DATE_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2})[/\-](\d{1,2})[/\-](\d{4}|\d{2})\s*$").expect("date pattern")
});
static DATE_NO_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2})[/\-](\d{4}|\d{2})\s*$").expect("month pattern")
});
static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(am|pm|a\.m\.|p\.m\.)?\s*$")
        .expect("time pattern")
});

/// Accepts integers and integer strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Int;

impl Validator for Int {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        if value.is_null() {
            return Ok(value);
        }
        if let Value::Number(number) = &value
            && !number.is_i64()
            && !number.is_u64()
        {
            return Err(ValueInvalid::new("Please enter an integer value"));
        }
        TypeTag::Int
            .convert(value)
            .map_err(|err| ValueInvalid::new(err.message))
    }
}

/// Accepts any number or numeric string, producing a float.
#[derive(Debug, Clone, Copy, Default)]
pub struct Number;

impl Validator for Number {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        if value.is_null() {
            return Ok(value);
        }
        TypeTag::Num
            .convert(value)
            .map_err(|err| ValueInvalid::new(err.message))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl Validator for MaxLength {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        match length_of(&value) {
            Some(len) if len > self.0 => Err(ValueInvalid::new(format!(
                "Enter a value less than {} characters long",
                self.0
            ))),
            _ => Ok(value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl Validator for MinLength {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        match length_of(&value) {
            Some(len) if len < self.0 => Err(ValueInvalid::new(format!(
                "Enter a value at least {} characters long",
                self.0
            ))),
            _ => Ok(value),
        }
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Syntactic email check. Domains are never resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Validator for Email {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        let Some(text) = value.as_str() else {
            return Ok(value);
        };
        let text = text.trim();
        let parts: Vec<&str> = text.split('@').collect();
        let [user, domain] = parts.as_slice() else {
            return Err(ValueInvalid::new(
                "An email address must contain a single @",
            ));
        };
        if !EMAIL_USER.is_match(user) {
            return Err(ValueInvalid::new(format!(
                "The username portion of the email address is invalid (the portion before the @: {user})"
            )));
        }
        if !EMAIL_DOMAIN.is_match(domain) {
            return Err(ValueInvalid::new(format!(
                "The domain portion of the email address is invalid (the portion after the @: {domain})"
            )));
        }
        Ok(Value::String(text.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Url {
    /// Prepend `http://` when no scheme was given.
    pub add_http: bool,
}

impl Validator for Url {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        let Some(text) = value.as_str() else {
            return Ok(value);
        };
        let mut url = text.trim().to_string();
        if !URL_SCHEME.is_match(&url) {
            if !self.add_http {
                return Err(ValueInvalid::new(
                    "You must start your URL with http://, https://, etc",
                ));
            }
            url.insert_str(0, "http://");
        }
        if !URL.is_match(&url) {
            return Err(ValueInvalid::new("That is not a valid URL"));
        }
        Ok(Value::String(url))
    }
}

/// Requires string values to match a regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|err| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })
    }
}

impl Validator for Pattern {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        if let Some(text) = value.as_str()
            && !self.regex.is_match(text)
        {
            return Err(ValueInvalid::new("The input is not valid"));
        }
        Ok(value)
    }
}

/// Restricts values to a fixed set of choices. Strings match a choice whose
/// textual form is equal, so `"2"` selects the choice `2`.
#[derive(Debug, Clone, Default)]
pub struct OneOf {
    pub choices: Vec<Value>,
}

impl OneOf {
    pub fn new(choices: Vec<Value>) -> Self {
        Self { choices }
    }
}

impl Validator for OneOf {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        if value.is_null() {
            return Ok(value);
        }
        let matched = self.choices.iter().find(|choice| {
            **choice == value
                || value
                    .as_str()
                    .is_some_and(|text| text == choice_text(choice))
        });
        match matched {
            Some(choice) => Ok(choice.clone()),
            None => {
                let items = self
                    .choices
                    .iter()
                    .map(choice_text)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(ValueInvalid::new(format!("Value must be one of: {items}")))
            }
        }
    }
}

fn choice_text(choice: &Value) -> String {
    match choice {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthStyle {
    #[default]
    MonthFirst,
    DayFirst,
}

impl MonthStyle {
    pub fn parse(style: &str) -> Option<Self> {
        match style.to_ascii_lowercase().as_str() {
            "mm/dd/yyyy" | "us" | "american" => Some(MonthStyle::MonthFirst),
            "dd/mm/yyyy" | "euro" | "european" => Some(MonthStyle::DayFirst),
            _ => None,
        }
    }

    fn format_hint(&self, accept_day: bool) -> &'static str {
        match (self, accept_day) {
            (_, false) => "mm/yyyy",
            (MonthStyle::MonthFirst, true) => "mm/dd/yyyy",
            (MonthStyle::DayFirst, true) => "dd/mm/yyyy",
        }
    }
}

/// Parses calendar dates, producing an ISO `yyyy-mm-dd` string.
#[derive(Debug, Clone, Copy)]
pub struct DateConverter {
    pub month_style: MonthStyle,
    pub accept_day: bool,
}

impl Default for DateConverter {
    fn default() -> Self {
        Self {
            month_style: MonthStyle::MonthFirst,
            accept_day: true,
        }
    }
}

impl DateConverter {
    fn parse(&self, text: &str) -> Result<NaiveDate, ValueInvalid> {
        let bad_format = || {
            ValueInvalid::new(format!(
                "Please enter the date in the form {}",
                self.month_style.format_hint(self.accept_day)
            ))
        };

        let (month, day, year) = if self.accept_day {
            let caps = DATE_DAY.captures(text).ok_or_else(bad_format)?;
            let first: u32 = caps[1].parse().map_err(|_| bad_format())?;
            let second: u32 = caps[2].parse().map_err(|_| bad_format())?;
            let (month, day) = match self.month_style {
                MonthStyle::MonthFirst => (first, second),
                MonthStyle::DayFirst => (second, first),
            };
            (month, day, caps[3].to_string())
        } else {
            let caps = DATE_NO_DAY.captures(text).ok_or_else(bad_format)?;
            let month: u32 = caps[1].parse().map_err(|_| bad_format())?;
            (month, 1, caps[2].to_string())
        };

        let year = expand_year(&year).ok_or_else(bad_format)?;
        if !(1..=12).contains(&month) {
            return Err(ValueInvalid::new("Please enter a month from 1 to 12"));
        }
        if day == 0 {
            return Err(ValueInvalid::new(format!(
                "Please enter a day from 1 to {}",
                days_in_month(year, month)
            )));
        }
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ValueInvalid::new(format!(
                "That month only has {} days",
                days_in_month(year, month)
            ))
        })
    }
}

fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    Some(match (text.len(), year) {
        (2, y) if y < 70 => 2000 + y,
        (2, y) => 1900 + y,
        (_, y) => y,
    })
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

impl Validator for DateConverter {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        if value.is_null() {
            return Ok(value);
        }
        match value.as_str() {
            Some(text) => self
                .parse(text)
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string())),
            None => Err(ValueInvalid::new(format!(
                "Please enter the date in the form {}",
                self.month_style.format_hint(self.accept_day)
            ))),
        }
    }
}

/// Parses wall clock times into `[hour, minute]` or `[hour, minute, second]`.
#[derive(Debug, Clone, Copy)]
pub struct TimeConverter {
    pub use_ampm: bool,
    pub use_seconds: bool,
}

impl Default for TimeConverter {
    fn default() -> Self {
        Self {
            use_ampm: false,
            use_seconds: true,
        }
    }
}

impl TimeConverter {
    fn parse(&self, text: &str) -> Result<Value, ValueInvalid> {
        let caps = TIME.captures(text).ok_or_else(|| {
            ValueInvalid::new("You must indicate minutes using a colon (for example, 13:30)")
        })?;
        let mut hour: u32 = caps[1]
            .parse()
            .map_err(|_| ValueInvalid::new("Please enter a valid hour"))?;
        let minute: u32 = caps[2]
            .parse()
            .map_err(|_| ValueInvalid::new("Please enter a valid minute"))?;
        let second = caps
            .get(3)
            .map(|m| m.as_str().parse::<u32>())
            .transpose()
            .map_err(|_| ValueInvalid::new("Please enter a valid second"))?;

        if let Some(suffix) = caps.get(4) {
            if !self.use_ampm {
                return Err(ValueInvalid::new(
                    "Please enter a 24-hour time (no am or pm)",
                ));
            }
            if !(1..=12).contains(&hour) {
                return Err(ValueInvalid::new("You must enter an hour in the range 1-12"));
            }
            let pm = suffix.as_str().to_ascii_lowercase().starts_with('p');
            hour = match (pm, hour) {
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, 12) => 0,
                (false, h) => h,
            };
        } else if hour > 23 {
            return Err(ValueInvalid::new("You must enter an hour in the range 0-23"));
        }
        if minute > 59 {
            return Err(ValueInvalid::new("You must enter a minute in the range 0-59"));
        }
        match second {
            Some(_) if !self.use_seconds => {
                Err(ValueInvalid::new("You may not enter seconds"))
            }
            Some(second) if second > 59 => Err(ValueInvalid::new(
                "You must enter a second in the range 0-59",
            )),
            Some(second) => Ok(json!([hour, minute, second])),
            None => Ok(json!([hour, minute])),
        }
    }
}

impl Validator for TimeConverter {
    fn process(&self, value: Value) -> Result<Value, ValueInvalid> {
        if value.is_null() {
            return Ok(value);
        }
        match value.as_str() {
            Some(text) => self.parse(text),
            None => Err(ValueInvalid::new(
                "You must indicate minutes using a colon (for example, 13:30)",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_rejects_words_and_fractions() {
        assert_eq!(Int.process(json!("5")).unwrap(), json!(5));
        assert_eq!(Int.process(json!(5)).unwrap(), json!(5));
        assert_eq!(
            Int.process(json!(u64::MAX)).unwrap_err().message,
            "Please enter an integer value"
        );
        assert_eq!(
            Int.process(json!("test")).unwrap_err().message,
            "Please enter an integer value"
        );
        assert!(Int.process(json!(1.5)).is_err());
    }

    #[test]
    fn max_length_counts_characters() {
        assert!(MaxLength(1).process(json!("1")).is_ok());
        assert_eq!(
            MaxLength(1).process(json!("12")).unwrap_err().message,
            "Enter a value less than 1 characters long"
        );
        assert!(MinLength(2).process(json!("1")).is_err());
    }

    #[test]
    fn email_requires_single_at_and_dotted_domain() {
        assert_eq!(
            Email.process(json!("bob@example.com")).unwrap(),
            json!("bob@example.com")
        );
        assert_eq!(
            Email.process(json!("bob")).unwrap_err().message,
            "An email address must contain a single @"
        );
        assert!(Email.process(json!("bob@localhost")).is_err());
    }

    #[test]
    fn url_adds_scheme_when_asked() {
        let url = Url { add_http: true };
        assert_eq!(url.process(json!("foo.com")).unwrap(), json!("http://foo.com"));
        assert!(url.process(json!("foo")).is_err());
        assert!(Url::default().process(json!("foo.com")).is_err());
        assert!(Url::default().process(json!("https://example.org/a?b=c")).is_ok());
    }

    #[test]
    fn dates_follow_month_style() {
        let us = DateConverter::default();
        assert_eq!(us.process(json!("1/5/09")).unwrap(), json!("2009-01-05"));
        assert_eq!(
            us.process(json!("2-30-04")).unwrap_err().message,
            "That month only has 29 days"
        );
        assert_eq!(
            us.process(json!("1/0/09")).unwrap_err().message,
            "Please enter a day from 1 to 31"
        );

        let euro = DateConverter {
            month_style: MonthStyle::DayFirst,
            ..DateConverter::default()
        };
        assert_eq!(euro.process(json!("1/5/09")).unwrap(), json!("2009-05-01"));

        let no_day = DateConverter {
            accept_day: false,
            ..DateConverter::default()
        };
        assert_eq!(no_day.process(json!("5/09")).unwrap(), json!("2009-05-01"));
        assert!(no_day.process(json!("5/1/09")).is_err());
    }

    #[test]
    fn times_support_ampm() {
        assert_eq!(
            TimeConverter::default().process(json!("20:30")).unwrap(),
            json!([20, 30])
        );
        let ampm = TimeConverter {
            use_ampm: true,
            use_seconds: false,
        };
        assert_eq!(ampm.process(json!("8:30pm")).unwrap(), json!([20, 30]));
        assert!(ampm.process(json!("8:30:10")).is_err());
        assert!(TimeConverter::default().process(json!("25:00")).is_err());
    }

    #[test]
    fn one_of_matches_textual_choices() {
        let select = OneOf::new(vec![json!(1), json!("b")]);
        assert_eq!(select.process(json!("1")).unwrap(), json!(1));
        assert_eq!(select.process(json!("b")).unwrap(), json!("b"));
        assert_eq!(
            select.process(json!("c")).unwrap_err().message,
            "Value must be one of: 1; b"
        );
    }
}
