use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::element::{Element, ElementKind, ElementOptions};
use crate::error::{ConfigError, FormError};

/// A named, ordered collection of elements that receives defaults and
/// submissions as maps keyed by element name.
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    elements: Vec<Element>,
}

impl Form {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds an element and registers it under `name`.
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        if self.position(name).is_some() {
            return Err(ConfigError::DuplicateElement(name.to_string()));
        }
        let element = Element::new(kind, name, label, options)?;
        debug!(form = %self.name, element = name, %kind, "element added");
        self.elements.push(element);
        let last = self.elements.len() - 1;
        Ok(&mut self.elements[last])
    }

    pub fn add_button(&mut self, name: &str, label: &str) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Button, name, label, ElementOptions::default())
    }

    pub fn add_cancel(&mut self, name: &str, label: &str) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Cancel, name, label, ElementOptions::default())
    }

    pub fn add_reset(&mut self, name: &str, label: &str) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Reset, name, label, ElementOptions::default())
    }

    pub fn add_submit(&mut self, name: &str, label: &str) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Submit, name, label, ElementOptions::default())
    }

    pub fn add_image(&mut self, name: &str, label: &str) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Image, name, label, ElementOptions::default())
    }

    pub fn add_text(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Text, name, label, options)
    }

    pub fn add_textarea(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Textarea, name, label, options)
    }

    pub fn add_hidden(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Hidden, name, label, options)
    }

    pub fn add_checkbox(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Checkbox, name, label, options)
    }

    pub fn add_password(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Password, name, label, options)
    }

    pub fn add_select(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Select, name, label, options)
    }

    pub fn add_email(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Email, name, label, options)
    }

    pub fn add_url(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Url, name, label, options)
    }

    pub fn add_date(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Date, name, label, options)
    }

    pub fn add_time(
        &mut self,
        name: &str,
        label: &str,
        options: ElementOptions,
    ) -> Result<&mut Element, ConfigError> {
        self.add_element(ElementKind::Time, name, label, options)
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.name() == name)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements
            .iter_mut()
            .find(|element| element.name() == name)
    }

    /// Like [`Form::element_mut`], failing with a configuration error for
    /// names that were never registered.
    pub fn get(&mut self, name: &str) -> Result<&mut Element, ConfigError> {
        self.element_mut(name)
            .ok_or_else(|| ConfigError::UnknownElement(name.to_string()))
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Assigns display defaults. Keys without a matching element are ignored.
    pub fn set_defaults(&mut self, defaults: &Map<String, Value>) {
        for (key, value) in defaults {
            if let Some(element) = self.element_mut(key) {
                element.set_defaultval(value.clone());
            }
        }
    }

    /// Pushes submitted values into the elements they name. Elements missing
    /// from the map keep whatever submission state they had.
    pub fn set_submitted(&mut self, submitted: &Map<String, Value>) {
        let mut applied = 0usize;
        for (key, value) in submitted {
            if let Some(element) = self.element_mut(key) {
                element.set_submitted(value.clone());
                applied += 1;
            }
        }
        debug!(
            form = %self.name,
            applied,
            ignored = submitted.len() - applied,
            "submission distributed"
        );
    }

    pub fn is_valid(&mut self) -> bool {
        self.elements
            .iter_mut()
            .fold(true, |valid, element| element.is_valid() && valid)
    }

    /// Resolved values of every element, keyed by name.
    pub fn values(&mut self) -> Result<Map<String, Value>, FormError> {
        let mut values = Map::new();
        for element in &mut self.elements {
            let value = element.value()?;
            values.insert(element.name().to_string(), value);
        }
        Ok(values)
    }

    /// Error messages of every element that has any.
    pub fn errors(&mut self) -> BTreeMap<String, Vec<String>> {
        self.elements
            .iter_mut()
            .filter_map(|element| {
                element.is_valid();
                (!element.errors().is_empty())
                    .then(|| (element.name().to_string(), element.errors().to_vec()))
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|element| element.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut form = Form::new("f");
        form.add_text("username", "User Name", ElementOptions::default())
            .unwrap();
        let err = form
            .add_text("username", "Again", ElementOptions::default())
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateElement("username".into()));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut form = Form::new("f");
        form.add_text("username", "User Name", ElementOptions::default())
            .unwrap();
        let map = json!({ "nope": "x", "username": "bar" });
        form.set_defaults(map.as_object().unwrap());
        form.set_submitted(map.as_object().unwrap());
        assert_eq!(form.len(), 1);
        assert_eq!(form.get("username").unwrap().value().unwrap(), json!("bar"));
        assert!(form.get("nope").is_err());
    }

    #[test]
    fn form_level_errors_collect_invalid_elements() {
        let mut form = Form::new("f");
        form.add_text("a", "A", ElementOptions::new().required(true))
            .unwrap();
        form.add_text("b", "B", ElementOptions::default()).unwrap();
        assert!(!form.is_valid());
        let errors = form.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["a"], vec!["\"A\" is required".to_string()]);
        assert!(matches!(form.values(), Err(FormError::Invalid(_))));
    }
}
