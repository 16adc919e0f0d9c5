use serde_json::{Map, Value, json};

use crate::element::ElementKind;
use crate::form::Form;

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Nothing has been submitted yet.
    Unsubmitted,
    /// Every element resolved to a valid value.
    Valid,
    /// At least one element failed validation.
    Invalid,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::Unsubmitted => "unsubmitted",
            RenderStatus::Valid => "valid",
            RenderStatus::Invalid => "invalid",
        }
    }
}

/// Describes a single element for render outputs.
#[derive(Debug, Clone)]
pub struct RenderElement {
    pub id: String,
    pub name: String,
    pub label: String,
    pub kind: ElementKind,
    pub required: bool,
    pub submitted: bool,
    pub display_value: Option<Value>,
    pub value: Option<Value>,
    pub valid: bool,
    pub errors: Vec<String>,
    pub notes: Vec<String>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_name: String,
    pub status: RenderStatus,
    pub elements: Vec<RenderElement>,
}

impl RenderPayload {
    pub fn error_count(&self) -> usize {
        self.elements.iter().map(|element| element.errors.len()).sum()
    }
}

/// Resolves every element of the form and captures what a renderer needs.
pub fn build_render_payload(form: &mut Form) -> RenderPayload {
    let form_name = form.name().to_string();
    let elements = form
        .elements_mut()
        .map(|element| {
            let valid = element.is_valid();
            RenderElement {
                id: format!("{}-{}", form_name, element.name()),
                name: element.name().to_string(),
                label: element.label().to_string(),
                kind: element.kind(),
                required: element.required(),
                submitted: element.is_submitted(),
                display_value: element.display_value(),
                value: element.value().ok(),
                valid,
                errors: element.errors().to_vec(),
                notes: element.notes().to_vec(),
            }
        })
        .collect::<Vec<_>>();

    let status = if !elements.iter().any(|element| element.submitted) {
        RenderStatus::Unsubmitted
    } else if elements.iter().all(|element| element.valid) {
        RenderStatus::Valid
    } else {
        RenderStatus::Invalid
    };

    RenderPayload {
        form_name,
        status,
        elements,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json(payload: &RenderPayload) -> Value {
    let elements = payload
        .elements
        .iter()
        .map(|element| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(element.id.clone()));
            map.insert("name".into(), Value::String(element.name.clone()));
            map.insert("label".into(), Value::String(element.label.clone()));
            map.insert("kind".into(), Value::String(element.kind.as_str().into()));
            map.insert("required".into(), Value::Bool(element.required));
            map.insert("submitted".into(), Value::Bool(element.submitted));
            if let Some(display) = &element.display_value {
                map.insert("display_value".into(), display.clone());
            }
            map.insert(
                "value".into(),
                element.value.clone().unwrap_or(Value::Null),
            );
            map.insert("valid".into(), Value::Bool(element.valid));
            map.insert("errors".into(), json!(element.errors));
            if !element.notes.is_empty() {
                map.insert("notes".into(), json!(element.notes));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form": payload.form_name,
        "status": payload.status.as_str(),
        "error_count": payload.error_count(),
        "elements": elements,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {}", payload.form_name));
    lines.push(format!("Status: {}", payload.status.as_str()));

    for element in &payload.elements {
        let mut entry = format!(" - {} ({})", element.name, element.label);
        if element.required {
            entry.push_str(" [required]");
        }
        match &element.value {
            Some(value) if element.valid => {
                entry.push_str(&format!(" = {}", value_to_display(value)));
            }
            Some(value) => {
                entry.push_str(&format!(" = {} (fallback)", value_to_display(value)));
            }
            None => entry.push_str(" invalid"),
        }
        lines.push(entry);
        for error in &element.errors {
            lines.push(format!("     error: {}", error));
        }
        for note in &element.notes {
            lines.push(format!("     note: {}", note));
        }
    }

    lines.join("\n")
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::Null => "(none)".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementOptions;

    #[test]
    fn unsubmitted_forms_report_unsubmitted() {
        let mut form = Form::new("f");
        form.add_text("username", "User Name", ElementOptions::default())
            .unwrap();
        let payload = build_render_payload(&mut form);
        assert_eq!(payload.status, RenderStatus::Unsubmitted);
        assert_eq!(payload.elements[0].id, "f-username");
    }

    #[test]
    fn text_lists_errors_under_elements() {
        let mut form = Form::new("f");
        form.add_text("username", "User Name", ElementOptions::new().required(true))
            .unwrap();
        let payload = build_render_payload(&mut form);
        let text = render_text(&payload);
        assert!(text.contains(" - username (User Name) [required] invalid"));
        assert!(text.contains("error: \"User Name\" is required"));
    }
}
