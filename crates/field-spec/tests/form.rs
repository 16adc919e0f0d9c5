use serde_json::{Value, json};
use thiserror::Error;

use field_spec::{
    ConfigError, ElementOptions, Form, FormDef, RenderStatus, build_render_payload,
    render_json, render_text,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "signup_form" => include_str!("../tests/fixtures/signup_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn signup() -> Form {
    let def: FormDef = serde_json::from_str(fixture("signup_form")).expect("deserialize");
    Form::from_def(&def).expect("build form")
}

fn submit(form: &mut Form, submitted: Value) {
    form.set_submitted(submitted.as_object().expect("object"));
}

#[derive(Debug, Error)]
#[error("{0}")]
struct DatabaseError(String);

#[derive(Debug, Error)]
#[error("{0}")]
struct NetworkError(String);

#[test]
fn required_username_end_to_end() {
    let mut form = Form::new("f");
    form.add_element(
        field_spec::ElementKind::Text,
        "username",
        "User Name",
        ElementOptions::new().required(true),
    )
    .unwrap();
    let el = form.get("username").unwrap();
    assert!(!el.is_valid());
    assert_eq!(el.errors(), ["\"User Name\" is required"]);

    submit(&mut form, json!({ "username": "bar" }));
    let el = form.get("username").unwrap();
    assert_eq!(el.value().unwrap(), json!("bar"));
    assert!(el.is_valid());

    submit(&mut form, json!({ "username": "   " }));
    let el = form.get("username").unwrap();
    assert!(!el.is_valid());
    assert_eq!(el.errors(), ["\"User Name\" is required"]);
}

#[test]
fn omitted_fields_keep_their_submission() {
    let mut form = Form::new("f");
    form.add_text("a", "A", ElementOptions::default()).unwrap();
    form.add_text("b", "B", ElementOptions::default()).unwrap();

    submit(&mut form, json!({ "a": "one" }));
    assert!(form.get("a").unwrap().is_submitted());
    assert!(!form.get("b").unwrap().is_submitted());

    submit(&mut form, json!({ "b": "two" }));
    assert_eq!(form.get("a").unwrap().value().unwrap(), json!("one"));
    assert_eq!(form.get("b").unwrap().value().unwrap(), json!("two"));
}

#[test]
fn handlers_match_newest_first_on_type_and_text() {
    let mut form = Form::new("f");
    let el = form
        .add_text("field", "Field", ElementOptions::default())
        .unwrap();
    el.add_handler("text exception", "test error msg");
    assert!(el.handle_exception(&DatabaseError("text exception".into())));
    assert_eq!(el.errors(), ["test error msg"]);

    let el = form
        .add_text("second", "Field", ElementOptions::default())
        .unwrap();
    el.add_handler("not it", "");
    el.add_handler("text exception", "test error msg");
    assert!(el.handle_exception(&DatabaseError("text exception".into())));
    assert_eq!(el.errors(), ["test error msg"]);

    let el = form
        .add_text("typed", "Field", ElementOptions::default())
        .unwrap();
    el.add_handler_for::<DatabaseError>("text exception", "test error msg");
    assert!(el.handle_exception(&DatabaseError("text exception".into())));
    assert_eq!(el.errors(), ["test error msg"]);

    let el = form
        .add_text("wrong_type", "Field", ElementOptions::default())
        .unwrap();
    el.add_handler_for::<NetworkError>("text exception", "test error msg");
    assert!(!el.handle_exception(&DatabaseError("text exception".into())));
    assert!(el.errors().is_empty());

    let el = form
        .add_text("wrong_text", "Field", ElementOptions::default())
        .unwrap();
    el.add_handler_for::<DatabaseError>("text exception", "test error msg");
    assert!(!el.handle_exception(&DatabaseError("text".into())));
    assert!(el.errors().is_empty());

    let el = form
        .add_text("priority", "Field", ElementOptions::default())
        .unwrap();
    el.add_handler("exception", "older");
    el.add_handler("exception", "newer");
    assert!(el.handle_exception(&NetworkError("some exception".into())));
    assert_eq!(el.errors(), ["newer"]);
}

#[test]
fn definition_builds_a_working_form() {
    let mut form = signup();
    assert_eq!(form.name(), "signup");
    assert_eq!(form.len(), 6);
    assert_eq!(
        form.element("username").unwrap().notes(),
        ["letters and digits only"]
    );

    submit(
        &mut form,
        json!({
            "username": "bob42",
            "email": "bob@example.com",
            "age": "",
            "newsletter": "checked",
        }),
    );
    assert!(form.is_valid());
    let values = form.values().unwrap();
    assert_eq!(values["username"], json!("bob42"));
    assert_eq!(values["age"], json!(18));
    assert_eq!(values["newsletter"], json!(1));
    assert_eq!(values["plan"], json!("free"));
    assert_eq!(values["password"], Value::Null);
}

#[test]
fn definition_reports_custom_messages_and_handlers() {
    let mut form = signup();
    submit(
        &mut form,
        json!({ "username": "Bob!", "email": "bob", "plan": "gold" }),
    );
    assert!(!form.is_valid());
    let errors = form.errors();
    assert_eq!(errors["username"], vec!["letters and digits only".to_string()]);
    assert_eq!(
        errors["email"],
        vec!["An email address must contain a single @".to_string()]
    );
    assert_eq!(
        errors["plan"],
        vec!["Value must be one of: free; pro".to_string()]
    );

    submit(&mut form, json!({ "username": "bob" }));
    let el = form.get("username").unwrap();
    assert!(el.is_valid());
    assert!(el.handle_exception(&DatabaseError("duplicate key value".into())));
    assert_eq!(el.errors(), ["that user name is taken"]);
}

#[test]
fn definition_rejects_bad_vtypes() {
    let def: FormDef = serde_json::from_value(json!({
        "name": "f",
        "elements": [{ "kind": "text", "name": "f1", "vtype": "badvtype" }]
    }))
    .unwrap();
    assert_eq!(
        Form::from_def(&def).unwrap_err(),
        ConfigError::InvalidVtype("badvtype".into())
    );

    let def: FormDef = serde_json::from_value(json!({
        "name": "f",
        "elements": [{ "kind": "text", "name": "f2", "vtype": [] }]
    }))
    .unwrap();
    assert_eq!(
        Form::from_def(&def).unwrap_err().to_string(),
        "vtype should have been a string, got array instead"
    );

    let def: FormDef = serde_json::from_value(json!({
        "name": "f",
        "elements": [
            { "kind": "text", "name": "dup" },
            { "kind": "hidden", "name": "dup" }
        ]
    }))
    .unwrap();
    assert_eq!(
        Form::from_def(&def).unwrap_err(),
        ConfigError::DuplicateElement("dup".into())
    );
}

#[test]
fn render_payload_reflects_resolution() {
    let mut form = signup();
    form.set_defaults(json!({ "username": "guest", "email": "x@example.org" }).as_object().unwrap());

    let payload = build_render_payload(&mut form);
    assert_eq!(payload.status, RenderStatus::Unsubmitted);
    let ui = render_json(&payload);
    assert_eq!(ui["form"], "signup");
    let elements = ui["elements"].as_array().expect("elements array");
    assert_eq!(elements[0]["id"], "signup-username");
    assert_eq!(elements[0]["display_value"], "guest");
    assert_eq!(elements[0]["valid"], false);
    assert!(elements[5].get("display_value").is_none());

    submit(&mut form, json!({ "username": "bob", "email": "bob@example.com" }));
    let payload = build_render_payload(&mut form);
    assert_eq!(payload.status, RenderStatus::Valid);
    assert_eq!(payload.error_count(), 0);
    let text = render_text(&payload);
    assert!(text.contains("Status: valid"));
    assert!(text.contains(" - username (User Name) [required] = bob"));
}
