#![allow(missing_docs)]

pub mod definition;
pub mod element;
pub mod error;
pub mod form;
pub mod handler;
pub mod processor;
pub mod render;
pub mod submission;
pub mod validators;
pub mod vtype;

pub use definition::{Check, ElementDef, FormDef, HandlerDef, ProcessorDef, definition_schema};
pub use element::{Element, ElementKind, ElementOptions, Resolution};
pub use error::{ConfigError, ConversionError, ElementInvalid, FormError, ValueInvalid};
pub use form::Form;
pub use handler::Handler;
pub use processor::{Step, Validator, run_pipeline, validator_fn};
pub use render::{
    RenderElement, RenderPayload, RenderStatus, build_render_payload, render_json, render_text,
};
pub use submission::Submission;
pub use vtype::TypeTag;
