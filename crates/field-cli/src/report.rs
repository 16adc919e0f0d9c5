use std::fmt::Write;

use clap::ValueEnum;
use field_spec::{RenderPayload, RenderStatus, render_json, render_text};
use serde_json::{Map, Value};

/// Output format for the resolution report.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
    Cbor,
}

/// Prints a resolved form in the requested format.
pub struct ReportPresenter {
    format: ReportFormat,
}

impl ReportPresenter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn show(&self, payload: &RenderPayload) -> Result<(), Box<dyn std::error::Error>> {
        match self.format {
            ReportFormat::Text => {
                println!("{}", render_text(payload));
                if payload.status == RenderStatus::Invalid {
                    eprintln!("{} error(s) found", payload.error_count());
                }
            }
            ReportFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&render_json(payload))?);
            }
            ReportFormat::Cbor => {
                let bytes = serde_cbor::to_vec(&resolved_values(payload))?;
                println!("Values (CBOR hex): {}", encode_hex(&bytes));
            }
        }
        Ok(())
    }
}

/// Resolved values keyed by element name; invalid elements map to null.
pub fn resolved_values(payload: &RenderPayload) -> Value {
    let map = payload
        .elements
        .iter()
        .map(|element| {
            (
                element.name.clone(),
                element.value.clone().unwrap_or(Value::Null),
            )
        })
        .collect::<Map<String, Value>>();
    Value::Object(map)
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
