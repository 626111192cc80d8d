//! Ingress gate for raw JSON documents.
//!
//! The JSON Schema is derived from the typed model and checked with a Draft 7
//! validator before anything is deserialized. Nothing past this gate looks
//! at raw JSON again.
//!
//! A `null` member means the same as an absent one, so nulls are dropped
//! before checking and optional fields are described by their inner schema.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError as SchemaError};
use schemars::gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::error;

use super::{ValidationResult, ViolationKind};
use crate::models::{DeviceConfig, PairRequest};

static DEVICE_SCHEMA: OnceLock<Option<JSONSchema>> = OnceLock::new();
static PAIR_SCHEMA: OnceLock<Option<JSONSchema>> = OnceLock::new();

fn compile(name: &str, schema: RootSchema) -> Option<JSONSchema> {
    let document = match serde_json::to_value(schema) {
        Ok(document) => document,
        Err(e) => {
            error!(schema = name, "Failed to serialize schema: {}", e);
            return None;
        }
    };
    match JSONSchema::options().with_draft(Draft::Draft7).compile(&document) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            error!(schema = name, "Failed to compile schema: {}", e);
            None
        }
    }
}

fn schema_of<T: JsonSchema>() -> RootSchema {
    SchemaSettings::draft07()
        .with(|s| s.option_add_null_type = false)
        .into_generator()
        .into_root_schema_for::<T>()
}

fn without_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(without_nulls).collect()),
        other => other.clone(),
    }
}

/// Dotted path into `document`: `vlans[0].interface.ip`, or `root`.
fn dotted(segments: &[String], document: &Value) -> String {
    let mut path = String::new();
    let mut node = Some(document);
    for segment in segments {
        match node {
            Some(Value::Array(items)) => {
                path.push_str(&format!("[{}]", segment));
                node = segment.parse::<usize>().ok().and_then(|i| items.get(i));
            }
            other => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(segment);
                node = other.and_then(|v| v.get(segment.as_str()));
            }
        }
    }
    if path.is_empty() {
        "root".to_string()
    } else {
        path
    }
}

fn describe(error: &SchemaError<'_>, document: &Value) -> (String, String) {
    let mut segments = error.instance_path.clone().into_vec();
    let message = match &error.kind {
        // Reported on the object; address the missing key itself
        ValidationErrorKind::Required { property } => {
            segments.push(property.as_str().map_or_else(|| property.to_string(), str::to_string));
            "is required".to_string()
        }
        ValidationErrorKind::Pattern { .. } => format!("{} is not in the expected format", error.instance),
        ValidationErrorKind::AnyOf => format!("{} is not an accepted value", error.instance),
        _ => error.to_string(),
    };
    (dotted(&segments, document), message)
}

fn check(name: &str, schema: Option<&JSONSchema>, document: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(schema) = schema else {
        result.add(ViolationKind::Schema, "root", format!("{} schema is unavailable", name));
        return result;
    };
    let document = without_nulls(document);
    if let Err(errors) = schema.validate(&document) {
        for error in errors {
            let (path, message) = describe(&error, &document);
            result.add(ViolationKind::Schema, path, message);
        }
    }
    result
}

/// Gate a device (`StandardConfig`) document.
pub fn check_device(value: &Value) -> ValidationResult {
    let schema = DEVICE_SCHEMA.get_or_init(|| compile("device", schema_of::<DeviceConfig>()));
    check("device", schema.as_ref(), value)
}

/// Gate a pair request (`{shared, tor1, tor2, bmc}`).
pub fn check_pair(value: &Value) -> ValidationResult {
    let schema = PAIR_SCHEMA.get_or_init(|| compile("pair", schema_of::<PairRequest>()));
    check("pair", schema.as_ref(), value)
}
