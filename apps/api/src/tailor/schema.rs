//! Output contract for the tailoring model call.
//!
//! The same shape is sent to the model as a strict JSON schema and enforced again here,
//! together with the minimum sizes the JSON schema cannot express to the provider.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::AppError;

pub const MIN_KEYWORDS: usize = 5;
pub const MIN_CHANGE_SUMMARY: usize = 3;
pub const MIN_TAILORED_LATEX_CHARS: usize = 200;

/// Validated model output, returned verbatim to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailorResult {
    pub keywords: Vec<String>,
    pub change_summary: Vec<String>,
    pub tailored_latex: String,
}

static TAILOR_RESULT_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "keywords": { "type": "array", "items": { "type": "string" } },
            "change_summary": { "type": "array", "items": { "type": "string" } },
            "tailored_latex": { "type": "string" }
        },
        "required": ["keywords", "change_summary", "tailored_latex"]
    })
});

/// JSON schema sent with the completion request.
pub fn tailor_result_schema() -> &'static Value {
    &TAILOR_RESULT_SCHEMA
}

/// Validation diagnostics, split into whole-document and per-field messages.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SchemaDiagnostics {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl SchemaDiagnostics {
    fn field(&mut self, name: &str, message: String) {
        self.field_errors
            .entry(name.to_string())
            .or_default()
            .push(message);
    }

    fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }
}

/// Parses raw model text into a `TailorResult`.
///
/// Fails closed: non-JSON yields `MalformedOutput`, any shape or size violation yields
/// `SchemaViolation`. No repair is attempted.
pub fn parse_tailor_output(raw: &str) -> Result<TailorResult, AppError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| AppError::MalformedOutput {
        raw: raw.to_string(),
    })?;

    validate_tailor_result(&value).map_err(|diagnostics| AppError::SchemaViolation {
        details: serde_json::to_value(&diagnostics).unwrap_or(Value::Null),
        raw: value.clone(),
    })
}

/// Checks a parsed JSON value against the tailoring contract.
/// Unknown keys are ignored.
pub fn validate_tailor_result(value: &Value) -> Result<TailorResult, SchemaDiagnostics> {
    let mut diagnostics = SchemaDiagnostics::default();

    let Some(object) = value.as_object() else {
        diagnostics
            .form_errors
            .push(format!("Expected object, received {}", json_type(value)));
        return Err(diagnostics);
    };

    let keywords = string_array(object, "keywords", MIN_KEYWORDS, &mut diagnostics);
    let change_summary = string_array(object, "change_summary", MIN_CHANGE_SUMMARY, &mut diagnostics);
    let tailored_latex = min_string(
        object,
        "tailored_latex",
        MIN_TAILORED_LATEX_CHARS,
        &mut diagnostics,
    );

    match (keywords, change_summary, tailored_latex) {
        (Some(keywords), Some(change_summary), Some(tailored_latex)) if diagnostics.is_empty() => {
            Ok(TailorResult {
                keywords,
                change_summary,
                tailored_latex,
            })
        }
        _ => Err(diagnostics),
    }
}

fn string_array(
    object: &Map<String, Value>,
    field: &str,
    min: usize,
    diagnostics: &mut SchemaDiagnostics,
) -> Option<Vec<String>> {
    let Some(value) = object.get(field) else {
        diagnostics.field(field, "Required".to_string());
        return None;
    };
    let Some(items) = value.as_array() else {
        diagnostics.field(field, format!("Expected array, received {}", json_type(value)));
        return None;
    };

    let mut out = Vec::with_capacity(items.len());
    let mut valid = true;
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(s) => out.push(s.to_string()),
            None => {
                diagnostics.field(
                    field,
                    format!("Expected string at index {i}, received {}", json_type(item)),
                );
                valid = false;
            }
        }
    }

    if items.len() < min {
        diagnostics.field(field, format!("Array must contain at least {min} element(s)"));
        valid = false;
    }

    valid.then_some(out)
}

pub(crate) fn min_string(
    object: &Map<String, Value>,
    field: &str,
    min_chars: usize,
    diagnostics: &mut SchemaDiagnostics,
) -> Option<String> {
    let Some(value) = object.get(field) else {
        diagnostics.field(field, "Required".to_string());
        return None;
    };
    let Some(s) = value.as_str() else {
        diagnostics.field(field, format!("Expected string, received {}", json_type(value)));
        return None;
    };
    if s.chars().count() < min_chars {
        diagnostics.field(
            field,
            format!("String must contain at least {min_chars} character(s)"),
        );
        return None;
    }
    Some(s.to_string())
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
