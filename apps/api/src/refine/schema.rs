//! Output contract for refinement generations: a single `tailored_latex` string.

use std::sync::LazyLock;

use serde_json::{json, Value};

use crate::errors::AppError;
use crate::tailor::schema::{
    json_type, min_string, SchemaDiagnostics, MIN_TAILORED_LATEX_CHARS,
};

/// Name reported to the completion API for the structured-output schema.
pub const REFINE_SCHEMA_NAME: &str = "refined_resume";

const DOCUMENT_CLASS: &str = "\\documentclass";
const BEGIN_DOCUMENT: &str = "\\begin{document}";
const END_DOCUMENT: &str = "\\end{document}";

static REFINED_RESUME_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "tailored_latex": { "type": "string" }
        },
        "required": ["tailored_latex"]
    })
});

pub fn refined_resume_schema() -> &'static Value {
    &REFINED_RESUME_SCHEMA
}

/// Parses one refinement answer into LaTeX with document wrappers guaranteed.
///
/// Non-JSON is `MalformedOutput`; a missing, non-string or short `tailored_latex`
/// is `SchemaViolation`.
pub fn parse_refined_output(raw: &str) -> Result<String, AppError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| AppError::MalformedOutput {
        raw: raw.to_string(),
    })?;

    let mut diagnostics = SchemaDiagnostics::default();
    let latex = match value.as_object() {
        Some(object) => min_string(
            object,
            "tailored_latex",
            MIN_TAILORED_LATEX_CHARS,
            &mut diagnostics,
        ),
        None => {
            diagnostics
                .form_errors
                .push(format!("Expected object, received {}", json_type(&value)));
            None
        }
    };

    match latex {
        Some(latex) => Ok(ensure_document_wrappers(latex)),
        None => Err(AppError::SchemaViolation {
            details: serde_json::to_value(&diagnostics).unwrap_or(Value::Null),
            raw: value,
        }),
    }
}

/// Makes sure the source has a document body.
///
/// Text around a complete `\documentclass ... \end{document}` span is cut away;
/// anything without one is wrapped in a bare article.
pub fn ensure_document_wrappers(latex: String) -> String {
    if latex.contains(BEGIN_DOCUMENT) && latex.contains(END_DOCUMENT) {
        return latex;
    }

    match (latex.find(DOCUMENT_CLASS), latex.rfind(END_DOCUMENT)) {
        (Some(start), Some(end)) if start < end => {
            latex[start..end + END_DOCUMENT.len()].to_string()
        }
        _ => format!("{DOCUMENT_CLASS}{{article}}{BEGIN_DOCUMENT}\n{latex}\n{END_DOCUMENT}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body_len: usize) -> String {
        format!(
            "\\documentclass{{article}}\n\\begin{{document}}\n{}\n\\end{{document}}",
            "x".repeat(body_len)
        )
    }

    #[test]
    fn test_valid_output_parses() {
        let latex = document(250);
        let raw = json!({ "tailored_latex": latex }).to_string();
        assert_eq!(parse_refined_output(&raw).unwrap(), latex);
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            parse_refined_output("\\documentclass{article}"),
            Err(AppError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn test_short_or_missing_latex_is_schema_violation() {
        let short = json!({ "tailored_latex": "\\documentclass{article}" }).to_string();
        assert!(matches!(
            parse_refined_output(&short),
            Err(AppError::SchemaViolation { .. })
        ));
        match parse_refined_output("{}") {
            Err(AppError::SchemaViolation { details, .. }) => {
                assert_eq!(details["field_errors"]["tailored_latex"][0], "Required");
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_top_level_string_is_form_error() {
        match parse_refined_output(r#""just text""#) {
            Err(AppError::SchemaViolation { details, .. }) => {
                assert_eq!(details["form_errors"][0], "Expected object, received string");
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_document_is_untouched() {
        let latex = document(10);
        assert_eq!(ensure_document_wrappers(latex.clone()), latex);
    }

    #[test]
    fn test_surrounding_text_is_trimmed() {
        let latex = "Here you go:\n\\documentclass{article}\nbody\n\\end{document}\nThanks!".to_string();
        assert_eq!(
            ensure_document_wrappers(latex),
            "\\documentclass{article}\nbody\n\\end{document}"
        );
    }

    #[test]
    fn test_bare_body_is_wrapped() {
        assert_eq!(
            ensure_document_wrappers("Jane Doe".to_string()),
            "\\documentclass{article}\\begin{document}\nJane Doe\n\\end{document}"
        );
    }
}
