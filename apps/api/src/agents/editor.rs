//! Editor — rewrites the detected summary and bullets toward the job description.

use serde::Serialize;
use serde_json::Value;

use crate::agents::prompts::{fill_template, EDITOR_PROMPT_TEMPLATE, SDG8_ALIGNMENT};
use crate::agents::schema::require_list;
use crate::agents::{call_stage, Stage};
use crate::errors::AppError;
use crate::extract::JsonObject;
use crate::llm_client::ResilientInvoker;
use crate::resume::sections::{trim_for_prompt, MAX_BULLETS};

const JD_PROMPT_CHARS: usize = 10_000;
const RESUME_PROMPT_CHARS: usize = 12_000;
const SUMMARY_PROMPT_CHARS: usize = 1_200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditedContent {
    pub new_summary: String,
    /// Trimmed, blanks dropped. May be shorter than the input bullets.
    pub rewritten_bullets: Vec<String>,
}

/// Everything the Editor prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct EditorInput<'a> {
    pub job_description: &'a str,
    pub resume_text: &'a str,
    pub summary_text: &'a str,
    pub bullets: &'a [String],
}

pub fn build_prompt(input: &EditorInput<'_>) -> Result<String, AppError> {
    let job_description = trim_for_prompt(input.job_description, JD_PROMPT_CHARS);
    let resume_text = trim_for_prompt(input.resume_text, RESUME_PROMPT_CHARS);
    let summary_text = trim_for_prompt(input.summary_text, SUMMARY_PROMPT_CHARS);
    let bullets = &input.bullets[..input.bullets.len().min(MAX_BULLETS)];
    let bullets_json = serde_json::to_string(bullets)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize bullets: {e}")))?;

    Ok(fill_template(
        EDITOR_PROMPT_TEMPLATE,
        &[
            ("sdg", SDG8_ALIGNMENT),
            ("job_description", &job_description),
            ("summary_text", &summary_text),
            ("bullets_json", &bullets_json),
            ("resume_text", &resume_text),
        ],
    ))
}

pub fn validate_edit(data: &JsonObject) -> Result<EditedContent, AppError> {
    let new_summary = data
        .get("new_summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation(Stage::Editor, "new_summary missing"))?;

    let bullets = require_list(Stage::Editor, data, "rewritten_bullets")?;

    Ok(EditedContent {
        new_summary: new_summary.to_string(),
        rewritten_bullets: bullets.iter().filter_map(bullet_text).collect(),
    })
}

/// Strings are trimmed; numbers, booleans and nested values use their JSON
/// text; blanks are dropped. A `null` bullet is dropped rather than rendered
/// as the literal text `None`.
fn bullet_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

pub async fn rewrite_content(
    invoker: &ResilientInvoker,
    input: &EditorInput<'_>,
) -> Result<EditedContent, AppError> {
    let prompt = build_prompt(input)?;
    call_stage(Stage::Editor, invoker, &prompt, validate_edit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_blank_summary_fails_even_with_valid_bullets() {
        let err = validate_edit(&object(json!({"new_summary": "  ", "rewritten_bullets": []})))
            .unwrap_err();
        assert_eq!(err.to_string(), "Editor output invalid: new_summary missing");
    }

    #[test]
    fn test_non_string_summary_fails() {
        assert!(validate_edit(&object(json!({"new_summary": 5, "rewritten_bullets": []}))).is_err());
    }

    #[test]
    fn test_bullets_not_list_fails() {
        let err = validate_edit(&object(json!({"new_summary": "Good.", "rewritten_bullets": "a"})))
            .unwrap_err();
        assert!(err.to_string().contains("rewritten_bullets must be a list"));
    }

    #[test]
    fn test_bullets_trimmed_coerced_and_blanks_dropped() {
        let edited = validate_edit(&object(json!({
            "new_summary": "  Analyst with SQL depth.  ",
            "rewritten_bullets": [" Led 3 projects ", "", "   ", 42, null, true]
        })))
        .unwrap();
        assert_eq!(edited.new_summary, "Analyst with SQL depth.");
        assert_eq!(
            edited.rewritten_bullets,
            vec!["Led 3 projects".to_string(), "42".to_string(), "true".to_string()]
        );
    }

    #[test]
    fn test_prompt_caps_bullets_at_eight() {
        let bullets: Vec<String> = (0..12).map(|i| format!("bullet-{i}")).collect();
        let prompt = build_prompt(&EditorInput {
            job_description: "Need Python.",
            resume_text: "resume",
            summary_text: "summary",
            bullets: &bullets,
        })
        .unwrap();
        assert!(prompt.contains("bullet-7"));
        assert!(!prompt.contains("bullet-8"));
    }

    #[test]
    fn test_prompt_with_no_bullets_sends_empty_array() {
        let prompt = build_prompt(&EditorInput {
            job_description: "Need Python.",
            resume_text: "resume",
            summary_text: "summary",
            bullets: &[],
        })
        .unwrap();
        assert!(prompt.contains("BULLETS TO REWRITE (FROM RESUME):\n[]"));
    }
}
