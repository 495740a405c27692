//! Analyst — extracts the resume's skill vector.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::agents::prompts::{fill_template, ANALYST_PROMPT_TEMPLATE, SDG8_ALIGNMENT};
use crate::agents::schema::{dedup_key, normalize_whitespace, require_list};
use crate::agents::{call_stage, Stage};
use crate::errors::AppError;
use crate::extract::JsonObject;
use crate::llm_client::ResilientInvoker;
use crate::resume::sections::trim_for_prompt;

const RESUME_PROMPT_CHARS: usize = 16_000;
/// Cardinality the prompt asks for. Outside it is logged, never rejected.
const EXPECTED_SKILLS: std::ops::RangeInclusive<usize> = 10..=30;

/// Distinct skill names in first-seen order, original casing, whitespace
/// normalized. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillVector(Vec<String>);

impl SkillVector {
    pub fn skills(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

pub fn build_prompt(resume_text: &str) -> String {
    let resume_text = trim_for_prompt(resume_text, RESUME_PROMPT_CHARS);
    fill_template(
        ANALYST_PROMPT_TEMPLATE,
        &[("sdg", SDG8_ALIGNMENT), ("resume_text", &resume_text)],
    )
}

/// Validates `{"skill_vector": [...]}`. Non-string items and blanks are
/// dropped; duplicates compare case-insensitively and keep the first spelling.
pub fn validate_skill_vector(data: &JsonObject) -> Result<SkillVector, AppError> {
    let items = require_list(Stage::Analyst, data, "skill_vector")?;

    let mut seen = HashSet::new();
    let mut skills = Vec::new();
    for item in items {
        let Some(raw) = item.as_str() else {
            continue;
        };
        let skill = normalize_whitespace(raw);
        if !skill.is_empty() && seen.insert(dedup_key(&skill)) {
            skills.push(skill);
        }
    }

    if skills.is_empty() {
        return Err(AppError::validation(Stage::Analyst, "no valid skills found"));
    }
    if !EXPECTED_SKILLS.contains(&skills.len()) {
        warn!(
            "Analyst returned {} skills (expected {}-{}); continuing",
            skills.len(),
            EXPECTED_SKILLS.start(),
            EXPECTED_SKILLS.end()
        );
    }

    Ok(SkillVector(skills))
}

pub async fn analyze_resume(
    invoker: &ResilientInvoker,
    resume_text: &str,
) -> Result<SkillVector, AppError> {
    let prompt = build_prompt(resume_text);
    call_stage(Stage::Analyst, invoker, &prompt, validate_skill_vector).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_case_insensitive_dedup_keeps_first_and_trims() {
        let result =
            validate_skill_vector(&object(json!({"skill_vector": ["Python", "python", " SQL "]})))
                .unwrap();
        assert_eq!(result.skills(), ["Python".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn test_empty_list_is_validation_error() {
        let err = validate_skill_vector(&object(json!({"skill_vector": []}))).unwrap_err();
        assert!(matches!(err, AppError::Validation { stage: Stage::Analyst, .. }));
    }

    #[test]
    fn test_only_junk_items_is_validation_error() {
        let err = validate_skill_vector(&object(json!({"skill_vector": [1, null, "   ", {"a": 1}]})))
            .unwrap_err();
        assert!(err.to_string().contains("no valid skills"));
    }

    #[test]
    fn test_non_list_is_validation_error() {
        let err = validate_skill_vector(&object(json!({"skill_vector": "Python"}))).unwrap_err();
        assert!(err.to_string().contains("must be a list"));
    }

    #[test]
    fn test_missing_key_is_validation_error() {
        assert!(validate_skill_vector(&object(json!({"skills": ["Python"]}))).is_err());
    }

    #[test]
    fn test_count_outside_hint_is_accepted() {
        let result =
            validate_skill_vector(&object(json!({"skill_vector": ["Rust", "Tokio"]}))).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_internal_whitespace_collapsed() {
        let result =
            validate_skill_vector(&object(json!({"skill_vector": ["Power   BI", "power bi"]})))
                .unwrap();
        assert_eq!(result.skills(), ["Power BI".to_string()]);
    }

    #[test]
    fn test_prompt_embeds_trimmed_resume() {
        let prompt = build_prompt("  Rust developer  ");
        assert!(prompt.contains("RESUME:\nRust developer"));
        assert!(prompt.contains("\"skill_vector\""));
        assert!(!prompt.contains("{resume_text}"));
    }
}
