//! Scout — weighted required / nice-to-have skills from the job description.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::agents::prompts::{fill_template, SCOUT_PROMPT_TEMPLATE, SDG8_ALIGNMENT};
use crate::agents::schema::{coerce_integer, dedup_key, normalize_whitespace, require_list};
use crate::agents::{call_stage, Stage};
use crate::errors::AppError;
use crate::extract::JsonObject;
use crate::llm_client::ResilientInvoker;
use crate::resume::sections::trim_for_prompt;

const JD_PROMPT_CHARS: usize = 12_000;
pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 5;

/// 5=critical, 4=important, 3=useful, 2=minor, 1=optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedSkill {
    #[serde(rename = "skill")]
    pub name: String,
    pub weight: u8,
}

/// Both lists are deduplicated independently; either may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSkills {
    #[serde(rename = "required_skills")]
    pub required: Vec<WeightedSkill>,
    #[serde(rename = "nice_to_have_skills")]
    pub nice_to_have: Vec<WeightedSkill>,
}

impl JobSkills {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.nice_to_have.is_empty()
    }
}

pub fn build_prompt(job_description: &str) -> String {
    let job_description = trim_for_prompt(job_description, JD_PROMPT_CHARS);
    fill_template(
        SCOUT_PROMPT_TEMPLATE,
        &[("sdg", SDG8_ALIGNMENT), ("job_description", &job_description)],
    )
}

/// Validates the two weighted lists. Shape violations are fatal; individual
/// items that fail coercion or fall outside 1–5 are dropped, and an empty
/// result is accepted.
pub fn validate_job_skills(data: &JsonObject) -> Result<JobSkills, AppError> {
    let required = require_list(Stage::Scout, data, "required_skills")?;
    let nice_to_have = require_list(Stage::Scout, data, "nice_to_have_skills")?;

    let skills = JobSkills {
        required: clean_weighted(required),
        nice_to_have: clean_weighted(nice_to_have),
    };

    if skills.is_empty() {
        warn!("Scout found no usable skills in the job description");
    }
    Ok(skills)
}

fn clean_weighted(items: &[Value]) -> Vec<WeightedSkill> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for item in items {
        let Some(entry) = item.as_object() else {
            continue;
        };
        let Some(raw_name) = entry.get("skill").and_then(Value::as_str) else {
            continue;
        };
        let name = normalize_whitespace(raw_name);
        if name.is_empty() {
            continue;
        }
        let key = dedup_key(&name);
        if seen.contains(&key) {
            continue;
        }
        let Some(weight) = entry.get("weight").and_then(parse_weight) else {
            continue;
        };
        seen.insert(key);
        out.push(WeightedSkill { name, weight });
    }

    out
}

fn parse_weight(value: &Value) -> Option<u8> {
    coerce_integer(value)
        .and_then(|w| u8::try_from(w).ok())
        .filter(|w| (MIN_WEIGHT..=MAX_WEIGHT).contains(w))
}

pub async fn scout_job_description(
    invoker: &ResilientInvoker,
    job_description: &str,
) -> Result<JobSkills, AppError> {
    let prompt = build_prompt(job_description);
    call_stage(Stage::Scout, invoker, &prompt, validate_job_skills).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn skill(name: &str, weight: u8) -> WeightedSkill {
        WeightedSkill {
            name: name.to_string(),
            weight,
        }
    }

    #[test]
    fn test_out_of_range_weight_dropped_silently() {
        let result = validate_job_skills(&object(json!({
            "required_skills": [
                {"skill": "Python", "weight": 5},
                {"skill": "Kafka", "weight": "7"}
            ],
            "nice_to_have_skills": [{"skill": "Airflow", "weight": "2"}]
        })))
        .unwrap();
        assert_eq!(result.required, vec![skill("Python", 5)]);
        assert_eq!(result.nice_to_have, vec![skill("Airflow", 2)]);
    }

    #[test]
    fn test_all_invalid_items_yield_empty_lists_without_error() {
        let result = validate_job_skills(&object(json!({
            "required_skills": [{"skill": "Go", "weight": 0}, {"skill": 3, "weight": 3}, "SQL"],
            "nice_to_have_skills": [{"skill": "Docker", "weight": "high"}, {"skill": "K8s"}]
        })))
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_dedup_is_per_list_and_case_insensitive() {
        let result = validate_job_skills(&object(json!({
            "required_skills": [
                {"skill": "SQL", "weight": 4},
                {"skill": " sql ", "weight": 5}
            ],
            "nice_to_have_skills": [{"skill": "Sql", "weight": 1}]
        })))
        .unwrap();
        assert_eq!(result.required, vec![skill("SQL", 4)]);
        assert_eq!(result.nice_to_have, vec![skill("Sql", 1)]);
    }

    #[test]
    fn test_invalid_weight_does_not_claim_name() {
        let result = validate_job_skills(&object(json!({
            "required_skills": [
                {"skill": "Rust", "weight": 9},
                {"skill": "rust", "weight": 3}
            ],
            "nice_to_have_skills": []
        })))
        .unwrap();
        assert_eq!(result.required, vec![skill("rust", 3)]);
    }

    #[test]
    fn test_float_weight_truncated() {
        let result = validate_job_skills(&object(json!({
            "required_skills": [{"skill": "Spark", "weight": 4.7}],
            "nice_to_have_skills": []
        })))
        .unwrap();
        assert_eq!(result.required, vec![skill("Spark", 4)]);
    }

    #[test]
    fn test_non_list_key_is_validation_error() {
        let err = validate_job_skills(&object(json!({
            "required_skills": {"skill": "Python", "weight": 5},
            "nice_to_have_skills": []
        })))
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { stage: Stage::Scout, .. }));
    }

    #[test]
    fn test_missing_keys_is_validation_error() {
        assert!(validate_job_skills(&object(json!({"skills": []}))).is_err());
    }

    #[test]
    fn test_serializes_with_prompt_field_names() {
        let skills = JobSkills {
            required: vec![skill("Python", 5)],
            nice_to_have: vec![],
        };
        assert_eq!(
            serde_json::to_value(&skills).unwrap(),
            json!({"required_skills": [{"skill": "Python", "weight": 5}], "nice_to_have_skills": []})
        );
    }
}
