//! Strategist — gap report between the resume skill vector and the job skills.
//!
//! Only the list shape of `matched_skills` and `gap_report` is checked here.
//! Items pass through untouched and the view layer skips malformed entries
//! when it builds rows. No other stage defers item cleaning this way.

use serde::Serialize;
use serde_json::Value;

use crate::agents::analyst::SkillVector;
use crate::agents::prompts::{fill_template, SDG8_ALIGNMENT, STRATEGIST_PROMPT_TEMPLATE};
use crate::agents::schema::require_list;
use crate::agents::scout::JobSkills;
use crate::agents::{call_stage, Stage};
use crate::errors::AppError;
use crate::extract::JsonObject;
use crate::llm_client::ResilientInvoker;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub matched_skills: Vec<Value>,
    pub gap_report: Vec<Value>,
}

pub fn build_prompt(resume_skills: &SkillVector, job_skills: &JobSkills) -> Result<String, AppError> {
    let resume_skills_json = to_json(resume_skills)?;
    let required_json = to_json(&job_skills.required)?;
    let nice_json = to_json(&job_skills.nice_to_have)?;

    Ok(fill_template(
        STRATEGIST_PROMPT_TEMPLATE,
        &[
            ("sdg", SDG8_ALIGNMENT),
            ("resume_skills_json", &resume_skills_json),
            ("required_json", &required_json),
            ("nice_json", &nice_json),
        ],
    ))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize prompt input: {e}")))
}

pub fn validate_gap_report(data: &JsonObject) -> Result<GapReport, AppError> {
    let matched_skills = require_list(Stage::Strategist, data, "matched_skills")?;
    let gap_report = require_list(Stage::Strategist, data, "gap_report")?;

    Ok(GapReport {
        matched_skills: matched_skills.clone(),
        gap_report: gap_report.clone(),
    })
}

pub async fn analyze_gaps(
    invoker: &ResilientInvoker,
    resume_skills: &SkillVector,
    job_skills: &JobSkills,
) -> Result<GapReport, AppError> {
    let prompt = build_prompt(resume_skills, job_skills)?;
    call_stage(Stage::Strategist, invoker, &prompt, validate_gap_report).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::analyst::validate_skill_vector;
    use crate::agents::scout::WeightedSkill;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_items_pass_through_untouched() {
        let report = validate_gap_report(&object(json!({
            "matched_skills": ["SQL", 42, null],
            "gap_report": [
                {"skill": "Python", "type": "required", "weight": "5", "reason": "absent"},
                "garbage"
            ]
        })))
        .unwrap();
        assert_eq!(report.matched_skills, vec![json!("SQL"), json!(42), json!(null)]);
        assert_eq!(report.gap_report.len(), 2);
        assert_eq!(report.gap_report[1], json!("garbage"));
    }

    #[test]
    fn test_empty_lists_are_accepted() {
        let report =
            validate_gap_report(&object(json!({"matched_skills": [], "gap_report": []}))).unwrap();
        assert!(report.matched_skills.is_empty());
        assert!(report.gap_report.is_empty());
    }

    #[test]
    fn test_non_list_is_validation_error() {
        let err = validate_gap_report(&object(json!({"matched_skills": [], "gap_report": {}})))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { stage: Stage::Strategist, .. }));
        assert!(err.to_string().contains("gap_report"));
    }

    #[test]
    fn test_prompt_embeds_serialized_inputs() {
        let resume = validate_skill_vector(&object(json!({"skill_vector": ["SQL"]}))).unwrap();
        let job = JobSkills {
            required: vec![WeightedSkill {
                name: "Python".to_string(),
                weight: 5,
            }],
            nice_to_have: vec![],
        };
        let prompt = build_prompt(&resume, &job).unwrap();
        assert!(prompt.contains("RESUME SKILL VECTOR:\n[\"SQL\"]"));
        assert!(prompt.contains(r#"JD REQUIRED SKILLS:
[{"skill":"Python","weight":5}]"#));
        assert!(prompt.contains("JD NICE-TO-HAVE SKILLS:\n[]"));
    }
}
