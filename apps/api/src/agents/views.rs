//! Display rows for a finished pipeline run.
//!
//! Pure functions from `PipelineReport` to table-ready rows. Gap entries come
//! through the Strategist unvalidated, so malformed ones are skipped here.

use std::cmp::Reverse;

use serde::Serialize;
use serde_json::Value;

use crate::agents::pipeline::PipelineReport;
use crate::agents::scout::WeightedSkill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    Required,
    NiceToHave,
    /// Missing or unrecognized `type`.
    Unspecified,
}

impl GapKind {
    fn parse(raw: &str) -> Self {
        match raw {
            "required" => GapKind::Required,
            "nice_to_have" => GapKind::NiceToHave,
            _ => GapKind::Unspecified,
        }
    }
}

/// One gap, read leniently from a pass-through entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapEntry {
    pub skill: String,
    pub kind: GapKind,
    /// Whatever the model sent; integers sort, anything else sorts as 0.
    pub weight: Value,
    pub reason: String,
}

impl GapEntry {
    /// `None` when the entry is not an object or has no non-blank `skill`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let entry = value.as_object()?;
        let skill = entry.get("skill")?.as_str()?.trim();
        if skill.is_empty() {
            return None;
        }
        Some(GapEntry {
            skill: skill.to_string(),
            kind: GapKind::parse(loose_text(entry.get("type")).as_str()),
            weight: entry.get("weight").cloned().unwrap_or(Value::Null),
            reason: loose_text(entry.get("reason")),
        })
    }

    fn sort_weight(&self) -> i64 {
        self.weight.as_i64().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulletRow {
    pub original: String,
    pub rewritten: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineView {
    pub skill_vector: Vec<String>,
    pub required_skills: Vec<WeightedSkill>,
    pub nice_to_have_skills: Vec<WeightedSkill>,
    pub gaps: Vec<GapEntry>,
    pub matched_skills: Vec<String>,
    pub original_summary: String,
    pub rewritten_summary: String,
    pub bullets: Vec<BulletRow>,
}

impl PipelineView {
    pub fn from_report(report: &PipelineReport) -> Self {
        PipelineView {
            skill_vector: report.resume_skills.skills().to_vec(),
            required_skills: weighted_rows(&report.job_skills.required),
            nice_to_have_skills: weighted_rows(&report.job_skills.nice_to_have),
            gaps: gap_rows(&report.gaps.gap_report),
            matched_skills: matched_rows(&report.gaps.matched_skills),
            original_summary: report.summary_candidate.clone(),
            rewritten_summary: report.edited.new_summary.clone(),
            bullets: bullet_rows(&report.bullet_candidates, &report.edited.rewritten_bullets),
        }
    }
}

/// Heaviest first, then by name.
pub fn weighted_rows(skills: &[WeightedSkill]) -> Vec<WeightedSkill> {
    let mut rows = skills.to_vec();
    rows.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Required before everything else, then heaviest, then by skill.
pub fn gap_rows(entries: &[Value]) -> Vec<GapEntry> {
    let mut rows: Vec<GapEntry> = entries.iter().filter_map(GapEntry::from_value).collect();
    rows.sort_by_key(|g| {
        (
            g.kind != GapKind::Required,
            Reverse(g.sort_weight()),
            g.skill.clone(),
        )
    });
    rows
}

pub fn matched_rows(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// One row per original bullet; missing rewrites render empty.
pub fn bullet_rows(original: &[String], rewritten: &[String]) -> Vec<BulletRow> {
    original
        .iter()
        .enumerate()
        .map(|(i, orig)| BulletRow {
            original: orig.clone(),
            rewritten: rewritten.get(i).cloned().unwrap_or_default(),
        })
        .collect()
}

fn loose_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skill(name: &str, weight: u8) -> WeightedSkill {
        WeightedSkill {
            name: name.to_string(),
            weight,
        }
    }

    #[test]
    fn test_weighted_rows_sorted_by_weight_then_name() {
        let rows = weighted_rows(&[skill("SQL", 3), skill("Python", 5), skill("Airflow", 3)]);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Python", "Airflow", "SQL"]);
    }

    #[test]
    fn test_gap_rows_skip_malformed_and_sort_required_first() {
        let rows = gap_rows(&[
            json!({"skill": "Docker", "type": "nice_to_have", "weight": 5, "reason": " nice "}),
            json!("not an object"),
            json!({"skill": "  ", "type": "required"}),
            json!({"type": "required", "weight": 4}),
            json!({"skill": "SQL", "type": "required", "weight": 3}),
            json!({"skill": "Python", "type": "required", "weight": 5, "reason": "absent"}),
            json!({"skill": "Scala", "type": "required", "weight": "high"}),
        ]);

        let skills: Vec<&str> = rows.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(skills, vec!["Python", "SQL", "Scala", "Docker"]);
        assert_eq!(rows[0].reason, "absent");
        assert_eq!(rows[2].weight, json!("high"));
        assert_eq!(rows[3].kind, GapKind::NiceToHave);
        assert_eq!(rows[3].reason, "nice");
    }

    #[test]
    fn test_gap_entry_unknown_type_is_unspecified() {
        let entry = GapEntry::from_value(&json!({"skill": "Go", "type": "bonus"})).unwrap();
        assert_eq!(entry.kind, GapKind::Unspecified);
        assert_eq!(entry.weight, Value::Null);
        assert_eq!(entry.reason, "");
    }

    #[test]
    fn test_matched_rows_keep_strings_only() {
        let rows = matched_rows(&[json!(" SQL "), json!(7), json!(null), json!("")]);
        assert_eq!(rows, vec!["SQL".to_string()]);
    }

    #[test]
    fn test_bullet_rows_pad_missing_rewrites() {
        let original = vec!["a".to_string(), "b".to_string()];
        let rewritten = vec!["A".to_string()];
        assert_eq!(
            bullet_rows(&original, &rewritten),
            vec![
                BulletRow {
                    original: "a".into(),
                    rewritten: "A".into()
                },
                BulletRow {
                    original: "b".into(),
                    rewritten: String::new()
                },
            ]
        );
    }
}
