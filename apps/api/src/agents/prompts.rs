// Prompt templates for the four pipeline stages.
// Each template ends its instructions with the JSON contract phrase the invoker
// keys structured mode on. `fill_template` fills `{name}` placeholders in one pass;
// substituted values are never rescanned.

/// Shared alignment line (UN SDG 8, decent work and economic growth).
pub const SDG8_ALIGNMENT: &str = "Align your output with SDG 8 (Decent Work and Economic Growth): \
    emphasize skills relevant to productive employment, fair labor practices, and professional development.";

/// Analyst: resume → skill vector. Replace `{sdg}`, `{resume_text}`.
pub const ANALYST_PROMPT_TEMPLATE: &str = r#"You are Agent 1: The Analyst (Parser).
{sdg}
Extract a structured Skill Vector from the RESUME text.
Include technical skills, tools, languages, frameworks, and core domain skills.
Do not invent skills not supported by the resume.
Return only valid JSON with this exact schema: {"skill_vector": ["s1", "s2", "s3"]}.
Rules: 10 to 30 items, deduplicate, use short canonical names (e.g., 'Python', 'SQL', 'Pandas', 'Power BI').

RESUME:
{resume_text}"#;

/// Scout: job description → weighted skills. Replace `{sdg}`, `{job_description}`.
pub const SCOUT_PROMPT_TEMPLATE: &str = r#"You are Agent 2: The Scout (Market Research).
{sdg}
Analyze the TARGET JOB DESCRIPTION.
Separate REQUIRED skills from NICE-TO-HAVE skills and assign a weight to each keyword.
Weights: 5=critical, 4=important, 3=useful, 2=minor, 1=optional.
Return only valid JSON with this exact schema: {"required_skills": [{"skill": "...", "weight": 1}], "nice_to_have_skills": [{"skill": "...", "weight": 1}]}.
Rules: 6 to 15 required skills; 4 to 12 nice-to-have skills; deduplicate; keep skill names short and canonical.

JOB DESCRIPTION:
{job_description}"#;

/// Strategist: skill vector vs job skills → gap report.
/// Replace `{sdg}`, `{resume_skills_json}`, `{required_json}`, `{nice_json}`.
pub const STRATEGIST_PROMPT_TEMPLATE: &str = r#"You are Agent 3: The Strategist (Gap Analysis).
{sdg}
Compare the RESUME SKILL VECTOR against the JD SKILLS.
Produce a Gap Report listing skills that are missing or underrepresented in the resume.
Return only valid JSON with this exact schema: {"matched_skills": ["..."], "gap_report": [{"skill": "...", "type": "required"|"nice_to_have", "weight": 1, "reason": "..."}]}.
Rules: include up to 10 gaps, prioritize required skills with higher weight; do not claim a gap if the skill is present in the resume vector.

RESUME SKILL VECTOR:
{resume_skills_json}

JD REQUIRED SKILLS:
{required_json}

JD NICE-TO-HAVE SKILLS:
{nice_json}"#;

/// Editor: rewrite summary and bullets.
/// Replace `{sdg}`, `{job_description}`, `{summary_text}`, `{bullets_json}`, `{resume_text}`.
pub const EDITOR_PROMPT_TEMPLATE: &str = r#"You are Agent 4: The Editor (Content Generation).
{sdg}
Rewrite content to improve ATS match to the JOB DESCRIPTION, while being ethical:
do NOT invent new skills, employers, titles, metrics, or projects not supported by the RESUME TEXT.
You may rephrase to highlight existing skills and responsibilities more clearly.
Tasks:
1) Rewrite the RESUME SUMMARY into 3-5 sentences (third-person, no exaggeration).
2) Rewrite the provided bullet points to better reflect JD keywords without changing meaning.
Return only valid JSON with this exact schema: {"new_summary": "...", "rewritten_bullets": ["..."]}.
Rules: Keep number of rewritten bullets equal to input bullets; if no bullets are provided, return an empty array for rewritten_bullets.

JOB DESCRIPTION:
{job_description}

RESUME SUMMARY (DETECTED):
{summary_text}

BULLETS TO REWRITE (FROM RESUME):
{bullets_json}

RESUME TEXT (EVIDENCE):
{resume_text}"#;

/// Substitutes `{name}` placeholders in a single pass, so values that happen
/// to contain placeholder text are inserted verbatim.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];
        for &(name, value) in values {
            if candidate.starts_with(name) && candidate[name.len()..].starts_with('}') {
                out.push_str(value);
                rest = &candidate[name.len() + 1..];
                continue 'scan;
            }
        }
        out.push('{');
        rest = candidate;
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_known_placeholders_only() {
        let filled = fill_template(
            r#"A {x} B {"skill": 1} C {y}"#,
            &[("x", "one"), ("y", "two")],
        );
        assert_eq!(filled, r#"A one B {"skill": 1} C two"#);
    }

    #[test]
    fn test_fill_template_does_not_expand_inside_values() {
        let filled = fill_template("{a}|{b}", &[("a", "{b}"), ("b", "B")]);
        assert_eq!(filled, "{b}|B");
    }

    #[test]
    fn test_templates_carry_json_contract() {
        for template in [
            ANALYST_PROMPT_TEMPLATE,
            SCOUT_PROMPT_TEMPLATE,
            STRATEGIST_PROMPT_TEMPLATE,
            EDITOR_PROMPT_TEMPLATE,
        ] {
            assert!(crate::llm_client::invoker::wants_json(template));
        }
    }
}
