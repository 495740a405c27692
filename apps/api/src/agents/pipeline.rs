//! Pipeline orchestrator — runs the four stages in order for one resume / JD pair.
//!
//! Flow: input checks → heuristic summary/bullet detection → Analyst → Scout →
//!       Strategist → Editor → report.
//!
//! The first failing stage ends the run and its error is returned alone; no
//! partial report is produced. Nothing is retried at this level.

use serde::Serialize;
use tracing::info;

use crate::agents::analyst::{analyze_resume, SkillVector};
use crate::agents::editor::{rewrite_content, EditedContent, EditorInput};
use crate::agents::scout::{scout_job_description, JobSkills};
use crate::agents::strategist::{analyze_gaps, GapReport};
use crate::errors::AppError;
use crate::llm_client::ResilientInvoker;
use crate::resume::sections::{extract_bullet_candidates, extract_summary_candidate, MAX_BULLETS};

/// Validated output of every stage plus the heuristic inputs the Editor saw.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub resume_skills: SkillVector,
    pub job_skills: JobSkills,
    pub gaps: GapReport,
    pub summary_candidate: String,
    pub bullet_candidates: Vec<String>,
    pub edited: EditedContent,
}

/// Runs Analyst → Scout → Strategist → Editor.
///
/// Blank resume text or job description is an `InputError` raised before any
/// backend call.
pub async fn run_pipeline(
    invoker: &ResilientInvoker,
    resume_text: &str,
    job_description: &str,
) -> Result<PipelineReport, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Input(
            "Could not extract text from the resume.".to_string(),
        ));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::Input(
            "Job description cannot be empty.".to_string(),
        ));
    }

    let summary_candidate = extract_summary_candidate(resume_text);
    let bullet_candidates = extract_bullet_candidates(resume_text, MAX_BULLETS);
    info!(
        "Detected summary of {} chars and {} bullet candidates",
        summary_candidate.chars().count(),
        bullet_candidates.len()
    );

    let resume_skills = analyze_resume(invoker, resume_text).await?;
    info!("Analyst: {} resume skills", resume_skills.len());

    let job_skills = scout_job_description(invoker, job_description).await?;
    info!(
        "Scout: {} required, {} nice-to-have",
        job_skills.required.len(),
        job_skills.nice_to_have.len()
    );

    let gaps = analyze_gaps(invoker, &resume_skills, &job_skills).await?;
    info!(
        "Strategist: {} matched, {} gaps",
        gaps.matched_skills.len(),
        gaps.gap_report.len()
    );

    let edited = rewrite_content(
        invoker,
        &EditorInput {
            job_description,
            resume_text,
            summary_text: &summary_candidate,
            bullets: &bullet_candidates,
        },
    )
    .await?;
    info!(
        "Editor: {} of {} bullets rewritten",
        edited.rewritten_bullets.len(),
        bullet_candidates.len()
    );

    Ok(PipelineReport {
        resume_skills,
        job_skills,
        gaps,
        summary_candidate,
        bullet_candidates,
        edited,
    })
}
