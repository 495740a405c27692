// Four-stage resume alignment pipeline.
// Analyst → Scout → Strategist → Editor. Every model call goes through
// llm_client::ResilientInvoker; every reply goes through extract + a stage validator.

pub mod analyst;
pub mod editor;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod scout;
pub mod strategist;
pub mod views;

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::{extract_json_object, JsonObject};
use crate::llm_client::ResilientInvoker;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyst,
    Scout,
    Strategist,
    Editor,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Analyst => "Analyst",
            Stage::Scout => "Scout",
            Stage::Strategist => "Strategist",
            Stage::Editor => "Editor",
        };
        f.write_str(name)
    }
}

/// Prompt → invoke → extract → validate. No retry here: recovery lives in
/// the invoker, and a reply that fails extraction or validation fails the stage.
pub(crate) async fn call_stage<T, F>(
    stage: Stage,
    invoker: &ResilientInvoker,
    prompt: &str,
    validate: F,
) -> Result<T, AppError>
where
    F: FnOnce(&JsonObject) -> Result<T, AppError>,
{
    info!("Stage {stage} started");
    let reply = invoker.invoke(prompt).await?;
    let object = extract_json_object(&reply)?;
    let result = validate(&object)?;
    info!("Stage {stage} completed");
    Ok(result)
}
