//! Resilient invoker — wraps a single backend call in a bounded recovery ladder.
//!
//! Ladder (each step entered at most once, always moving forward):
//! 1. `Initial`: JSON-expecting prompts get structured mode, temperature 0 and
//!    a token floor; other prompts use the configured sampling settings.
//! 2. `StructuredModeFallback`: the initial call errored while structured mode
//!    was on; resend the same request without it.
//! 3. `EmptyRetry`: a call succeeded with an empty body; resend at temperature 0.
//! 4. `TokenEscalation`: the empty retry stopped on `length`; resend with the
//!    token budget raised by `TOKEN_ESCALATION`.
//!
//! Anything not covered by a transition is terminal and surfaces as
//! `LlmError::Unrecoverable`.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::LlmSettings;
use crate::llm_client::prompts::{EMPTY_RESPONSE_GUIDANCE, JSON_CONTRACT_MARKERS, SYSTEM_INSTRUCTION};
use crate::llm_client::{ChatBackend, ChatRequest, LlmError};

/// Minimum `max_tokens` for JSON-expecting prompts.
pub const JSON_TOKEN_FLOOR: u32 = 1200;
/// Added to the token budget by the escalation step.
pub const TOKEN_ESCALATION: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStep {
    Initial,
    StructuredModeFallback,
    EmptyRetry,
    TokenEscalation,
}

/// How a single attempt ended, as far as the ladder cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The backend call itself errored.
    Failed,
    /// The call succeeded but the body was blank.
    Empty { truncated: bool },
}

impl RecoveryStep {
    /// Adjusts the request on entry to this step.
    pub fn apply(self, request: &mut ChatRequest) {
        match self {
            RecoveryStep::Initial => {}
            RecoveryStep::StructuredModeFallback => request.json_mode = false,
            RecoveryStep::EmptyRetry => request.temperature = 0.0,
            RecoveryStep::TokenEscalation => {
                request.max_tokens = request.max_tokens.saturating_add(TOKEN_ESCALATION)
            }
        }
    }

    /// The step to take after `outcome`, or `None` when the ladder is exhausted.
    pub fn next(self, outcome: AttemptOutcome, json_mode: bool) -> Option<RecoveryStep> {
        match (self, outcome) {
            (RecoveryStep::Initial, AttemptOutcome::Failed) if json_mode => {
                Some(RecoveryStep::StructuredModeFallback)
            }
            (
                RecoveryStep::Initial | RecoveryStep::StructuredModeFallback,
                AttemptOutcome::Empty { .. },
            ) => Some(RecoveryStep::EmptyRetry),
            (RecoveryStep::EmptyRetry, AttemptOutcome::Empty { truncated: true }) => {
                Some(RecoveryStep::TokenEscalation)
            }
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            RecoveryStep::Initial => "initial",
            RecoveryStep::StructuredModeFallback => "structured-mode-fallback",
            RecoveryStep::EmptyRetry => "empty-retry",
            RecoveryStep::TokenEscalation => "token-escalation",
        }
    }
}

/// True when the prompt carries a JSON output contract.
pub fn wants_json(prompt: &str) -> bool {
    let lowered = prompt.to_lowercase();
    JSON_CONTRACT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Invokes the backend with graceful degradation. Holds no per-call state, so
/// clones can serve concurrent pipeline runs independently.
#[derive(Clone)]
pub struct ResilientInvoker {
    backend: Arc<dyn ChatBackend>,
    settings: LlmSettings,
}

impl ResilientInvoker {
    pub fn new(backend: Arc<dyn ChatBackend>, settings: LlmSettings) -> Self {
        Self { backend, settings }
    }

    /// The request the `Initial` step sends for `prompt`.
    pub fn initial_request(&self, prompt: &str) -> ChatRequest {
        let json_mode = wants_json(prompt);
        ChatRequest {
            system: SYSTEM_INSTRUCTION.to_string(),
            prompt: prompt.to_string(),
            temperature: if json_mode {
                0.0
            } else {
                self.settings.temperature
            },
            max_tokens: if json_mode {
                self.settings.max_tokens.max(JSON_TOKEN_FLOOR)
            } else {
                self.settings.max_tokens
            },
            json_mode,
        }
    }

    /// Sends `prompt` and returns the trimmed, non-empty reply.
    pub async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        let mut request = self.initial_request(prompt);
        let mut step = RecoveryStep::Initial;
        let mut first_error: Option<LlmError> = None;

        loop {
            step.apply(&mut request);
            debug!(
                "Invoking backend: step={}, json_mode={}, temperature={}, max_tokens={}",
                step.label(),
                request.json_mode,
                request.temperature,
                request.max_tokens
            );

            let (outcome, stop_reason) = match self.backend.generate(&request).await {
                Ok(completion) => {
                    if let Some(text) = completion.text() {
                        debug!("Backend replied with {} chars", text.len());
                        return Ok(text.to_string());
                    }
                    let outcome = AttemptOutcome::Empty {
                        truncated: completion.truncated(),
                    };
                    (outcome, completion.stop_reason)
                }
                Err(err) => match step.next(AttemptOutcome::Failed, request.json_mode) {
                    Some(next) => {
                        warn!("Backend call failed at step {}: {err}; retrying", step.label());
                        first_error.get_or_insert(err);
                        step = next;
                        continue;
                    }
                    None => {
                        let message = failure_message(step, &err, first_error.as_ref());
                        error!("{message}");
                        return Err(LlmError::Unrecoverable(message));
                    }
                },
            };

            match step.next(outcome, request.json_mode) {
                Some(next) => {
                    warn!(
                        "Backend returned empty content at step {} (finish_reason={}); moving to {}",
                        step.label(),
                        stop_reason.as_deref().unwrap_or("none"),
                        next.label()
                    );
                    step = next;
                }
                None => {
                    let message = empty_message(stop_reason.as_deref(), first_error.as_ref());
                    error!("{message}");
                    return Err(LlmError::Unrecoverable(message));
                }
            }
        }
    }
}

fn failure_message(step: RecoveryStep, err: &LlmError, first_error: Option<&LlmError>) -> String {
    let mut message = match step {
        RecoveryStep::Initial | RecoveryStep::StructuredModeFallback => {
            format!("API request failed: {err}")
        }
        RecoveryStep::EmptyRetry | RecoveryStep::TokenEscalation => {
            format!("API request failed after retry: {err}")
        }
    };
    if let Some(first) = first_error {
        message.push_str(&format!(" (first error: {first})"));
    }
    message
}

fn empty_message(stop_reason: Option<&str>, first_error: Option<&LlmError>) -> String {
    let mut message = "Model returned an empty response. ".to_string();
    if let Some(reason) = stop_reason.filter(|r| !r.is_empty()) {
        message.push_str(&format!("finish_reason={reason}. "));
    }
    message.push_str(EMPTY_RESPONSE_GUIDANCE);
    if let Some(first) = first_error {
        message.push_str(&format!(" (first error: {first})"));
    }
    message
}
