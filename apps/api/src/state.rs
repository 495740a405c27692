use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::{ChatBackend, ResilientInvoker};

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only immutable configuration and the backend; per-run state lives in
/// the invoker built for each request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable generation backend. Default: GroqBackend.
    pub backend: Arc<dyn ChatBackend>,
}

impl AppState {
    /// Fresh invoker for one pipeline run.
    pub fn invoker(&self) -> ResilientInvoker {
        ResilientInvoker::new(self.backend.clone(), self.config.llm.clone())
    }
}
