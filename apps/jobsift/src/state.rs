use crate::llm_client::ReasoningGateway;
use crate::pipeline::PipelineConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub gateway: ReasoningGateway,
    /// Defaults for every run submitted over HTTP.
    pub pipeline: PipelineConfig,
}
