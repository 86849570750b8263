use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::posting::{KnownUrl, Posting};
use crate::models::profile::CandidateProfile;
use crate::pipeline::titles::suggest_titles;
use crate::pipeline::{run_pipeline, PipelineContext, PipelineOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// POST /api/v1/pipeline/run
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RunPipelineRequest {
    pub profile: CandidateProfile,
    pub postings: Vec<Posting>,
    #[serde(default)]
    pub known_urls: Vec<KnownUrl>,
}

pub async fn handle_run_pipeline(
    State(state): State<AppState>,
    Json(request): Json<RunPipelineRequest>,
) -> Result<Json<PipelineOutcome>, AppError> {
    if request.profile.resume.trim().is_empty() {
        return Err(AppError::Validation("profile.resume cannot be empty".to_string()));
    }
    if let Some(idx) = request
        .postings
        .iter()
        .position(|p| p.url.trim().is_empty())
    {
        return Err(AppError::UnprocessableEntity(format!(
            "postings[{idx}].job_url cannot be empty"
        )));
    }

    let ctx = PipelineContext::new(
        request.profile,
        state.pipeline.clone(),
        &request.known_urls,
    );
    let outcome = run_pipeline(&state.gateway, &ctx, request.postings).await;
    Ok(Json(outcome))
}

// ────────────────────────────────────────────────────────────────────────────
// POST /api/v1/titles/suggest
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SuggestTitlesRequest {
    pub profile: CandidateProfile,
}

#[derive(Debug, Serialize)]
pub struct SuggestTitlesResponse {
    pub titles: Vec<String>,
}

pub async fn handle_suggest_titles(
    State(state): State<AppState>,
    Json(request): Json<SuggestTitlesRequest>,
) -> Result<Json<SuggestTitlesResponse>, AppError> {
    let titles = suggest_titles(&state.gateway, &request.profile).await;
    if titles.is_empty() {
        return Err(AppError::Llm(format!(
            "{} returned no title suggestions",
            state.gateway.provider_name()
        )));
    }
    Ok(Json(SuggestTitlesResponse { titles }))
}
