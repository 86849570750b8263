use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::{build_context, PLAIN_TEXT_SYSTEM};
use crate::llm_client::ReasoningGateway;
use crate::models::posting::Posting;
use crate::models::profile::CandidateProfile;
use crate::pipeline::prompts::{HARD_REQUIREMENTS_QUESTION, SHORT_SUMMARY_QUESTION};

/// Derived text for a retained posting. A question that fails leaves its field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub short_summary: Option<String>,
    pub hard_requirements: Option<String>,
}

pub async fn enrich(
    gateway: &ReasoningGateway,
    profile: &CandidateProfile,
    posting: &Posting,
) -> Enrichment {
    let resume = profile.normalized_resume();
    let job = posting.prompt_context();

    let short_summary = ask(gateway, &resume, &job, SHORT_SUMMARY_QUESTION).await;
    if short_summary.is_none() {
        warn!("No short summary for '{}' at {}", posting.title, posting.employer);
    }

    let hard_requirements = ask(gateway, &resume, &job, HARD_REQUIREMENTS_QUESTION).await;
    if hard_requirements.is_none() {
        warn!("No hard requirements for '{}' at {}", posting.title, posting.employer);
    }

    Enrichment {
        short_summary,
        hard_requirements,
    }
}

async fn ask(gateway: &ReasoningGateway, resume: &str, job: &str, question: &str) -> Option<String> {
    let message = build_context(Some(resume), Some(job), question);
    gateway
        .complete(PLAIN_TEXT_SYSTEM, &message)
        .await
        .map(|answer| answer.trim().to_string())
        .filter(|answer| !answer.is_empty())
}
