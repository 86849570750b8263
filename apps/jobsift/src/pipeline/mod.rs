//! Pipeline Orchestrator: filter chain, then per-posting assessment and enrichment.
//!
//! Per-posting lifecycle (terminal states in capitals):
//!
//! ```text
//! Ingested → PassedFilters | FILTERED_OUT
//!          → Assessed | ASSESSMENT_FAILED
//!          → Scored → RETAINED | DROPPED_LOW_SCORE
//! ```
//!
//! One posting's failure never aborts the batch. Per-posting work runs as an ordered, bounded
//! stream so the output order always matches the order postings left the filter chain.

pub mod enrichment;
pub mod handlers;
pub mod prompts;
pub mod titles;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::filters::{FilterChain, FilterReport, FilterSettings};
use crate::llm_client::ReasoningGateway;
use crate::models::posting::{KnownUrl, KnownUrls, Posting};
use crate::models::profile::CandidateProfile;
use crate::scoring::{EvaluationKind, RubricScorer, RubricScores};

use enrichment::{enrich, Enrichment};

pub const DEFAULT_RECENCY_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;

// ────────────────────────────────────────────────────────────────────────────
// Run configuration and context
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub filters: FilterSettings,
    pub scorer: RubricScorer,
    /// Known URLs older than this many days no longer exclude a posting.
    pub recency_window_days: i64,
    /// Keep only the first N postings that survive the filter chain.
    pub max_postings: Option<usize>,
    pub max_concurrency: usize,
    pub enrich: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filters: FilterSettings::default(),
            scorer: RubricScorer::default(),
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
            max_postings: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            enrich: true,
        }
    }
}

/// Everything one pipeline run reads. Nothing in the pipeline consults global state.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub run_id: Uuid,
    pub profile: CandidateProfile,
    pub config: PipelineConfig,
    pub known_urls: KnownUrls,
}

impl PipelineContext {
    /// Builds the context, narrowing `known` to the configured recency window.
    pub fn new(profile: CandidateProfile, config: PipelineConfig, known: &[KnownUrl]) -> Self {
        let known_urls = KnownUrls::within_window(known, Utc::now(), config.recency_window_days);
        Self {
            run_id: Uuid::new_v4(),
            profile,
            config,
            known_urls,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    AssessmentFailed,
    Retained,
    DroppedLowScore,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingStatus::AssessmentFailed => "assessment_failed",
            PostingStatus::Retained => "retained",
            PostingStatus::DroppedLowScore => "dropped_low_score",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPosting {
    pub posting: Posting,
    pub scores: RubricScores,
    pub status: PostingStatus,
    pub guidance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_requirements: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub input: usize,
    pub filtered_out: usize,
    pub assessment_failed: usize,
    pub retained: usize,
    pub dropped_low_score: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub report: FilterReport,
    pub counts: StatusCounts,
    /// Every posting that reached assessment, in filter-chain order.
    pub postings: Vec<ScoredPosting>,
}

impl PipelineOutcome {
    pub fn retained(&self) -> impl Iterator<Item = &ScoredPosting> {
        self.postings
            .iter()
            .filter(|p| p.status == PostingStatus::Retained)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

pub async fn run_pipeline(
    gateway: &ReasoningGateway,
    ctx: &PipelineContext,
    postings: Vec<Posting>,
) -> PipelineOutcome {
    let input = postings.len();
    info!(
        "Pipeline run {} started: {} postings, {} known URLs",
        ctx.run_id,
        input,
        ctx.known_urls.len()
    );

    let chain = FilterChain::standard(&ctx.profile, &ctx.config.filters, &ctx.known_urls);
    let (mut survivors, report) = chain.run(postings);

    if let Some(max) = ctx.config.max_postings {
        if survivors.len() > max {
            info!("Capping {} surviving postings at {}", survivors.len(), max);
            survivors.truncate(max);
        }
    }

    let concurrency = ctx.config.max_concurrency.max(1);
    let scored: Vec<ScoredPosting> = stream::iter(survivors)
        .map(|posting| process_posting(gateway, ctx, posting))
        .buffered(concurrency)
        .collect()
        .await;

    let mut counts = StatusCounts {
        input,
        filtered_out: input - scored.len(),
        ..Default::default()
    };
    for p in &scored {
        match p.status {
            PostingStatus::AssessmentFailed => counts.assessment_failed += 1,
            PostingStatus::Retained => counts.retained += 1,
            PostingStatus::DroppedLowScore => counts.dropped_low_score += 1,
        }
    }

    info!(
        "Pipeline run {} finished: {} in, {} filtered out, {} failed, {} retained, {} dropped",
        ctx.run_id,
        counts.input,
        counts.filtered_out,
        counts.assessment_failed,
        counts.retained,
        counts.dropped_low_score
    );

    PipelineOutcome {
        run_id: ctx.run_id,
        report,
        counts,
        postings: scored,
    }
}

async fn process_posting(
    gateway: &ReasoningGateway,
    ctx: &PipelineContext,
    posting: Posting,
) -> ScoredPosting {
    let scorer = &ctx.config.scorer;
    let evaluation = scorer.evaluate(gateway, &ctx.profile, &posting).await;

    let status = match evaluation.kind {
        EvaluationKind::Failed => PostingStatus::AssessmentFailed,
        EvaluationKind::Vetoed { .. } => PostingStatus::DroppedLowScore,
        EvaluationKind::Assessed if scorer.is_retained(&evaluation.scores) => {
            PostingStatus::Retained
        }
        EvaluationKind::Assessed => PostingStatus::DroppedLowScore,
    };

    let enrichment = if status == PostingStatus::Retained && ctx.config.enrich {
        enrich(gateway, &ctx.profile, &posting).await
    } else {
        Enrichment::default()
    };

    ScoredPosting {
        posting,
        scores: evaluation.scores,
        status,
        guidance: evaluation.guidance,
        short_summary: enrichment.short_summary,
        hard_requirements: enrichment.hard_requirements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::tests::posting;
    use crate::llm_client::scripted::ScriptedProvider;
    use crate::llm_client::RetryPolicy;
    use crate::scoring::Assessment;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    fn assessment_json(value: bool, marker: &str) -> Value {
        let mut a = Assessment::uniform(value);
        a.guidance_text = format!("guidance for {marker}");
        serde_json::to_value(a).unwrap()
    }

    fn context(config: PipelineConfig) -> PipelineContext {
        let profile = CandidateProfile {
            resume: "Backend engineer".to_string(),
            stop_terms: vec!["Director".to_string()],
            ..Default::default()
        };
        PipelineContext::new(profile, config, &[])
    }

    fn no_enrichment() -> PipelineConfig {
        PipelineConfig {
            enrich: false,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_is_a_valid_run() {
        let provider = Arc::new(ScriptedProvider::new());
        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());
        let outcome = run_pipeline(&gateway, &context(PipelineConfig::default()), Vec::new()).await;

        assert!(outcome.postings.is_empty());
        assert_eq!(outcome.counts, StatusCounts::default());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_isolated_to_one_posting() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.answer_when("alpha", Duration::ZERO, assessment_json(true, "alpha"));
        provider.answer_when("gamma", Duration::ZERO, assessment_json(false, "gamma"));
        // "bravo" has no scripted answer, so every attempt fails.

        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());
        let batch = vec![
            posting("https://x.com/a", "Engineer alpha", "Acme", "alpha payments ledgers"),
            posting("https://x.com/b", "Engineer bravo", "Initech", "bravo printers staplers"),
            posting("https://x.com/c", "Engineer gamma", "Globex", "gamma volcano lairs"),
        ];
        let outcome = run_pipeline(&gateway, &context(no_enrichment()), batch).await;

        let statuses: Vec<PostingStatus> = outcome.postings.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                PostingStatus::Retained,
                PostingStatus::AssessmentFailed,
                PostingStatus::DroppedLowScore,
            ]
        );
        assert_eq!(outcome.postings[0].guidance, "guidance for alpha");
        assert_eq!(
            outcome.postings[1].guidance,
            crate::scoring::assessment::FALLBACK_GUIDANCE
        );
        assert_eq!(outcome.counts.retained, 1);
        assert_eq!(outcome.counts.assessment_failed, 1);
        assert_eq!(outcome.counts.dropped_low_score, 1);
        assert_eq!(outcome.retained().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vetoed_posting_is_dropped_without_a_call() {
        let provider = Arc::new(ScriptedProvider::new());
        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());

        // Stop terms are normally removed by the chain; run the posting straight through.
        let ctx = context(no_enrichment());
        let scored = process_posting(
            &gateway,
            &ctx,
            Posting::new("https://x.com/d", "Director of Platform"),
        )
        .await;

        assert_eq!(scored.status, PostingStatus::DroppedLowScore);
        assert_eq!(scored.scores.overall_score, 0);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_is_preserved_under_concurrency() {
        let provider = Arc::new(ScriptedProvider::new());
        // Earlier postings answer slower than later ones.
        provider.answer_when("alpha", Duration::from_secs(3), assessment_json(true, "alpha"));
        provider.answer_when("bravo", Duration::from_secs(2), assessment_json(true, "bravo"));
        provider.answer_when("gamma", Duration::from_secs(1), assessment_json(true, "gamma"));

        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());
        let batch = vec![
            posting("https://x.com/a", "Engineer alpha", "Acme", "alpha payments ledgers"),
            posting("https://x.com/b", "Engineer bravo", "Initech", "bravo printers staplers"),
            posting("https://x.com/c", "Engineer gamma", "Globex", "gamma volcano lairs"),
        ];
        let config = PipelineConfig {
            max_concurrency: 3,
            ..no_enrichment()
        };
        let outcome = run_pipeline(&gateway, &context(config), batch).await;

        let guidance: Vec<&str> = outcome.postings.iter().map(|p| p.guidance.as_str()).collect();
        assert_eq!(
            guidance,
            vec!["guidance for alpha", "guidance for bravo", "guidance for gamma"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retained_postings_are_enriched() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_structured(Ok(assessment_json(true, "alpha")));
        provider.push_text(Ok("Pay was not specified.".to_string()));
        provider.push_text(Ok("- 3 years of Go".to_string()));

        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());
        let batch = vec![posting(
            "https://x.com/a",
            "Engineer alpha",
            "Acme",
            "alpha payments ledgers",
        )];
        let outcome = run_pipeline(&gateway, &context(PipelineConfig::default()), batch).await;

        let scored = &outcome.postings[0];
        assert_eq!(scored.status, PostingStatus::Retained);
        assert_eq!(scored.short_summary.as_deref(), Some("Pay was not specified."));
        assert_eq!(scored.hard_requirements.as_deref(), Some("- 3 years of Go"));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_postings_caps_after_filtering() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.answer_when("Engineer", Duration::ZERO, assessment_json(false, "any"));

        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());
        let batch = vec![
            posting("https://x.com/a", "Engineer alpha", "Acme", "alpha payments ledgers"),
            posting("https://x.com/b", "Engineer bravo", "Initech", "bravo printers staplers"),
            posting("https://x.com/c", "Engineer gamma", "Globex", "gamma volcano lairs"),
        ];
        let config = PipelineConfig {
            max_postings: Some(2),
            ..no_enrichment()
        };
        let outcome = run_pipeline(&gateway, &context(config), batch).await;

        assert_eq!(outcome.postings.len(), 2);
        assert_eq!(outcome.counts.filtered_out, 1);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_balance_against_the_input() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.answer_when("alpha", Duration::ZERO, assessment_json(true, "alpha"));

        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());
        let batch = vec![
            posting("https://x.com/a", "Engineer alpha", "Acme", "alpha payments ledgers"),
            posting("https://x.com/a", "Engineer alpha", "Acme", "alpha payments ledgers"),
            posting("https://x.com/d", "Director bravo", "Initech", "bravo printers staplers"),
            posting("https://x.com/c", "Engineer gamma", "Globex", "gamma volcano lairs"),
        ];
        let outcome = run_pipeline(&gateway, &context(no_enrichment()), batch).await;

        let counts = &outcome.counts;
        assert_eq!(counts.input, 4);
        assert_eq!(counts.filtered_out, 2);
        assert_eq!(outcome.postings.len(), 2);
        let assessed = counts.assessment_failed + counts.retained + counts.dropped_low_score;
        assert_eq!(counts.filtered_out + assessed, counts.input);
        assert_eq!(
            serde_json::to_value(PostingStatus::AssessmentFailed).unwrap(),
            Value::String(PostingStatus::AssessmentFailed.as_str().to_string())
        );
    }
}
