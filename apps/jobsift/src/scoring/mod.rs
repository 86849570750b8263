//! Rubric Scorer: turns the reasoning service's judgement of one posting into deterministic
//! numbers.
//!
//! Two assessment modes:
//! - `Structured` (default): ask for an [`Assessment`] (sixteen yes/no facts) and apply the
//!   weighted rubric.
//! - `RatingBlock`: ask a free-form question answered in the rating template and parse it
//!   strictly.
//!
//! A title containing a stop term is vetoed before any call is made.

pub mod assessment;
pub mod prompts;
pub mod rating_block;
pub mod rubric;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::{ReasoningGateway, Structured};
use crate::models::posting::Posting;
use crate::models::profile::CandidateProfile;
use crate::text::find_term;

pub use assessment::Assessment;
pub use rating_block::parse_rating_block;
pub use rubric::{RubricScores, DEFAULT_RETENTION_THRESHOLD};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentMode {
    #[default]
    Structured,
    RatingBlock,
}

impl std::str::FromStr for AssessmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(AssessmentMode::Structured),
            "rating_block" => Ok(AssessmentMode::RatingBlock),
            other => Err(format!(
                "unknown assessment mode '{other}' (expected 'structured' or 'rating_block')"
            )),
        }
    }
}

/// How the scores for one posting came about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationKind {
    Assessed,
    /// The reasoning service failed or answered in the wrong shape. Scores are zero.
    Failed,
    /// A stop term in the title. No call was made.
    Vetoed { term: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub kind: EvaluationKind,
    pub scores: RubricScores,
    pub guidance: String,
    pub assessment: Option<Assessment>,
}

impl Evaluation {
    fn failed(assessment: Option<Assessment>) -> Self {
        let fallback = assessment::FALLBACK_GUIDANCE.to_string();
        Self {
            kind: EvaluationKind::Failed,
            scores: RubricScores::zero(),
            guidance: assessment
                .as_ref()
                .map(|a| a.guidance_text.clone())
                .unwrap_or(fallback),
            assessment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricScorer {
    pub mode: AssessmentMode,
    /// Postings must score strictly above this to be retained.
    pub retention_threshold: u32,
}

impl Default for RubricScorer {
    fn default() -> Self {
        Self {
            mode: AssessmentMode::Structured,
            retention_threshold: DEFAULT_RETENTION_THRESHOLD,
        }
    }
}

impl RubricScorer {
    pub fn new(mode: AssessmentMode, retention_threshold: u32) -> Self {
        Self {
            mode,
            retention_threshold,
        }
    }

    pub fn is_retained(&self, scores: &RubricScores) -> bool {
        scores.overall_score > self.retention_threshold
    }

    /// The stop term that vetoes this title, if any.
    pub fn veto<'a>(&self, posting: &Posting, profile: &'a CandidateProfile) -> Option<&'a str> {
        find_term(&posting.title, &profile.stop_terms)
    }

    pub async fn evaluate(
        &self,
        gateway: &ReasoningGateway,
        profile: &CandidateProfile,
        posting: &Posting,
    ) -> Evaluation {
        if let Some(term) = self.veto(posting, profile) {
            info!("Vetoed '{}' at {}: stop term '{}'", posting.title, posting.employer, term);
            return Evaluation {
                kind: EvaluationKind::Vetoed {
                    term: term.to_string(),
                },
                scores: RubricScores::zero(),
                guidance: format!("Not evaluated: the title contains the excluded term '{term}'."),
                assessment: None,
            };
        }

        match self.mode {
            AssessmentMode::Structured => self.evaluate_structured(gateway, profile, posting).await,
            AssessmentMode::RatingBlock => {
                self.evaluate_rating_block(gateway, profile, posting).await
            }
        }
    }

    async fn evaluate_structured(
        &self,
        gateway: &ReasoningGateway,
        profile: &CandidateProfile,
        posting: &Posting,
    ) -> Evaluation {
        let prompt = prompts::evaluation_prompt(posting, profile);
        match gateway
            .structured::<Assessment>(prompts::EVALUATION_SYSTEM, &prompt)
            .await
        {
            Structured::Valid(assessment) => {
                let scores = RubricScores::from_assessment(&assessment);
                info!(
                    "Scored '{}' at {}: overall {}",
                    posting.title, posting.employer, scores.overall_score
                );
                Evaluation {
                    kind: EvaluationKind::Assessed,
                    scores,
                    guidance: assessment.guidance_text.clone(),
                    assessment: Some(assessment),
                }
            }
            Structured::Fallback(assessment) => {
                warn!(
                    "Assessment failed for '{}' at {}",
                    posting.title, posting.employer
                );
                Evaluation::failed(Some(assessment))
            }
        }
    }

    async fn evaluate_rating_block(
        &self,
        gateway: &ReasoningGateway,
        profile: &CandidateProfile,
        posting: &Posting,
    ) -> Evaluation {
        let prompt = prompts::rating_block_prompt(posting, profile);
        let Some(text) = gateway.complete(prompts::RATING_SYSTEM, &prompt).await else {
            warn!("No ratings returned for '{}' at {}", posting.title, posting.employer);
            return Evaluation::failed(None);
        };

        match parse_rating_block(&text) {
            Ok(block) => {
                let scores = block.scores();
                info!(
                    "Rated '{}' at {}: overall {} (model reported {})",
                    posting.title, posting.employer, scores.overall_score, block.reported_overall
                );
                Evaluation {
                    kind: EvaluationKind::Assessed,
                    scores,
                    guidance: block.explanation,
                    assessment: None,
                }
            }
            Err(e) => {
                warn!(
                    "Unparseable ratings for '{}' at {}: {e}",
                    posting.title, posting.employer
                );
                Evaluation::failed(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::scripted::ScriptedProvider;
    use crate::llm_client::{RetryPolicy, StructuredOutput};
    use std::sync::Arc;

    fn gateway(provider: &Arc<ScriptedProvider>) -> ReasoningGateway {
        ReasoningGateway::new(provider.clone(), RetryPolicy::default())
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            stop_terms: vec!["Director".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_term_veto_makes_no_calls() {
        let provider = Arc::new(ScriptedProvider::new());
        let posting = Posting::new("https://x.com/1", "Director of Engineering");

        let eval = RubricScorer::default()
            .evaluate(&gateway(&provider), &profile(), &posting)
            .await;

        assert_eq!(
            eval.kind,
            EvaluationKind::Vetoed {
                term: "Director".to_string()
            }
        );
        assert_eq!(eval.scores.overall_score, 0);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_structured_assessment_scores_rubric() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut assessment = Assessment::uniform(true);
        assessment.guidance_text = "You may like this job.".to_string();
        provider.push_structured(Ok(serde_json::to_value(&assessment).unwrap()));

        let posting = Posting::new("https://x.com/1", "Data Engineer");
        let eval = RubricScorer::default()
            .evaluate(&gateway(&provider), &profile(), &posting)
            .await;

        assert_eq!(eval.kind, EvaluationKind::Assessed);
        assert_eq!(eval.scores.overall_score, 100);
        assert_eq!(eval.guidance, "You may like this job.");
        assert!(RubricScorer::default().is_retained(&eval.scores));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_structured_call_gives_fallback_assessment() {
        let provider = Arc::new(ScriptedProvider::new());
        let posting = Posting::new("https://x.com/1", "Data Engineer");

        let eval = RubricScorer::default()
            .evaluate(&gateway(&provider), &profile(), &posting)
            .await;

        assert_eq!(eval.kind, EvaluationKind::Failed);
        assert_eq!(eval.scores, RubricScores::zero());
        assert_eq!(eval.guidance, assessment::FALLBACK_GUIDANCE);
        assert_eq!(eval.assessment, Some(Assessment::fallback()));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rating_block_mode_parses_free_form_answer() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text(Ok("- Candidate desire match: 80\n\
             - Candidate experience match: 60\n\
             - Hiring manager skill match: 70\n\
             - Hiring manager experience match: 50\n\
             - Final overall match assessment: 75\n\
             - Explanation of ratings: Solid overlap."
            .to_string()));

        let scorer = RubricScorer::new(AssessmentMode::RatingBlock, 50);
        let posting = Posting::new("https://x.com/1", "Data Engineer");
        let eval = scorer.evaluate(&gateway(&provider), &profile(), &posting).await;

        assert_eq!(eval.kind, EvaluationKind::Assessed);
        assert_eq!(eval.scores.overall_score, 65);
        assert_eq!(eval.guidance, "Solid overlap.");
        assert!(scorer.is_retained(&eval.scores));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rating_block_shape_mismatch_fails_without_retry() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text(Ok("I think this is a 7/10 match.".to_string()));

        let scorer = RubricScorer::new(AssessmentMode::RatingBlock, 50);
        let posting = Posting::new("https://x.com/1", "Data Engineer");
        let eval = scorer.evaluate(&gateway(&provider), &profile(), &posting).await;

        assert_eq!(eval.kind, EvaluationKind::Failed);
        assert_eq!(eval.scores.overall_score, 0);
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_retention_is_strictly_above_threshold() {
        let scorer = RubricScorer::default();
        assert!(!scorer.is_retained(&RubricScores::from_categories([50, 50, 50, 50])));
        assert!(scorer.is_retained(&RubricScores::from_categories([51, 51, 51, 51])));
    }

    #[test]
    fn test_assessment_mode_from_str() {
        assert_eq!("rating_block".parse::<AssessmentMode>(), Ok(AssessmentMode::RatingBlock));
        assert_eq!(" Structured ".parse::<AssessmentMode>(), Ok(AssessmentMode::Structured));
        assert!("freeform".parse::<AssessmentMode>().is_err());
    }
}
