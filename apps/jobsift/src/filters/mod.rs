//! Filter Chain: ordered, independently testable stages that shrink a scraped batch down to
//! the postings worth sending to the reasoning service.
//!
//! Every stage takes ownership of the batch and hands back the survivors. A stage can never
//! re-admit a posting an earlier stage dropped because it only ever sees the survivors.

pub mod compensation;
pub mod content;
pub mod dedup;
pub mod terms;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::posting::{KnownUrls, Posting};
use crate::models::profile::CandidateProfile;
use crate::similarity::DEFAULT_DEDUP_THRESHOLD;

pub use compensation::CompensationFloor;
pub use content::{ColumnProjection, DescriptionLengthFloor, KnownUrlExclusion};
pub use dedup::{NearDuplicateRemoval, UrlDeduplication};
pub use terms::{GoTermInclusion, StopTermExclusion};

pub const DEFAULT_MIN_DESCRIPTION_CHARS: usize = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Stage trait
// ────────────────────────────────────────────────────────────────────────────

pub trait FilterStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns a reason when the stage has nothing to do for this batch. The chain logs the
    /// reason and passes the batch through untouched.
    fn skip_reason(&self, _batch: &[Posting]) -> Option<String> {
        None
    }

    fn apply(&self, batch: Vec<Posting>) -> Vec<Posting>;
}

// ────────────────────────────────────────────────────────────────────────────
// Settings and report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub min_description_chars: usize,
    pub dedup_threshold: f64,
    /// Enables fuzzy matching of titles against the profile's preferred titles.
    pub title_match_threshold: Option<f64>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_description_chars: DEFAULT_MIN_DESCRIPTION_CHARS,
            dedup_threshold: DEFAULT_DEDUP_THRESHOLD,
            title_match_threshold: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub input: usize,
    pub output: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl StageReport {
    pub fn dropped(&self) -> usize {
        self.input - self.output
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    pub stages: Vec<StageReport>,
}

impl FilterReport {
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Chain
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FilterChain {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: impl FilterStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// The eight-stage chain: seen-before, projection, length floor, URL dedup, near-duplicate
    /// removal, stop terms, go terms, compensation floor.
    pub fn standard(
        profile: &CandidateProfile,
        settings: &FilterSettings,
        known: &KnownUrls,
    ) -> Self {
        Self::new()
            .with_stage(KnownUrlExclusion::new(known.clone()))
            .with_stage(ColumnProjection)
            .with_stage(DescriptionLengthFloor::new(settings.min_description_chars))
            .with_stage(UrlDeduplication)
            .with_stage(NearDuplicateRemoval::new(settings.dedup_threshold))
            .with_stage(StopTermExclusion::new(profile.stop_terms.clone()))
            .with_stage(GoTermInclusion::new(
                profile.go_terms.clone(),
                profile.preferred_titles.clone(),
                settings.title_match_threshold,
            ))
            .with_stage(CompensationFloor::new(profile.min_salary))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, mut batch: Vec<Posting>) -> (Vec<Posting>, FilterReport) {
        let mut report = FilterReport::default();

        for stage in &self.stages {
            let input = batch.len();
            let skipped = if batch.is_empty() {
                Some("empty batch".to_string())
            } else {
                stage.skip_reason(&batch)
            };

            match &skipped {
                Some(reason) => info!("Filter stage '{}' skipped: {}", stage.name(), reason),
                None => {
                    batch = stage.apply(batch);
                    info!(
                        "Filter stage '{}': {} -> {} postings",
                        stage.name(),
                        input,
                        batch.len()
                    );
                }
            }

            report.stages.push(StageReport {
                stage: stage.name().to_string(),
                input,
                output: batch.len(),
                skipped,
            });
        }

        (batch, report)
    }
}
