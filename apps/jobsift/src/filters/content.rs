//! Stages that look at a single posting in isolation: seen-before exclusion, column projection
//! and the description length floor.

use crate::filters::FilterStage;
use crate::models::posting::{KnownUrls, Posting};

/// Drops postings whose canonical URL the caller already knows about.
pub struct KnownUrlExclusion {
    known: KnownUrls,
}

impl KnownUrlExclusion {
    pub fn new(known: KnownUrls) -> Self {
        Self { known }
    }
}

impl FilterStage for KnownUrlExclusion {
    fn name(&self) -> &'static str {
        "seen_before"
    }

    fn skip_reason(&self, _batch: &[Posting]) -> Option<String> {
        self.known
            .is_empty()
            .then(|| "no known URLs supplied".to_string())
    }

    fn apply(&self, batch: Vec<Posting>) -> Vec<Posting> {
        batch
            .into_iter()
            .filter(|p| !self.known.contains(&p.url))
            .collect()
    }
}

/// Discards scraped columns the pipeline has no use for. Never drops a posting.
pub struct ColumnProjection;

impl FilterStage for ColumnProjection {
    fn name(&self) -> &'static str {
        "column_projection"
    }

    fn apply(&self, mut batch: Vec<Posting>) -> Vec<Posting> {
        for posting in &mut batch {
            posting.extra.clear();
        }
        batch
    }
}

/// Drops postings whose whitespace-normalised description is shorter than `min_chars`.
pub struct DescriptionLengthFloor {
    min_chars: usize,
}

impl DescriptionLengthFloor {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl FilterStage for DescriptionLengthFloor {
    fn name(&self) -> &'static str {
        "length_floor"
    }

    fn skip_reason(&self, _batch: &[Posting]) -> Option<String> {
        (self.min_chars == 0).then(|| "floor is zero".to_string())
    }

    fn apply(&self, batch: Vec<Posting>) -> Vec<Posting> {
        batch
            .into_iter()
            .filter(|p| p.normalized_description().chars().count() >= self.min_chars)
            .collect()
    }
}
