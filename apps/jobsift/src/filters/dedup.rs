use std::collections::HashSet;

use crate::filters::FilterStage;
use crate::models::posting::Posting;
use crate::similarity::SimilarityIndex;

/// Keeps the first posting seen for each canonical URL.
pub struct UrlDeduplication;

impl FilterStage for UrlDeduplication {
    fn name(&self) -> &'static str {
        "url_dedup"
    }

    fn apply(&self, batch: Vec<Posting>) -> Vec<Posting> {
        let mut seen = HashSet::with_capacity(batch.len());
        batch
            .into_iter()
            .filter(|p| seen.insert(p.canonical_url()))
            .collect()
    }
}

/// Drops postings whose title, employer and description are nearly identical to an earlier
/// posting's. Catches the same job re-posted under a different URL.
pub struct NearDuplicateRemoval {
    index: SimilarityIndex,
    threshold: f64,
}

impl NearDuplicateRemoval {
    pub fn new(threshold: f64) -> Self {
        Self {
            index: SimilarityIndex::default(),
            threshold,
        }
    }
}

impl FilterStage for NearDuplicateRemoval {
    fn name(&self) -> &'static str {
        "near_duplicate"
    }

    fn skip_reason(&self, batch: &[Posting]) -> Option<String> {
        (batch.len() < 2).then(|| "fewer than two postings".to_string())
    }

    fn apply(&self, batch: Vec<Posting>) -> Vec<Posting> {
        let texts: Vec<String> = batch.iter().map(Posting::dedup_text).collect();
        let keep: HashSet<usize> = self
            .index
            .first_occurrences(&texts, self.threshold)
            .into_iter()
            .collect();

        batch
            .into_iter()
            .enumerate()
            .filter_map(|(i, p)| keep.contains(&i).then_some(p))
            .collect()
    }
}
