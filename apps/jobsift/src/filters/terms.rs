use tracing::debug;

use crate::filters::FilterStage;
use crate::models::posting::Posting;
use crate::similarity::SimilarityIndex;
use crate::text::{contains_term, find_term};

/// Drops postings whose title contains any disqualifying term as a whole word.
pub struct StopTermExclusion {
    terms: Vec<String>,
}

impl StopTermExclusion {
    pub fn new(terms: Vec<String>) -> Self {
        Self { terms }
    }
}

impl FilterStage for StopTermExclusion {
    fn name(&self) -> &'static str {
        "stop_terms"
    }

    fn skip_reason(&self, _batch: &[Posting]) -> Option<String> {
        self.terms
            .is_empty()
            .then(|| "no stop terms configured".to_string())
    }

    fn apply(&self, batch: Vec<Posting>) -> Vec<Posting> {
        batch
            .into_iter()
            .filter(|p| match find_term(&p.title, &self.terms) {
                Some(term) => {
                    debug!("Dropping '{}': stop term '{}'", p.title, term);
                    false
                }
                None => true,
            })
            .collect()
    }
}

/// Keeps only postings whose title contains at least one go term. With a fuzzy threshold set,
/// a title close enough to one of the preferred titles also passes.
pub struct GoTermInclusion {
    terms: Vec<String>,
    preferred_titles: Vec<String>,
    fuzzy_threshold: Option<f64>,
    index: SimilarityIndex,
}

impl GoTermInclusion {
    pub fn new(
        terms: Vec<String>,
        preferred_titles: Vec<String>,
        fuzzy_threshold: Option<f64>,
    ) -> Self {
        Self {
            terms,
            preferred_titles,
            fuzzy_threshold,
            index: SimilarityIndex::with_bigrams(),
        }
    }

    fn fuzzy_enabled(&self) -> bool {
        self.fuzzy_threshold.is_some() && !self.preferred_titles.is_empty()
    }

    fn passes(&self, title: &str) -> bool {
        if self.terms.iter().any(|t| contains_term(title, t)) {
            return true;
        }
        match self.fuzzy_threshold {
            Some(threshold) if !self.preferred_titles.is_empty() => self
                .index
                .best_match(title, &self.preferred_titles, threshold)
                .is_some(),
            _ => false,
        }
    }
}

impl FilterStage for GoTermInclusion {
    fn name(&self) -> &'static str {
        "go_terms"
    }

    fn skip_reason(&self, _batch: &[Posting]) -> Option<String> {
        (self.terms.is_empty() && !self.fuzzy_enabled())
            .then(|| "no go terms configured".to_string())
    }

    fn apply(&self, batch: Vec<Posting>) -> Vec<Posting> {
        batch.into_iter().filter(|p| self.passes(&p.title)).collect()
    }
}
