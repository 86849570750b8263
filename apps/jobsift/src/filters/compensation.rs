use crate::filters::FilterStage;
use crate::models::posting::Posting;

/// Drops postings whose stated maximum pay is below the candidate's minimum. Postings that
/// state no maximum are kept. Amounts are compared as reported, without converting intervals.
pub struct CompensationFloor {
    min_salary: Option<f64>,
}

impl CompensationFloor {
    pub fn new(min_salary: Option<f64>) -> Self {
        Self { min_salary }
    }
}

impl FilterStage for CompensationFloor {
    fn name(&self) -> &'static str {
        "compensation_floor"
    }

    fn skip_reason(&self, batch: &[Posting]) -> Option<String> {
        if self.min_salary.is_none() {
            return Some("candidate has no minimum compensation".to_string());
        }
        if !batch.iter().any(Posting::has_compensation) {
            return Some("no posting carries compensation data".to_string());
        }
        None
    }

    fn apply(&self, batch: Vec<Posting>) -> Vec<Posting> {
        let Some(floor) = self.min_salary else {
            return batch;
        };
        batch
            .into_iter()
            .filter(|p| p.max_amount.map_or(true, |max| max >= floor))
            .collect()
    }
}
