//! Rubric: fixed weights that turn sixteen yes/no facts into four category scores and one
//! overall score. Pure integer arithmetic, so the same facts always give the same numbers.
//!
//! Each category weighs its four facts {3, 3, 2, 2}:
//! `category = Σ(weights of true facts) × 100 / Σ(all weights)` with floor division.
//! The overall score is the floor of the unweighted mean of the four categories.

use serde::{Deserialize, Serialize};

use crate::scoring::assessment::Assessment;

pub const FACT_WEIGHTS: [u32; 4] = [3, 3, 2, 2];
pub const DEFAULT_RETENTION_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricScores {
    pub desire_score: u32,
    pub experience_score: u32,
    pub meets_requirements_score: u32,
    pub meets_experience_score: u32,
    pub overall_score: u32,
}

impl RubricScores {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_assessment(assessment: &Assessment) -> Self {
        Self::from_categories([
            category_score(assessment.desire_facts()),
            category_score(assessment.experience_facts()),
            category_score(assessment.requirements_facts()),
            category_score(assessment.experience_requirements_facts()),
        ])
    }

    /// Builds scores from four category values in [0, 100]; the overall is recomputed.
    pub fn from_categories(categories: [u32; 4]) -> Self {
        let categories = categories.map(|c| c.min(100));
        Self {
            desire_score: categories[0],
            experience_score: categories[1],
            meets_requirements_score: categories[2],
            meets_experience_score: categories[3],
            overall_score: categories.iter().sum::<u32>() / 4,
        }
    }
}

pub fn category_score(facts: [bool; 4]) -> u32 {
    let total: u32 = FACT_WEIGHTS.iter().sum();
    let earned: u32 = facts
        .iter()
        .zip(FACT_WEIGHTS)
        .filter(|(fact, _)| **fact)
        .map(|(_, weight)| weight)
        .sum();
    earned * 100 / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_true_scores_one_hundred() {
        let scores = RubricScores::from_assessment(&Assessment::uniform(true));
        assert_eq!(
            scores,
            RubricScores {
                desire_score: 100,
                experience_score: 100,
                meets_requirements_score: 100,
                meets_experience_score: 100,
                overall_score: 100,
            }
        );
    }

    #[test]
    fn test_all_false_scores_zero() {
        let scores = RubricScores::from_assessment(&Assessment::uniform(false));
        assert_eq!(scores, RubricScores::zero());
    }

    #[test]
    fn test_category_weights_and_floor_division() {
        assert_eq!(category_score([true, false, false, false]), 30);
        assert_eq!(category_score([false, false, true, false]), 20);
        assert_eq!(category_score([true, true, false, false]), 60);
        assert_eq!(category_score([false, true, true, true]), 70);
    }

    #[test]
    fn test_overall_is_floor_of_mean() {
        let scores = RubricScores::from_categories([100, 70, 60, 20]);
        assert_eq!(scores.overall_score, 62);
        let scores = RubricScores::from_categories([30, 30, 30, 31]);
        assert_eq!(scores.overall_score, 30);
    }

    #[test]
    fn test_scoring_is_deterministic_and_bounded() {
        let mut assessment = Assessment::uniform(false);
        assessment.title_matches_preferred = true;
        assessment.meets_years_required = true;
        assessment.seniority_matches = true;

        let first = RubricScores::from_assessment(&assessment);
        for _ in 0..10 {
            assert_eq!(RubricScores::from_assessment(&assessment), first);
        }
        assert!(first.overall_score <= 100);
        assert_eq!(first.desire_score, 30);
        assert_eq!(first.experience_score, 30);
        assert_eq!(first.meets_experience_score, 30);
        assert_eq!(first.overall_score, 22);
    }

    #[test]
    fn test_from_categories_clamps_out_of_range_values() {
        let scores = RubricScores::from_categories([250, 100, 100, 100]);
        assert_eq!(scores.desire_score, 100);
        assert_eq!(scores.overall_score, 100);
    }
}
