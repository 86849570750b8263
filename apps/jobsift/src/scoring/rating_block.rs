//! Rating Block: strict parser for the free-form rating template.
//!
//! Expected shape, one item per line:
//!
//! ```text
//! - Candidate desire match: 85
//! - Candidate experience match: 70
//! - Hiring manager skill match: 65
//! - Hiring manager experience match: 60
//! - Final overall match assessment: 72
//! - Explanation of ratings: The role lines up with ...
//! ```
//!
//! Anything that deviates is a [`RatingParseError`]; there is no best-effort recovery.

use thiserror::Error;

use crate::scoring::rubric::RubricScores;

pub const RATING_LABELS: [&str; 5] = [
    "Candidate desire match",
    "Candidate experience match",
    "Hiring manager skill match",
    "Hiring manager experience match",
    "Final overall match assessment",
];
pub const EXPLANATION_LABEL: &str = "Explanation of ratings";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatingParseError {
    #[error("rating block has {found} non-empty lines, expected at least 6")]
    TooFewLines { found: usize },

    #[error("line {line} is not 'label: value': {text}")]
    MalformedLine { line: usize, text: String },

    #[error("line {line} has label '{found}', expected '{expected}'")]
    UnexpectedLabel {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("line {line} has a non-integer score: {value}")]
    InvalidScore { line: usize, value: String },

    #[error("rating block has no 'Explanation of ratings:' section")]
    MissingExplanation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingBlock {
    /// Desire, experience, skill requirements, experience requirements. Clamped to [0, 100].
    pub categories: [u32; 4],
    /// The model's own overall figure. Logged only; the overall score is recomputed.
    pub reported_overall: u32,
    pub explanation: String,
}

impl RatingBlock {
    pub fn scores(&self) -> RubricScores {
        RubricScores::from_categories(self.categories)
    }
}

pub fn parse_rating_block(text: &str) -> Result<RatingBlock, RatingParseError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 6 {
        return Err(RatingParseError::TooFewLines { found: lines.len() });
    }

    let mut values = [0u32; 5];
    for (idx, &expected) in RATING_LABELS.iter().enumerate() {
        let line_no = idx + 1;
        let line = lines[idx].trim_start_matches(['-', '*', '•']).trim();
        let Some((label, value)) = line.split_once(':') else {
            return Err(RatingParseError::MalformedLine {
                line: line_no,
                text: lines[idx].to_string(),
            });
        };

        let label = label.trim();
        if !label.eq_ignore_ascii_case(expected) {
            return Err(RatingParseError::UnexpectedLabel {
                line: line_no,
                expected,
                found: label.to_string(),
            });
        }

        let value = value.trim();
        let parsed: i64 = value.parse().map_err(|_| RatingParseError::InvalidScore {
            line: line_no,
            value: value.to_string(),
        })?;
        values[idx] = parsed.clamp(0, 100) as u32;
    }

    let explanation_line = lines[5].trim_start_matches(['-', '*', '•']).trim();
    let first = match explanation_line.split_once(':') {
        Some((label, rest)) if label.trim().eq_ignore_ascii_case(EXPLANATION_LABEL) => rest.trim(),
        _ => return Err(RatingParseError::MissingExplanation),
    };
    let mut explanation = first.to_string();
    for line in &lines[6..] {
        explanation.push('\n');
        explanation.push_str(line);
    }
    let explanation = explanation.trim().to_string();

    Ok(RatingBlock {
        categories: [values[0], values[1], values[2], values[3]],
        reported_overall: values[4],
        explanation,
    })
}
