//! Resume-to-posting comparison: TF-IDF cosine similarity between the resume and each posting,
//! plus the shared and missing keywords behind the score.
//!
//! Every comparison is a fresh two-document index (resume, posting), so a posting's score does
//! not depend on the rest of the batch.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::posting::Posting;
use crate::similarity::{dot, SimilarityIndex};
use crate::text::tokenize;

/// Job terms weighing more than this and absent from the resume are reported as missing.
pub const MISSING_TERM_FLOOR: f64 = 0.1;

/// Terms reported per list.
pub const TERMS_PER_LIST: usize = 5;

pub const DEFAULT_TOP_N: usize = 10;

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "you", "your", "yours", "yourself", "yourselves",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeMatch {
    pub similarity: f64,
    /// Terms both sides share, strongest first.
    pub top_matches: Vec<String>,
    /// Heavy job terms the resume never mentions, strongest first.
    pub top_missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPosting {
    /// Position in the input batch.
    pub index: usize,
    pub job_url: String,
    pub title: String,
    #[serde(flatten)]
    pub fit: ResumeMatch,
}

/// Lower-cased words with digits removed, dropping English stop words and anything shorter
/// than two characters.
pub fn keywords(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .map(|token| token.chars().filter(|c| !c.is_ascii_digit()).collect::<String>())
        .filter(|token| token.chars().count() >= 2 && !STOP_WORDS.contains(&token.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn compare_resume(resume: &str, title: &str, description: &str) -> ResumeMatch {
    let resume_terms = keywords(resume);
    let job_terms = keywords(&format!("{title} {description}"));

    let mut vectors = SimilarityIndex::with_bigrams().vectorize(&[resume_terms, job_terms]);
    let job = vectors.pop().unwrap_or_default();
    let resume = vectors.pop().unwrap_or_default();

    let shared: Vec<(&str, f64)> = job
        .iter()
        .filter_map(|(term, job_w)| resume.get(term).map(|r| (term.as_str(), r.min(*job_w))))
        .collect();
    let missing: Vec<(&str, f64)> = job
        .iter()
        .filter(|(term, w)| **w > MISSING_TERM_FLOOR && !resume.contains_key(*term))
        .map(|(term, w)| (term.as_str(), *w))
        .collect();

    ResumeMatch {
        similarity: dot(&resume, &job).clamp(0.0, 1.0),
        top_matches: strongest(shared),
        top_missing: strongest(missing),
    }
}

/// Scores every posting against the resume and returns the best `top_n`, most similar first.
/// Equal scores keep input order.
pub fn rank_postings(resume: &str, postings: &[Posting], top_n: usize) -> Vec<RankedPosting> {
    let mut ranked: Vec<RankedPosting> = postings
        .iter()
        .enumerate()
        .map(|(index, posting)| RankedPosting {
            index,
            job_url: posting.url.clone(),
            title: posting.title.clone(),
            fit: compare_resume(resume, &posting.title, &posting.description),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.fit
            .similarity
            .partial_cmp(&a.fit.similarity)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(top_n);
    ranked
}

fn strongest(mut terms: Vec<(&str, f64)>) -> Vec<String> {
    terms.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    terms
        .into_iter()
        .take(TERMS_PER_LIST)
        .map(|(term, _)| term.to_string())
        .collect()
}
