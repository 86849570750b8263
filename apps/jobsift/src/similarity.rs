//! Similarity Index: TF-IDF vectors and pairwise cosine similarity over a single batch.
//!
//! Stateless: every call builds its vocabulary from the texts it is handed. Nothing is cached
//! between batches.
//!
//! IDF is smoothed: `ln((1 + n) / (1 + df)) + 1`, so a term present in every document still
//! carries weight 1.0. Vectors are L2-normalised, which makes cosine similarity a dot product.

use std::collections::HashMap;

use crate::text::tokenize;

/// Near-duplicate threshold: "very likely the same job re-posted".
pub const DEFAULT_DEDUP_THRESHOLD: f64 = 0.9;

/// Term to L2-normalised TF-IDF weight.
pub type SparseVector = HashMap<String, f64>;

/// Dense, symmetric N×N similarity matrix with values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityIndex {
    /// Include adjacent-word bigrams alongside unigrams.
    pub bigrams: bool,
}

impl SimilarityIndex {
    pub fn with_bigrams() -> Self {
        Self { bigrams: true }
    }

    /// Computes the full pairwise similarity matrix for `texts`.
    ///
    /// The diagonal is always 1.0. A text with no extractable terms scores 0.0 against every
    /// other text.
    pub fn matrix<S: AsRef<str>>(&self, texts: &[S]) -> SimilarityMatrix {
        let vectors = self.vectorize(texts);
        let n = vectors.len();
        let mut values = vec![vec![0.0; n]; n];

        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let sim = dot(&vectors[i], &vectors[j]).clamp(0.0, 1.0);
                values[i][j] = sim;
                values[j][i] = sim;
            }
        }

        SimilarityMatrix { values }
    }

    /// Returns the indices to keep when removing near-duplicates, in original order.
    ///
    /// An item is dropped when its similarity to *any* earlier item exceeds `threshold`, whether
    /// or not that earlier item was itself kept. The relation is not transitive: with A~B, B~C and
    /// A≉C, both B and C are dropped.
    pub fn first_occurrences<S: AsRef<str>>(&self, texts: &[S], threshold: f64) -> Vec<usize> {
        if texts.is_empty() {
            return Vec::new();
        }
        let matrix = self.matrix(texts);

        (0..matrix.len())
            .filter(|&i| (0..i).all(|j| matrix.get(i, j) <= threshold))
            .collect()
    }

    /// Finds the candidate most similar to `query`, if it clears `threshold`.
    ///
    /// Ties keep the earliest candidate.
    pub fn best_match<S: AsRef<str>>(
        &self,
        query: &str,
        candidates: &[S],
        threshold: f64,
    ) -> Option<(usize, f64)> {
        if candidates.is_empty() {
            return None;
        }

        let mut texts: Vec<&str> = Vec::with_capacity(candidates.len() + 1);
        texts.push(query);
        texts.extend(candidates.iter().map(|c| c.as_ref()));
        let matrix = self.matrix(&texts);

        let mut best: Option<(usize, f64)> = None;
        for idx in 0..candidates.len() {
            let score = matrix.get(0, idx + 1);
            if score >= threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        best
    }

    fn terms(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        if !self.bigrams || tokens.len() < 2 {
            return tokens;
        }
        let bigrams: Vec<String> = tokens
            .windows(2)
            .map(|pair| format!("{} {}", pair[0], pair[1]))
            .collect();
        let mut terms = tokens;
        terms.extend(bigrams);
        terms
    }

    /// One weight vector per text, built over the vocabulary of `texts` alone.
    pub fn vectorize<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SparseVector> {
        let counts: Vec<HashMap<String, f64>> = texts
            .iter()
            .map(|text| {
                let mut tf: HashMap<String, f64> = HashMap::new();
                for term in self.terms(text.as_ref()) {
                    *tf.entry(term).or_insert(0.0) += 1.0;
                }
                tf
            })
            .collect();

        let mut df: HashMap<&str, f64> = HashMap::new();
        for doc in &counts {
            for term in doc.keys() {
                *df.entry(term.as_str()).or_insert(0.0) += 1.0;
            }
        }

        let n = counts.len() as f64;
        let idf = |term: &str| {
            let doc_freq = df.get(term).copied().unwrap_or(0.0);
            ((1.0 + n) / (1.0 + doc_freq)).ln() + 1.0
        };

        counts
            .iter()
            .map(|doc| {
                let mut weights: SparseVector = doc
                    .iter()
                    .map(|(term, tf)| (term.clone(), tf * idf(term)))
                    .collect();
                let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for w in weights.values_mut() {
                        *w /= norm;
                    }
                } else {
                    weights.clear();
                }
                weights
            })
            .collect()
    }
}

pub(crate) fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .sum()
}
