//! TF-IDF occupation matcher.
//!
//! Vectorizer semantics: lowercase, token pattern `\b\w\w+\b`, English stop
//! words removed, vocabulary capped at `MAX_FEATURES` terms by corpus
//! frequency, smooth idf `ln((1 + n) / (1 + df)) + 1`, L2-normalized rows.
//! Cosine similarity of normalized vectors is their dot product.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::Occupation;
use crate::profile::stop_words::ENGLISH_STOP_WORDS;

pub const MAX_FEATURES: usize = 1000;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// Sparse, L2-normalized term vector keyed by vocabulary index.
type SparseVector = BTreeMap<usize, f64>;

/// A fitted TF-IDF vectorizer.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fits the vocabulary and idf weights, returning the vectorizer and the
    /// transformed corpus.
    pub fn fit_transform(documents: &[String], max_features: usize) -> (Self, Vec<SparseVector>) {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d)).collect();

        let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let mut seen = HashSet::new();
            for token in tokens {
                *corpus_counts.entry(token.as_str()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        // Most frequent terms first, ties broken alphabetically.
        let mut terms: Vec<(&str, usize)> = corpus_counts.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(max_features);
        let mut kept: Vec<&str> = terms.into_iter().map(|(t, _)| t).collect();
        kept.sort_unstable();

        let n_docs = documents.len() as f64;
        let vocabulary: HashMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vectorizer = Self { vocabulary, idf };
        let vectors = tokenized.iter().map(|t| vectorizer.vectorize(t)).collect();
        (vectorizer, vectors)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn transform(&self, document: &str) -> SparseVector {
        self.vectorize(&tokenize(document))
    }

    fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut vector = SparseVector::new();
        for token in tokens {
            if let Some(&i) = self.vocabulary.get(token) {
                *vector.entry(i).or_insert(0.0) += 1.0;
            }
        }
        for (i, weight) in vector.iter_mut() {
            *weight *= self.idf[*i];
        }
        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

/// Cosine similarity of two L2-normalized sparse vectors.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(i, w)| large.get(i).map(|v| w * v))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Best occupation for a profile.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub occupation_id: String,
    pub occupation_name: String,
    /// Cosine similarity in [0, 1].
    pub score: f64,
    #[serde(skip)]
    pub index: usize,
}

/// Matcher fitted once over the PON TIK occupation table.
#[derive(Debug, Clone)]
pub struct OccupationMatcher {
    vectorizer: TfidfVectorizer,
    occupation_vectors: Vec<SparseVector>,
    occupations: Vec<Occupation>,
}

impl OccupationMatcher {
    pub fn fit(occupations: &[Occupation]) -> Result<Self, AppError> {
        if occupations.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "Occupation table is empty; the matcher cannot be initialised".to_string(),
            ));
        }
        let corpus: Vec<String> = occupations.iter().map(Occupation::corpus_text).collect();
        let (vectorizer, occupation_vectors) = TfidfVectorizer::fit_transform(&corpus, MAX_FEATURES);
        debug!(
            "Occupation matcher fitted: {} occupations, {} terms",
            occupations.len(),
            vectorizer.vocabulary_len()
        );
        Ok(Self {
            vectorizer,
            occupation_vectors,
            occupations: occupations.to_vec(),
        })
    }

    /// Similarity of `profile_text` to every occupation, in table order.
    pub fn scores(&self, profile_text: &str) -> Vec<f64> {
        let query = self.vectorizer.transform(profile_text);
        self.occupation_vectors
            .iter()
            .map(|v| cosine_similarity(&query, v))
            .collect()
    }

    /// The first occupation with the highest similarity.
    pub fn best_match(&self, profile_text: &str) -> MatchResult {
        let scores = self.scores(profile_text);
        let (index, score) = scores
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, s)| if s > best.1 { (i, s) } else { best });
        let score = score.max(0.0);
        if score == 0.0 {
            warn!("Profile shares no vocabulary with any occupation; defaulting to the first row");
        }
        let occupation = &self.occupations[index];
        MatchResult {
            occupation_id: occupation.id.clone(),
            occupation_name: occupation.name.clone(),
            score,
            index,
        }
    }

    pub fn occupation(&self, index: usize) -> Option<&Occupation> {
        self.occupations.get(index)
    }
}
