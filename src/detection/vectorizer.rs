//! TF-IDF text vectorizer loaded from a pre-fitted JSON artifact.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{FilterError, Result};

/// Default token pattern: runs of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Row normalization applied after idf weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
    None,
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Norm {
    Norm::L2
}

/// On-disk form of a fitted vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Norm,
    /// Term -> feature column
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature column
    pub idf: Vec<f64>,
}

/// TF-IDF vectorizer for text feature extraction
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    lowercase: bool,
    token_pattern: Regex,
    stop_words: HashSet<String>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Norm,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Build a vectorizer from its artifact, checking that it is self-consistent
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self> {
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(FilterError::Artifact(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        if artifact.vocabulary.len() != artifact.idf.len() {
            return Err(FilterError::Artifact(format!(
                "vocabulary has {} terms but idf has {} weights",
                artifact.vocabulary.len(),
                artifact.idf.len()
            )));
        }

        if let Some((term, idx)) = artifact
            .vocabulary
            .iter()
            .find(|(_, idx)| **idx >= artifact.idf.len())
        {
            return Err(FilterError::Artifact(format!(
                "term '{}' maps to column {} outside the feature space",
                term, idx
            )));
        }

        let token_pattern = Regex::new(&artifact.token_pattern)?;
        let stop_words = artifact
            .stop_words
            .into_iter()
            .map(|w| if artifact.lowercase { w.to_lowercase() } else { w })
            .collect();

        Ok(Self {
            lowercase: artifact.lowercase,
            token_pattern,
            stop_words,
            ngram_range: artifact.ngram_range,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: VectorizerArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&content)
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Word tokens with stop words removed
    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        self.token_pattern
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    /// Word n-grams over the token stream, joined by single spaces
    fn ngrams(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();

        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            grams.extend(tokens.windows(n).map(|window| window.join(" ")));
        }

        grams
    }

    /// Transform a document into its TF-IDF feature vector
    pub fn transform(&self, document: &str) -> Result<Vec<f64>> {
        let tokens = self.tokenize(document);
        let mut features: Vec<f64> = vec![0.0; self.n_features()];

        for gram in self.ngrams(&tokens) {
            if let Some(&idx) = self.vocabulary.get(&gram) {
                features[idx] += 1.0;
            }
        }

        for (idx, value) in features.iter_mut().enumerate() {
            if *value == 0.0 {
                continue;
            }
            if self.sublinear_tf {
                *value = 1.0 + value.ln();
            }
            *value *= self.idf[idx];
        }

        let magnitude = match self.norm {
            Norm::L2 => features.iter().map(|x| x * x).sum::<f64>().sqrt(),
            Norm::L1 => features.iter().map(|x| x.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };

        if !magnitude.is_finite() {
            return Err(FilterError::Inference(
                "feature vector has a non-finite norm".to_string(),
            ));
        }

        if magnitude > 0.0 {
            for value in &mut features {
                *value /= magnitude;
            }
        }

        Ok(features)
    }
}
