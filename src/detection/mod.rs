/// Product detection strategies
///
/// Each detector inspects the combined text of a video (title, description and
/// top comments) and reports whether it references a commercial product. The
/// candidate pipeline runs every configured detector and keeps the video if
/// any of them fires.

pub mod patterns;
pub mod vectorizer;
pub mod classifier;

pub use patterns::{PatternCategory, PatternDetector, PatternLibrary, PatternRule};
pub use vectorizer::TfidfVectorizer;
pub use classifier::{LogisticModel, StatisticalClassifier, TrainedArtifact};

use serde::{Deserialize, Serialize};

/// Outcome of the statistical classifier for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelVerdict {
    /// Model ran; `confidence` is the larger of the two class probabilities
    Scored { positive: bool, confidence: f64 },
    /// No trained artifact was loaded
    Unavailable,
    /// Vectorization or inference failed; counts as negative
    Failed { reason: String },
}

impl ModelVerdict {
    pub fn is_positive(&self) -> bool {
        matches!(self, ModelVerdict::Scored { positive: true, .. })
    }

    /// Confidence of a scored verdict; zero when inference failed
    pub fn confidence(&self) -> Option<f64> {
        match self {
            ModelVerdict::Scored { confidence, .. } => Some(*confidence),
            ModelVerdict::Failed { .. } => Some(0.0),
            ModelVerdict::Unavailable => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ModelVerdict::Scored { .. } => "scored",
            ModelVerdict::Unavailable => "unavailable",
            ModelVerdict::Failed { .. } => "failed",
        }
    }
}

/// What a detector found
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    /// Rule texts of every matching pattern, in library order
    Patterns(Vec<String>),
    Model(ModelVerdict),
}

/// Report produced by one detector for one text
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorReport {
    pub detector: String,
    pub evidence: Evidence,
}

impl DetectorReport {
    pub fn is_positive(&self) -> bool {
        match &self.evidence {
            Evidence::Patterns(matched) => !matched.is_empty(),
            Evidence::Model(verdict) => verdict.is_positive(),
        }
    }
}

/// Common capability shared by all detection strategies
pub trait ProductDetector: Send + Sync {
    fn name(&self) -> &str;

    fn detect(&self, text: &str) -> DetectorReport;
}

/// True if at least one report signals a product
pub fn any_positive(reports: &[DetectorReport]) -> bool {
    reports.iter().any(DetectorReport::is_positive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(evidence: Evidence) -> DetectorReport {
        DetectorReport {
            detector: "test".to_string(),
            evidence,
        }
    }

    #[test]
    fn test_verdict_positivity() {
        assert!(ModelVerdict::Scored { positive: true, confidence: 0.8 }.is_positive());
        assert!(!ModelVerdict::Scored { positive: false, confidence: 0.9 }.is_positive());
        assert!(!ModelVerdict::Unavailable.is_positive());
        assert!(!ModelVerdict::Failed { reason: "boom".to_string() }.is_positive());
    }

    #[test]
    fn test_failed_verdict_has_zero_confidence() {
        let verdict = ModelVerdict::Failed { reason: "bad input".to_string() };
        assert_eq!(verdict.confidence(), Some(0.0));
        assert_eq!(ModelVerdict::Unavailable.confidence(), None);
    }

    #[test]
    fn test_or_combination() {
        let patterns_hit = report(Evidence::Patterns(vec!["nike".to_string()]));
        let patterns_miss = report(Evidence::Patterns(Vec::new()));
        let model_hit = report(Evidence::Model(ModelVerdict::Scored { positive: true, confidence: 0.7 }));
        let model_miss = report(Evidence::Model(ModelVerdict::Unavailable));

        assert!(any_positive(&[patterns_hit.clone(), model_miss.clone()]));
        assert!(any_positive(&[patterns_miss.clone(), model_hit]));
        assert!(!any_positive(&[patterns_miss, model_miss]));
        assert!(!any_positive(&[]));
    }
}
