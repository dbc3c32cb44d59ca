//! Statistical product classifier: TF-IDF features fed to a logistic regression
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use super::vectorizer::TfidfVectorizer;
use super::{DetectorReport, Evidence, ModelVerdict, ProductDetector};
use crate::error::{FilterError, Result};

/// Pre-trained binary logistic regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Class labels in model order; the second one is the positive class
    pub classes: Vec<i64>,
    /// One weight per feature column
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    pub fn from_json(json: &str) -> Result<Self> {
        let model: LogisticModel = serde_json::from_str(json)?;
        model.check_binary()?;
        Ok(model)
    }

    fn check_binary(&self) -> Result<()> {
        if self.classes.len() != 2 {
            return Err(FilterError::Artifact(format!(
                "expected a binary model, found {} classes",
                self.classes.len()
            )));
        }
        Ok(())
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&content)
    }

    /// Signed distance from the decision boundary
    pub fn decision_function(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coef.len() {
            return Err(FilterError::Inference(format!(
                "feature vector has {} columns, model expects {}",
                features.len(),
                self.coef.len()
            )));
        }

        let score = self
            .coef
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;

        if score.is_finite() {
            Ok(score)
        } else {
            Err(FilterError::Inference("decision score is not finite".to_string()))
        }
    }

    /// Predicted label and the probability of that label
    pub fn predict(&self, features: &[f64]) -> Result<(i64, f64)> {
        let score = self.decision_function(features)?;
        let p_positive = 1.0 / (1.0 + (-score).exp());

        if score > 0.0 {
            Ok((self.classes[1], p_positive))
        } else {
            Ok((self.classes[0], 1.0 - p_positive))
        }
    }

    pub fn positive_class(&self) -> i64 {
        self.classes[1]
    }
}

/// Fitted vectorizer and model, loaded together
#[derive(Debug, Clone)]
pub struct TrainedArtifact {
    vectorizer: TfidfVectorizer,
    model: LogisticModel,
}

impl TrainedArtifact {
    pub fn new(vectorizer: TfidfVectorizer, model: LogisticModel) -> Result<Self> {
        model.check_binary()?;
        if vectorizer.n_features() != model.coef.len() {
            return Err(FilterError::Artifact(format!(
                "vectorizer produces {} features but model has {} weights",
                vectorizer.n_features(),
                model.coef.len()
            )));
        }
        Ok(Self { vectorizer, model })
    }

    pub async fn load<P: AsRef<Path>>(model_path: P, vectorizer_path: P) -> Result<Self> {
        let model = LogisticModel::from_file(model_path).await?;
        let vectorizer = TfidfVectorizer::from_file(vectorizer_path).await?;
        Self::new(vectorizer, model)
    }

    /// Whether `text` mentions a product, with the max class probability
    pub fn predict(&self, text: &str) -> Result<(bool, f64)> {
        let features = self.vectorizer.transform(text)?;
        let (label, confidence) = self.model.predict(&features)?;
        Ok((label == self.model.positive_class(), confidence))
    }
}

/// Detector backed by an optional trained artifact.
///
/// Without an artifact every text is reported as `Unavailable`, which never
/// counts as a product, so retention falls back to the pattern detector alone.
#[derive(Debug, Clone)]
pub struct StatisticalClassifier {
    artifact: Option<TrainedArtifact>,
}

impl StatisticalClassifier {
    pub fn with_artifact(artifact: TrainedArtifact) -> Self {
        Self {
            artifact: Some(artifact),
        }
    }

    pub fn disabled() -> Self {
        Self { artifact: None }
    }

    /// Load the artifact pair; any failure downgrades to pattern-only detection
    pub async fn load<P: AsRef<Path>>(model_path: P, vectorizer_path: P) -> Self {
        let model_path = model_path.as_ref();
        let vectorizer_path = vectorizer_path.as_ref();

        let model_exists = tokio::fs::try_exists(model_path).await.unwrap_or(false);
        let vectorizer_exists = tokio::fs::try_exists(vectorizer_path).await.unwrap_or(false);

        if !model_exists || !vectorizer_exists {
            info!(
                "⚠️ Classifier artifacts not found ({}, {}); only pattern detection will be used",
                model_path.display(),
                vectorizer_path.display()
            );
            return Self::disabled();
        }

        match TrainedArtifact::load(model_path, vectorizer_path).await {
            Ok(artifact) => {
                info!(
                    "✅ Classifier loaded: {} features from {}",
                    artifact.vectorizer.n_features(),
                    vectorizer_path.display()
                );
                Self::with_artifact(artifact)
            }
            Err(e) => {
                warn!("Failed to load classifier artifacts, using pattern detection only: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn classify(&self, text: &str) -> ModelVerdict {
        let Some(artifact) = &self.artifact else {
            return ModelVerdict::Unavailable;
        };

        match artifact.predict(text) {
            Ok((positive, confidence)) => ModelVerdict::Scored { positive, confidence },
            Err(e) => {
                debug!("Classifier inference failed: {}", e);
                ModelVerdict::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl ProductDetector for StatisticalClassifier {
    fn name(&self) -> &str {
        "classifier"
    }

    fn detect(&self, text: &str) -> DetectorReport {
        DetectorReport {
            detector: self.name().to_string(),
            evidence: Evidence::Model(self.classify(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTORIZER_JSON: &str = r#"{
        "stop_words": ["the", "my"],
        "ngram_range": [1, 2],
        "vocabulary": {"buy": 0, "now": 1, "buy now": 2, "sunset": 3, "review": 4},
        "idf": [1.4, 1.2, 1.9, 1.6, 1.3]
    }"#;

    const MODEL_JSON: &str = r#"{
        "classes": [0, 1],
        "coef": [1.5, 0.5, 2.5, -3.0, 2.0],
        "intercept": -0.4
    }"#;

    fn trained() -> StatisticalClassifier {
        let vectorizer = TfidfVectorizer::from_json(VECTORIZER_JSON).unwrap();
        let model = LogisticModel::from_json(MODEL_JSON).unwrap();
        StatisticalClassifier::with_artifact(TrainedArtifact::new(vectorizer, model).unwrap())
    }

    #[test]
    fn test_positive_prediction() {
        let verdict = trained().classify("Buy now before it is gone");
        match verdict {
            ModelVerdict::Scored { positive, confidence } => {
                assert!(positive);
                assert!(confidence > 0.5 && confidence < 1.0);
            }
            other => panic!("unexpected verdict: {:?}", other),
        }
    }

    #[test]
    fn test_negative_prediction() {
        let verdict = trained().classify("Beautiful sunset from my balcony.");
        match verdict {
            ModelVerdict::Scored { positive, confidence } => {
                assert!(!positive);
                assert!(confidence > 0.5);
            }
            other => panic!("unexpected verdict: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_vocabulary_uses_intercept() {
        // All-zero features: score = intercept = -0.4 -> negative
        let verdict = trained().classify("zzz qqq");
        let expected = 1.0 - 1.0 / (1.0 + 0.4_f64.exp());
        assert_eq!(verdict.is_positive(), false);
        assert!((verdict.confidence().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_is_unavailable() {
        let classifier = StatisticalClassifier::disabled();
        assert!(!classifier.is_available());
        assert_eq!(classifier.classify("Buy now!"), ModelVerdict::Unavailable);
        assert!(!classifier.detect("Buy now!").is_positive());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let vectorizer = TfidfVectorizer::from_json(VECTORIZER_JSON).unwrap();
        let model = LogisticModel::from_json(r#"{"classes": [0, 1], "coef": [1.0], "intercept": 0.0}"#).unwrap();
        assert!(TrainedArtifact::new(vectorizer, model).is_err());
    }

    #[test]
    fn test_inference_failure_is_negative() {
        let model = LogisticModel {
            classes: vec![0, 1],
            coef: vec![f64::INFINITY, 0.0, 0.0, 0.0, 0.0],
            intercept: f64::NEG_INFINITY,
        };
        let vectorizer = TfidfVectorizer::from_json(VECTORIZER_JSON).unwrap();
        let classifier = StatisticalClassifier::with_artifact(TrainedArtifact::new(vectorizer, model).unwrap());

        let verdict = classifier.classify("buy");
        assert!(matches!(verdict, ModelVerdict::Failed { .. }));
        assert!(!verdict.is_positive());
        assert_eq!(verdict.confidence(), Some(0.0));
    }

    #[test]
    fn test_non_binary_model_rejected() {
        assert!(LogisticModel::from_json(r#"{"classes": [0, 1, 2], "coef": [], "intercept": 0.0}"#).is_err());
    }

    #[test]
    fn test_artifact_rejects_hand_built_non_binary_model() {
        for classes in [vec![], vec![1], vec![0, 1, 2]] {
            let model = LogisticModel {
                classes,
                coef: vec![0.0; 5],
                intercept: 0.0,
            };
            let vectorizer = TfidfVectorizer::from_json(VECTORIZER_JSON).unwrap();
            assert!(matches!(
                TrainedArtifact::new(vectorizer, model),
                Err(FilterError::Artifact(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_load_missing_artifacts_degrades() {
        let dir = tempfile::TempDir::new().unwrap();
        let classifier = StatisticalClassifier::load(
            dir.path().join("model.json"),
            dir.path().join("vectorizer.json"),
        )
        .await;
        assert!(!classifier.is_available());
    }

    #[tokio::test]
    async fn test_load_corrupt_artifacts_degrades() {
        let dir = tempfile::TempDir::new().unwrap();
        let model_path = dir.path().join("model.json");
        let vectorizer_path = dir.path().join("vectorizer.json");
        tokio::fs::write(&model_path, "not json").await.unwrap();
        tokio::fs::write(&vectorizer_path, VECTORIZER_JSON).await.unwrap();

        let classifier = StatisticalClassifier::load(model_path, vectorizer_path).await;
        assert!(!classifier.is_available());
    }

    #[tokio::test]
    async fn test_load_valid_artifacts() {
        let dir = tempfile::TempDir::new().unwrap();
        let model_path = dir.path().join("model.json");
        let vectorizer_path = dir.path().join("vectorizer.json");
        tokio::fs::write(&model_path, MODEL_JSON).await.unwrap();
        tokio::fs::write(&vectorizer_path, VECTORIZER_JSON).await.unwrap();

        let classifier = StatisticalClassifier::load(model_path, vectorizer_path).await;
        assert!(classifier.is_available());
        assert!(classifier.classify("product review").is_positive());
    }
}
