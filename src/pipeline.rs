//! Per-candidate pipeline: fetch, duration gate, text assembly, dual detection
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::detection::{DetectorReport, Evidence, ModelVerdict, ProductDetector};
use crate::duration::{DurationClass, DurationClassifier};
use crate::platform::{watch_url, CandidateItem, VideoPlatform};

/// Output record for a retained Short
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub identifier: String,
    pub title: String,
    pub truncated_description: String,
    pub url: String,
    /// Rule texts of matching patterns, empty if none
    pub matched_patterns: Vec<String>,
    pub ml_label: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml_confidence: Option<f64>,
    /// `scored`, `unavailable` or `failed`
    pub ml_status: String,
    pub comment_count: usize,
    /// Time spent in the pipeline for this video
    #[serde(with = "crate::state::duration_secs")]
    pub processing_time: Duration,
}

/// How the pipeline finished for one identifier
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Metadata missing or fetch failed
    Unavailable,
    /// Longer than the Shorts threshold
    NotShort { seconds: u64 },
    /// Duration token could not be parsed
    UnknownDuration { token: String },
    /// A Short that no detector flagged
    NoProduct,
    Retained(DetectionResult),
}

impl PipelineOutcome {
    pub fn is_short(&self) -> bool {
        matches!(self, PipelineOutcome::NoProduct | PipelineOutcome::Retained(_))
    }
}

/// One pipeline invocation: its outcome plus what it cost
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRun {
    pub outcome: PipelineOutcome,
    /// Platform requests issued for this identifier
    pub api_calls: usize,
    pub processing_time: Duration,
}

/// Cut `text` to `max_chars` characters, appending `...` when something was removed
pub fn truncate_description(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Runs a single identifier through every stage of product detection
pub struct CandidatePipeline {
    platform: Arc<dyn VideoPlatform>,
    detectors: Vec<Box<dyn ProductDetector>>,
    durations: DurationClassifier,
    comment_limit: usize,
    description_max_chars: usize,
}

impl CandidatePipeline {
    pub fn new(
        platform: Arc<dyn VideoPlatform>,
        detectors: Vec<Box<dyn ProductDetector>>,
        durations: DurationClassifier,
        comment_limit: usize,
        description_max_chars: usize,
    ) -> Self {
        Self {
            platform,
            detectors,
            durations,
            comment_limit,
            description_max_chars,
        }
    }

    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Run every detector on the assembled text
    pub fn detect(&self, text: &str) -> Vec<DetectorReport> {
        self.detectors.iter().map(|d| d.detect(text)).collect()
    }

    pub async fn process(&self, id: &str) -> CandidateRun {
        let start_time = Instant::now();
        let mut api_calls = 0;
        let outcome = self.run_stages(id, &mut api_calls, start_time).await;

        CandidateRun {
            outcome,
            api_calls,
            processing_time: start_time.elapsed(),
        }
    }

    async fn run_stages(&self, id: &str, api_calls: &mut usize, start_time: Instant) -> PipelineOutcome {
        // Stage 1: metadata
        *api_calls += 1;
        let metadata = match self.platform.fetch_metadata(id).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                debug!("Video {} not found", id);
                return PipelineOutcome::Unavailable;
            }
            Err(e) => {
                warn!("❌ Error fetching video {}: {}", id, e);
                return PipelineOutcome::Unavailable;
            }
        };

        // Stage 2: duration gate
        match self.durations.classify(&metadata.duration) {
            DurationClass::Short(_) => {}
            DurationClass::Long(seconds) => {
                debug!("Video {} is {}s long, not a Short", id, seconds);
                return PipelineOutcome::NotShort { seconds };
            }
            DurationClass::Unknown => {
                debug!("Video {} has unrecognised duration {:?}", id, metadata.duration);
                return PipelineOutcome::UnknownDuration {
                    token: metadata.duration,
                };
            }
        }

        // Stage 3: comments are optional, disabled comments just mean none
        *api_calls += 1;
        let comments = match self.platform.fetch_comments(id, self.comment_limit).await {
            Ok(comments) => comments,
            Err(e) => {
                debug!("No comments for {}: {}", id, e);
                Vec::new()
            }
        };

        let item = CandidateItem { metadata, comments };
        let text = item.combined_text();

        // Stage 4: dual detection
        let reports = self.detect(&text);

        // Stage 5: retention
        self.build_result(&item, &reports, start_time.elapsed())
            .map(PipelineOutcome::Retained)
            .unwrap_or(PipelineOutcome::NoProduct)
    }

    /// Detection result for `item`, or `None` if no detector fired
    pub fn build_result(
        &self,
        item: &CandidateItem,
        reports: &[DetectorReport],
        processing_time: Duration,
    ) -> Option<DetectionResult> {
        if !crate::detection::any_positive(reports) {
            return None;
        }

        let mut matched_patterns = Vec::new();
        let mut verdict = ModelVerdict::Unavailable;

        for report in reports {
            match &report.evidence {
                Evidence::Patterns(matched) => matched_patterns.extend(matched.iter().cloned()),
                Evidence::Model(model_verdict) => verdict = model_verdict.clone(),
            }
        }

        let metadata = &item.metadata;
        Some(DetectionResult {
            identifier: metadata.id.clone(),
            title: metadata.title.clone(),
            truncated_description: truncate_description(&metadata.description, self.description_max_chars),
            url: watch_url(&metadata.id),
            matched_patterns,
            ml_label: verdict.is_positive(),
            ml_confidence: verdict.confidence(),
            ml_status: verdict.status().to_string(),
            comment_count: item.comments.len(),
            processing_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{PatternDetector, StatisticalClassifier};
    use crate::error::{FilterError, Result};
    use crate::platform::VideoMetadata;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakePlatform {
        videos: HashMap<String, VideoMetadata>,
        comments: HashMap<String, Vec<String>>,
    }

    impl FakePlatform {
        fn with_video(id: &str, title: &str, description: &str, duration: &str) -> Self {
            let mut videos = HashMap::new();
            videos.insert(
                id.to_string(),
                VideoMetadata {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    duration: duration.to_string(),
                },
            );
            Self {
                videos,
                comments: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl VideoPlatform for FakePlatform {
        async fn search(&self, _term: &str, _limit: usize, _after: &str) -> Result<Vec<String>> {
            Ok(self.videos.keys().cloned().collect())
        }

        async fn fetch_metadata(&self, id: &str) -> Result<Option<VideoMetadata>> {
            if id == "broken" {
                return Err(FilterError::Api { status: 500, message: "backend".to_string() });
            }
            Ok(self.videos.get(id).cloned())
        }

        async fn fetch_comments(&self, id: &str, limit: usize) -> Result<Vec<String>> {
            match self.comments.get(id) {
                Some(comments) => Ok(comments.iter().take(limit).cloned().collect()),
                None => Err(FilterError::Api { status: 403, message: "commentsDisabled".to_string() }),
            }
        }

        fn platform_name(&self) -> &str {
            "fake"
        }
    }

    fn pipeline(platform: FakePlatform) -> CandidatePipeline {
        CandidatePipeline::new(
            Arc::new(platform),
            vec![
                Box::new(PatternDetector::default()),
                Box::new(StatisticalClassifier::disabled()),
            ],
            DurationClassifier::new(),
            3,
            200,
        )
    }

    #[test]
    fn test_detector_names_in_order() {
        let platform = FakePlatform::with_video("v1", "t", "d", "PT10S");
        assert_eq!(pipeline(platform).detector_names(), vec!["patterns", "classifier"]);
    }

    #[test]
    fn test_truncate_description() {
        assert_eq!(truncate_description("short", 200), "short");
        assert_eq!(truncate_description("abcdef", 3), "abc...");
        assert_eq!(truncate_description("abc", 3), "abc");
        // Multi-byte characters are counted, not bytes
        assert_eq!(truncate_description("ééééé", 2), "éé...");
    }

    #[tokio::test]
    async fn test_retained_short() {
        let platform = FakePlatform::with_video(
            "v1",
            "Unboxing the new iPhone 15!",
            "Link in bio to buy now.",
            "PT45S",
        );
        let run = pipeline(platform).process("v1").await;
        assert_eq!(run.api_calls, 2);

        match run.outcome {
            PipelineOutcome::Retained(result) => {
                assert_eq!(result.identifier, "v1");
                assert_eq!(result.url, "https://www.youtube.com/watch?v=v1");
                assert_eq!(result.matched_patterns.len(), 4);
                assert!(!result.ml_label);
                assert_eq!(result.ml_confidence, None);
                assert_eq!(result.ml_status, "unavailable");
                assert_eq!(result.comment_count, 0);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_long_video_skipped() {
        let platform = FakePlatform::with_video("v1", "Nike haul", "", "PT1M30S");
        let run = pipeline(platform).process("v1").await;
        assert_eq!(run.outcome, PipelineOutcome::NotShort { seconds: 90 });
        // Long videos never reach the comments endpoint
        assert_eq!(run.api_calls, 1);
    }

    #[tokio::test]
    async fn test_unknown_duration_skipped() {
        let platform = FakePlatform::with_video("v1", "Nike haul", "", "P1D");
        assert_eq!(
            pipeline(platform).process("v1").await.outcome,
            PipelineOutcome::UnknownDuration { token: "P1D".to_string() }
        );
    }

    #[tokio::test]
    async fn test_missing_and_failing_metadata() {
        let platform = FakePlatform::with_video("v1", "t", "d", "PT10S");
        let pipeline = pipeline(platform);

        assert_eq!(pipeline.process("nope").await.outcome, PipelineOutcome::Unavailable);
        let run = pipeline.process("broken").await;
        assert_eq!(run.outcome, PipelineOutcome::Unavailable);
        assert_eq!(run.api_calls, 1);
    }

    #[tokio::test]
    async fn test_no_product_short() {
        let platform = FakePlatform::with_video("v1", "Beautiful sunset from my balcony.", "", "PT20S");
        let outcome = pipeline(platform).process("v1").await.outcome;

        assert_eq!(outcome, PipelineOutcome::NoProduct);
        assert!(outcome.is_short());
    }

    #[tokio::test]
    async fn test_comments_contribute_text() {
        let mut platform = FakePlatform::with_video("v1", "My desk", "Nothing fancy", "PT20S");
        platform.comments.insert(
            "v1".to_string(),
            vec!["Cool".to_string(), "Nice".to_string(), "Calm".to_string(), "Use promo code X".to_string()],
        );
        // Only the first three comments are read, so the promo code is never seen
        assert_eq!(pipeline(platform).process("v1").await.outcome, PipelineOutcome::NoProduct);

        let mut platform = FakePlatform::with_video("v2", "My desk", "Nothing fancy", "PT20S");
        platform.comments.insert("v2".to_string(), vec!["found it on amazon.com".to_string()]);
        match pipeline(platform).process("v2").await.outcome {
            PipelineOutcome::Retained(result) => {
                assert_eq!(result.matched_patterns, vec![r"amazon\.com".to_string()]);
                assert_eq!(result.comment_count, 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
