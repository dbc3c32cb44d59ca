use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::detection::{PatternDetector, PatternLibrary, ProductDetector, StatisticalClassifier};
use crate::duration::DurationClassifier;
use crate::error::Result;
use crate::pipeline::{CandidatePipeline, DetectionResult, PipelineOutcome};
use crate::platform::{recency_cutoff, VideoPlatform};
use crate::state::{RunStats, SeenSet};

/// Final output of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Recency cutoff passed to every search
    pub published_after: String,
    pub stats: RunStats,
    /// Retained Shorts in first-retained order
    pub results: Vec<DetectionResult>,
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    timestamp: String,
    total_results: usize,
    /// Mean pipeline time per video, in seconds
    avg_processing_time: f64,
    #[serde(flatten)]
    batch: &'a BatchResult,
}

impl BatchResult {
    /// Write the results as pretty JSON into `output_dir`, returning the file path
    pub async fn export_json(&self, output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;

        let now = Utc::now();
        let path = output_dir.join(format!(
            "shorts_filter_results_{}.json",
            now.format("%Y%m%d_%H%M%S")
        ));

        let document = ExportDocument {
            timestamp: now.to_rfc3339(),
            total_results: self.results.len(),
            avg_processing_time: self.stats.average_processing_time().as_secs_f64(),
            batch: self,
        };

        let json_data = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(&path, json_data).await?;

        info!("💾 Results saved to: {}", path.display());
        Ok(path)
    }
}

/// Accumulator threaded through the per-term steps of a run
#[derive(Debug, Default)]
pub struct RunState {
    pub seen: SeenSet,
    pub results: Vec<DetectionResult>,
    pub stats: RunStats,
}

/// Sequential batch processor: searches each term, deduplicates and runs the candidate pipeline
pub struct BatchProcessor {
    config: Config,
    platform: Arc<dyn VideoPlatform>,
    pipeline: CandidatePipeline,
    request_delay: Duration,
}

impl BatchProcessor {
    /// Build the processor with the detectors described by the configuration
    pub async fn new(config: Config, platform: Arc<dyn VideoPlatform>) -> Result<Self> {
        info!("🔧 Initializing BatchProcessor on platform '{}'", platform.platform_name());

        let library = match config.detection.patterns_file {
            Some(ref patterns_file) if tokio::fs::try_exists(patterns_file).await.unwrap_or(false) => {
                PatternLibrary::from_file(patterns_file).await?
            }
            Some(ref patterns_file) => {
                warn!("Patterns file not found: {}, using built-in patterns", patterns_file.display());
                PatternLibrary::new()
            }
            None => PatternLibrary::new(),
        };

        let stats = library.get_stats();
        info!("🧩 Pattern library loaded: {} rules in {} categories",
              stats.total_rules, stats.category_counts.len());

        let classifier = StatisticalClassifier::load(
            &config.detection.model_path,
            &config.detection.vectorizer_path,
        )
        .await;

        let detectors: Vec<Box<dyn ProductDetector>> = vec![
            Box::new(PatternDetector::new(library)),
            Box::new(classifier),
        ];

        Ok(Self::with_detectors(config, platform, detectors))
    }

    /// Build the processor with an explicit set of detectors
    pub fn with_detectors(
        config: Config,
        platform: Arc<dyn VideoPlatform>,
        detectors: Vec<Box<dyn ProductDetector>>,
    ) -> Self {
        let pipeline = CandidatePipeline::new(
            Arc::clone(&platform),
            detectors,
            DurationClassifier::with_threshold(config.detection.shorts_max_seconds),
            config.search.comment_limit,
            config.detection.description_max_chars,
        );

        info!("🧪 Detectors: {}", pipeline.detector_names().join(", "));
        let request_delay = Duration::from_millis(config.performance.request_delay_ms);

        Self {
            config,
            platform,
            pipeline,
            request_delay,
        }
    }

    /// Run all terms with the configured recency window, counted back from now
    pub async fn run(&self, terms: &[String]) -> BatchResult {
        let published_after = recency_cutoff(Utc::now(), self.config.search.days_back);
        self.run_with_cutoff(terms, published_after).await
    }

    /// Run all terms, strictly in order, against a fixed recency cutoff
    pub async fn run_with_cutoff(&self, terms: &[String], published_after: String) -> BatchResult {
        let start_time = Instant::now();
        info!("🚀 Starting filter run with {} search terms", terms.len());

        let mut state = RunState::default();
        for term in terms {
            state = self.process_term(state, term, &published_after).await;
        }

        let mut stats = state.stats;
        stats.elapsed = start_time.elapsed();

        info!("✅ Total filtered Shorts with product mentions: {}", state.results.len());

        BatchResult {
            published_after,
            stats,
            results: state.results,
        }
    }

    /// Search one term and run the pipeline over identifiers not seen before
    pub async fn process_term(&self, mut state: RunState, term: &str, published_after: &str) -> RunState {
        info!("🔍 Searching '{}' (after {})", term, published_after);
        state.stats.terms_searched += 1;

        let limit = self.config.search.max_results_per_term;
        state.stats.api_calls += 1;
        let video_ids = match self.platform.search(term, limit, published_after).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("❌ Error searching videos for '{}': {}", term, e);
                Vec::new()
            }
        };

        let new_ids = state.seen.filter_new(&video_ids);
        state.stats.candidates_examined += video_ids.len();
        state.stats.duplicates_skipped += video_ids.len() - new_ids.len();

        if new_ids.is_empty() {
            info!("No new videos found for '{}'", term);
            return state;
        }

        info!("🎯 {} new videos, filtering…", new_ids.len());
        let retained_before = state.results.len();

        for (index, id) in new_ids.iter().enumerate() {
            if index > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            if (index + 1) % 10 == 0 {
                debug!("Progress: {}/{} videos processed", index + 1, new_ids.len());
            }

            let run = self.pipeline.process(id).await;
            state.stats.pipeline_invocations += 1;
            state.stats.api_calls += run.api_calls;
            state.stats.processing_time += run.processing_time;

            if run.outcome.is_short() {
                state.stats.shorts_identified += 1;
            }

            match run.outcome {
                PipelineOutcome::Retained(result) => {
                    state.stats.products_detected += 1;
                    state.results.push(result);
                }
                PipelineOutcome::Unavailable => state.stats.unavailable += 1,
                _ => {}
            }

            state.seen.insert(id);
        }

        info!("📦 Found {} product-related Shorts for '{}'",
              state.results.len() - retained_before, term);

        state
    }
}
