/// Shorts Product Filter
///
/// Finds short-form videos whose title, description or top comments mention
/// commercial products. Candidates come from a video platform search, are
/// gated by duration and checked by a pattern library and a pre-trained
/// TF-IDF + logistic regression classifier.

pub mod config;
pub mod error;
pub mod duration;
pub mod detection;
pub mod platform;
pub mod pipeline;
pub mod state;
pub mod processing;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::error::{FilterError, Result};
pub use crate::duration::{DurationClass, DurationClassifier};
pub use crate::detection::{
    DetectorReport, Evidence, ModelVerdict, PatternDetector, PatternLibrary, ProductDetector,
    StatisticalClassifier,
};
pub use crate::platform::{DemoPlatform, VideoMetadata, VideoPlatform, YouTubeClient};
pub use crate::pipeline::{CandidatePipeline, CandidateRun, DetectionResult, PipelineOutcome};
pub use crate::state::{RunStats, SeenSet};
pub use crate::processing::{BatchProcessor, BatchResult};
