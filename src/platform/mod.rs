/// Video platform collaborators
///
/// The detection core only depends on the `VideoPlatform` trait. The YouTube
/// Data API client and the offline demo dataset are the two implementations
/// shipped with the crate.

pub mod youtube;
pub mod demo;

pub use demo::DemoPlatform;
pub use youtube::YouTubeClient;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default search window in days
pub const DEFAULT_DAYS_BACK: i64 = 4;

/// Largest page the search endpoint returns; there is no pagination
pub const MAX_PAGE_SIZE: usize = 50;

/// Metadata of a single video, fetched once per identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Raw platform duration token, e.g. `PT1M30S`
    pub duration: String,
}

/// A fetched candidate together with its top comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub metadata: VideoMetadata,
    pub comments: Vec<String>,
}

impl CandidateItem {
    /// Title, description and comments joined by single spaces
    pub fn combined_text(&self) -> String {
        format!(
            "{} {} {}",
            self.metadata.title,
            self.metadata.description,
            self.comments.join(" ")
        )
    }
}

/// Search and retrieval operations the pipeline needs from a video platform
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Identifiers of videos matching `term`, newest first, published after the cutoff
    async fn search(&self, term: &str, limit: usize, published_after: &str) -> Result<Vec<String>>;

    /// Metadata for one video, `None` if the platform does not know it
    async fn fetch_metadata(&self, id: &str) -> Result<Option<VideoMetadata>>;

    /// Top comments by relevance
    async fn fetch_comments(&self, id: &str, limit: usize) -> Result<Vec<String>>;

    fn platform_name(&self) -> &str;
}

/// Canonical watch URL for a video identifier
pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// ISO-8601 UTC timestamp `days` before `now`, second precision with a trailing `Z`
pub fn recency_cutoff(now: DateTime<Utc>, days: i64) -> String {
    (now - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true)
}
