//! Offline platform backed by a small canned dataset, for trying the filter without an API key
use async_trait::async_trait;
use std::collections::HashMap;

use super::{VideoMetadata, VideoPlatform};
use crate::error::Result;

#[derive(Debug, Clone)]
struct DemoVideo {
    metadata: VideoMetadata,
    comments: Vec<String>,
}

/// In-memory platform with a handful of sample videos
#[derive(Debug, Clone)]
pub struct DemoPlatform {
    videos: Vec<DemoVideo>,
    index: HashMap<String, usize>,
}

impl DemoPlatform {
    pub fn new() -> Self {
        let samples: &[(&str, &str, &str, &str, &[&str])] = &[
            (
                "demo1",
                "Unboxing the new iPhone 15 Pro Max! #shorts",
                "Check out my unboxing of the latest iPhone 15 Pro Max. Link in bio to buy now! Use code SAVE10 for discount.",
                "PT45S",
                &["Where did you buy this?", "Link in bio for purchase!", "Amazing product review!", "Love your content"],
            ),
            (
                "demo2",
                "My morning routine #shorts",
                "Just showing my daily morning routine. Nothing special here.",
                "PT30S",
                &["Great routine!", "Thanks for sharing", "Very inspiring"],
            ),
            (
                "demo3",
                "Nike Air Jordan 1 Review #shorts",
                "Reviewing the classic Nike Air Jordan 1. Get yours at nike.com for $120!",
                "PT55S",
                &["These shoes are fire!", "Where to buy?", "Check amazon.com for deals"],
            ),
            (
                "demo4",
                "Beautiful sunset timelapse #shorts",
                "Captured this amazing sunset from my balcony. Nature is beautiful!",
                "PT40S",
                &["Gorgeous!", "Amazing colors", "Love nature videos"],
            ),
            (
                "demo5",
                "Gaming setup reveal! RTX 4090 #shorts",
                "Finally got my hands on the RTX 4090! Building the ultimate gaming PC. Parts list in description.",
                "PT50S",
                &["Sick setup!", "Check bestbuy.com for stock", "How much did this cost?", "Link to buy the GPU?"],
            ),
            (
                "demo6",
                "Full MacBook Air review after one month",
                "Long-form review covering battery, display and performance. Grab it on sale at amazon.com.",
                "PT12M5S",
                &["Super detailed, thanks", "Is the base model enough?"],
            ),
        ];

        let videos: Vec<DemoVideo> = samples
            .iter()
            .map(|(id, title, description, duration, comments)| DemoVideo {
                metadata: VideoMetadata {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    duration: duration.to_string(),
                },
                comments: comments.iter().map(|c| c.to_string()).collect(),
            })
            .collect();

        let index = videos
            .iter()
            .enumerate()
            .map(|(i, v)| (v.metadata.id.clone(), i))
            .collect();

        Self { videos, index }
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// A video matches when any word of the term appears in its title or description
    fn matches_term(video: &DemoVideo, term: &str) -> bool {
        let haystack = format!("{} {}", video.metadata.title, video.metadata.description).to_lowercase();
        term.split_whitespace()
            .map(str::to_lowercase)
            .any(|word| haystack.contains(&word))
    }
}

impl Default for DemoPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoPlatform for DemoPlatform {
    async fn search(&self, term: &str, limit: usize, _published_after: &str) -> Result<Vec<String>> {
        Ok(self
            .videos
            .iter()
            .filter(|video| Self::matches_term(video, term))
            .take(limit)
            .map(|video| video.metadata.id.clone())
            .collect())
    }

    async fn fetch_metadata(&self, id: &str) -> Result<Option<VideoMetadata>> {
        Ok(self.index.get(id).map(|&i| self.videos[i].metadata.clone()))
    }

    async fn fetch_comments(&self, id: &str, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .index
            .get(id)
            .map(|&i| self.videos[i].comments.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn platform_name(&self) -> &str {
        "demo"
    }
}
