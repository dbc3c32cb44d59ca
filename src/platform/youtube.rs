//! YouTube Data API v3 client
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{VideoMetadata, VideoPlatform, MAX_PAGE_SIZE};
use crate::config::YouTubeConfig;
use crate::error::{FilterError, Result};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    #[serde(default)]
    snippet: VideoSnippet,
    #[serde(rename = "contentDetails", default)]
    content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Deserialize)]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentSnippet {
    #[serde(rename = "textDisplay", default)]
    text_display: String,
}

impl SearchResponse {
    fn video_ids(self) -> Vec<String> {
        self.items.into_iter().filter_map(|item| item.id.video_id).collect()
    }
}

impl VideoListResponse {
    fn into_metadata(self) -> Option<VideoMetadata> {
        self.items.into_iter().next().map(|item| VideoMetadata {
            id: item.id,
            title: item.snippet.title,
            description: item.snippet.description,
            duration: item.content_details.duration,
        })
    }
}

impl CommentThreadListResponse {
    fn comments(self) -> Vec<String> {
        self.items
            .into_iter()
            .map(|thread| thread.snippet.top_level_comment.snippet.text_display)
            .collect()
    }
}

/// Client for the search, videos and commentThreads endpoints
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| FilterError::Configuration("YouTube API key not configured".to_string()))?;

        // `Url::join` drops the last path segment unless it ends with '/'
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(endpoint)?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
            query.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint_url(endpoint, params)?;
        debug!("Requesting YouTube endpoint: {}", endpoint);

        // The request URL carries the API key, keep it out of error messages
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FilterError::Http(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(FilterError::Api { status, message });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FilterError::Http(e.without_url()))
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn search(&self, term: &str, limit: usize, published_after: &str) -> Result<Vec<String>> {
        let params = [
            ("part", "snippet".to_string()),
            ("q", term.to_string()),
            ("type", "video".to_string()),
            ("maxResults", limit.min(MAX_PAGE_SIZE).to_string()),
            ("order", "date".to_string()),
            ("publishedAfter", published_after.to_string()),
        ];

        let response: SearchResponse = self.get_json("search", &params).await?;
        Ok(response.video_ids())
    }

    async fn fetch_metadata(&self, id: &str) -> Result<Option<VideoMetadata>> {
        let params = [
            ("part", "snippet,contentDetails".to_string()),
            ("id", id.to_string()),
        ];

        let response: VideoListResponse = self.get_json("videos", &params).await?;
        Ok(response.into_metadata())
    }

    async fn fetch_comments(&self, id: &str, limit: usize) -> Result<Vec<String>> {
        let params = [
            ("part", "snippet".to_string()),
            ("videoId", id.to_string()),
            ("maxResults", limit.min(MAX_PAGE_SIZE).to_string()),
            ("order", "relevance".to_string()),
        ];

        let response: CommentThreadListResponse = self.get_json("commentThreads", &params).await?;
        Ok(response.comments())
    }

    fn platform_name(&self) -> &str {
        "youtube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> YouTubeConfig {
        YouTubeConfig {
            api_key: api_key.map(String::from),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            timeout_seconds: 10,
        }
    }

    #[test]
    fn test_missing_api_key_rejected() {
        assert!(YouTubeClient::new(&config(None)).is_err());
        assert!(YouTubeClient::new(&config(Some("  "))).is_err());
    }

    #[test]
    fn test_endpoint_url() {
        let client = YouTubeClient::new(&config(Some("secret"))).unwrap();
        let url = client
            .endpoint_url("search", &[("q", "tech review".to_string())])
            .unwrap();

        assert_eq!(url.path(), "/youtube/v3/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("q".to_string(), "tech review".to_string()));
        assert_eq!(pairs[1], ("key".to_string(), "secret".to_string()));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let config = YouTubeConfig {
            api_key: Some("SUPERSECRETKEY".to_string()),
            // Discard port, nothing listens there
            base_url: "http://127.0.0.1:9/youtube/v3".to_string(),
            timeout_seconds: 2,
        };
        let client = YouTubeClient::new(&config).unwrap();

        let err = client.fetch_metadata("abc").await.unwrap_err();
        assert!(matches!(err, FilterError::Http(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));

        let err = client.search("tech review", 5, "2024-01-01T00:00:00Z").await.unwrap_err();
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{"items": [
            {"id": {"kind": "youtube#video", "videoId": "abc"}},
            {"id": {"kind": "youtube#channel", "channelId": "chan"}},
            {"id": {"kind": "youtube#video", "videoId": "def"}}
        ]}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.video_ids(), vec!["abc", "def"]);
    }

    #[test]
    fn test_parse_video_response() {
        let json = r#"{"items": [{
            "id": "abc",
            "snippet": {"title": "Haul", "description": "New stuff"},
            "contentDetails": {"duration": "PT42S"}
        }]}"#;
        let response: VideoListResponse = serde_json::from_str(json).unwrap();
        let metadata = response.into_metadata().unwrap();

        assert_eq!(metadata.id, "abc");
        assert_eq!(metadata.title, "Haul");
        assert_eq!(metadata.duration, "PT42S");

        let empty: VideoListResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(empty.into_metadata().is_none());
    }

    #[test]
    fn test_parse_comment_response() {
        let json = r#"{"items": [
            {"snippet": {"topLevelComment": {"snippet": {"textDisplay": "Where to buy?"}}}},
            {"snippet": {"topLevelComment": {"snippet": {"textDisplay": "Nice"}}}}
        ]}"#;
        let response: CommentThreadListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.comments(), vec!["Where to buy?", "Nice"]);
    }
}
