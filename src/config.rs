use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{FilterError, Result};
use crate::platform::{DEFAULT_DAYS_BACK, MAX_PAGE_SIZE};

/// Configuration for the shorts product filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// YouTube Data API settings
    pub youtube: YouTubeConfig,

    /// Search settings
    pub search: SearchConfig,

    /// Detector settings
    pub detection: DetectionConfig,

    /// Pacing settings
    pub performance: PerformanceConfig,

    /// Output and export settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// API key for the YouTube Data API v3
    pub api_key: Option<String>,

    /// Base URL of the API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search terms used when none are given on the command line
    pub default_terms: Vec<String>,

    /// Maximum search results per term
    pub max_results_per_term: usize,

    /// Only consider videos published within this many days
    pub days_back: i64,

    /// Number of top comments added to the analysed text
    pub comment_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Path to the logistic regression artifact (JSON)
    pub model_path: PathBuf,

    /// Path to the TF-IDF vectorizer artifact (JSON)
    pub vectorizer_path: PathBuf,

    /// Optional file with extra product patterns
    pub patterns_file: Option<PathBuf>,

    /// Longest video, in seconds, still treated as a Short
    pub shorts_max_seconds: u64,

    /// Descriptions longer than this are truncated in results
    pub description_max_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Delay between successive candidates, in milliseconds
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for exported results
    pub base_dir: PathBuf,

    /// Write a JSON export after each run
    pub export_json: bool,

    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = ["shorts-filter.toml", "config/shorts-filter.toml"];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config.apply_env_api_key();
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_api_key();

        if let Ok(max_results) = std::env::var("SHORTS_FILTER_MAX_RESULTS") {
            config.search.max_results_per_term = max_results.parse().unwrap_or(20);
        }

        if let Ok(days) = std::env::var("SHORTS_FILTER_DAYS_BACK") {
            config.search.days_back = days.parse().unwrap_or(DEFAULT_DAYS_BACK);
        }

        if let Ok(delay) = std::env::var("SHORTS_FILTER_REQUEST_DELAY_MS") {
            config.performance.request_delay_ms = delay.parse().unwrap_or(100);
        }

        if let Ok(model_path) = std::env::var("SHORTS_FILTER_MODEL_PATH") {
            config.detection.model_path = PathBuf::from(model_path);
        }

        if let Ok(vectorizer_path) = std::env::var("SHORTS_FILTER_VECTORIZER_PATH") {
            config.detection.vectorizer_path = PathBuf::from(vectorizer_path);
        }

        if let Ok(output_dir) = std::env::var("SHORTS_FILTER_OUTPUT_DIR") {
            config.output.base_dir = PathBuf::from(output_dir);
        }

        if let Ok(log_level) = std::env::var("SHORTS_FILTER_LOG_LEVEL") {
            config.output.log_level = log_level;
        }

        Ok(config)
    }

    /// The API key is a secret and may live in the environment only
    fn apply_env_api_key(&mut self) {
        if let Ok(api_key) = std::env::var("YOUTUBE_API_KEY") {
            if !api_key.trim().is_empty() {
                self.youtube.api_key = Some(api_key);
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results_per_term == 0 {
            return Err(FilterError::Configuration(
                "max_results_per_term must be greater than 0".to_string(),
            ));
        }

        if self.search.max_results_per_term > MAX_PAGE_SIZE {
            return Err(FilterError::Configuration(format!(
                "max_results_per_term must be at most {} (one search page)",
                MAX_PAGE_SIZE
            )));
        }

        if self.search.days_back < 0 {
            return Err(FilterError::Configuration("days_back must not be negative".to_string()));
        }

        if self.detection.description_max_chars == 0 {
            return Err(FilterError::Configuration(
                "description_max_chars must be greater than 0".to_string(),
            ));
        }

        if self.youtube.timeout_seconds == 0 {
            return Err(FilterError::Configuration(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        url::Url::parse(&self.youtube.base_url)?;

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Shorts Product Filter Configuration:\n\
            - API key configured: {}\n\
            - Max results per term: {}\n\
            - Days back: {}\n\
            - Comments per video: {}\n\
            - Shorts threshold: {}s\n\
            - Model artifact: {}\n\
            - Request delay: {}ms\n\
            - Output directory: {}",
            self.youtube.api_key.is_some(),
            self.search.max_results_per_term,
            self.search.days_back,
            self.search.comment_limit,
            self.detection.shorts_max_seconds,
            self.detection.model_path.display(),
            self.performance.request_delay_ms,
            self.output.base_dir.display()
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YouTubeConfig {
                api_key: None,
                base_url: "https://www.googleapis.com/youtube/v3".to_string(),
                timeout_seconds: 30,
            },
            search: SearchConfig {
                default_terms: vec![
                    "amazon finds".to_string(),
                    "tech review".to_string(),
                    "product unboxing".to_string(),
                    "must have gadgets".to_string(),
                ],
                max_results_per_term: 20,
                days_back: DEFAULT_DAYS_BACK,
                comment_limit: 3,
            },
            detection: DetectionConfig {
                model_path: PathBuf::from("models/product_model.json"),
                vectorizer_path: PathBuf::from("models/tfidf_vectorizer.json"),
                patterns_file: None,
                shorts_max_seconds: 60,
                description_max_chars: 200,
            },
            performance: PerformanceConfig {
                request_delay_ms: 100,
            },
            output: OutputConfig {
                base_dir: PathBuf::from("./output"),
                export_json: true,
                log_level: "info".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.youtube.api_key = Some(api_key);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.config.search.max_results_per_term = max_results;
        self
    }

    pub fn with_days_back(mut self, days: i64) -> Self {
        self.config.search.days_back = days;
        self
    }

    pub fn with_comment_limit(mut self, limit: usize) -> Self {
        self.config.search.comment_limit = limit;
        self
    }

    pub fn with_request_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.performance.request_delay_ms = delay_ms;
        self
    }

    pub fn with_artifacts(mut self, model_path: PathBuf, vectorizer_path: PathBuf) -> Self {
        self.config.detection.model_path = model_path;
        self.config.detection.vectorizer_path = vectorizer_path;
        self
    }

    pub fn with_patterns_file(mut self, path: PathBuf) -> Self {
        self.config.detection.patterns_file = Some(path);
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn enable_export(mut self, enable: bool) -> Self {
        self.config.output.export_json = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
