use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use shorts_product_filter::{
    Config, DurationClassifier, PatternDetector, PatternLibrary, ProductDetector, StatisticalClassifier,
};

#[derive(Parser)]
#[command(name = "check-text")]
#[command(about = "Run the product detectors on a piece of text")]
struct Cli {
    /// Text to analyse (title, description and comments)
    text: String,

    /// Optional duration token to check against the Shorts threshold, e.g. PT45S
    #[arg(long)]
    duration: Option<String>,

    /// Extra patterns file
    #[arg(long)]
    patterns: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("shorts_product_filter=info,check_text=info")
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    let library = match cli.patterns.or(config.detection.patterns_file.clone()) {
        Some(path) => PatternLibrary::from_file(path).await?,
        None => PatternLibrary::new(),
    };
    let patterns = PatternDetector::new(library);
    let classifier =
        StatisticalClassifier::load(&config.detection.model_path, &config.detection.vectorizer_path).await;

    if let Some(token) = cli.duration.as_deref() {
        let durations = DurationClassifier::with_threshold(config.detection.shorts_max_seconds);
        let class = durations.classify(token);
        match class.seconds() {
            Some(seconds) => info!("⏱️ Duration {}: {}s, short: {}", token, seconds, class.is_short()),
            None => warn!("⏱️ Duration {} is not a recognised duration token", token),
        }
    }

    let detectors: [&dyn ProductDetector; 2] = [&patterns, &classifier];
    let mut positive = false;

    for detector in detectors {
        let report = detector.detect(&cli.text);
        positive |= report.is_positive();
        info!("🔎 {}: {:?}", detector.name(), report.evidence);
    }

    if positive {
        info!("✅ Product mention detected");
    } else {
        info!("❌ No product mention detected");
    }

    Ok(())
}
