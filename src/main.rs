use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use shorts_product_filter::{BatchProcessor, Config, DemoPlatform, VideoPlatform, YouTubeClient};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Shorts Product Filter")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Finds YouTube Shorts that mention commercial products")
        .arg(
            Arg::new("terms")
                .value_name("TERM")
                .help("Search terms (defaults to the configured terms)")
                .num_args(0..)
        )
        .arg(
            Arg::new("max-results")
                .short('n')
                .long("max-results")
                .value_name("NUM")
                .help("Maximum search results per term")
                .value_parser(clap::value_parser!(usize))
        )
        .arg(
            Arg::new("days")
                .short('d')
                .long("days")
                .value_name("DAYS")
                .help("Only consider videos published within this many days")
                .value_parser(clap::value_parser!(i64))
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for exported results")
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("Use the built-in demo videos instead of the YouTube API")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("no-export")
                .long("no-export")
                .help("Do not write a JSON export")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
        )
        .get_matches();

    // Load configuration once and inject it everywhere
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    let verbose = matches.get_flag("verbose");
    let filter = if verbose {
        "shorts_product_filter=debug,warn".to_string()
    } else {
        format!("shorts_product_filter={},warn", config.output.log_level)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(max_results) = matches.get_one::<usize>("max-results") {
        config.search.max_results_per_term = *max_results;
    }
    if let Some(days) = matches.get_one::<i64>("days") {
        config.search.days_back = *days;
    }
    if let Some(output_dir) = matches.get_one::<String>("output-dir") {
        config.output.base_dir = PathBuf::from(output_dir);
    }
    if matches.get_flag("no-export") {
        config.output.export_json = false;
    }

    config.validate()?;
    info!("{}", config.summary());

    let demo = matches.get_flag("demo");
    let terms: Vec<String> = match matches.get_many::<String>("terms") {
        Some(values) => values.cloned().collect(),
        None if demo => vec!["shorts".to_string()],
        None => config.search.default_terms.clone(),
    };

    if terms.is_empty() {
        error!("No search terms given");
        return Err(anyhow::anyhow!("No search terms given"));
    }

    let platform: Arc<dyn VideoPlatform> = if demo {
        info!("🎬 Demo mode: using built-in sample videos");
        Arc::new(DemoPlatform::new())
    } else {
        match YouTubeClient::new(&config.youtube) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!("Cannot create YouTube client: {}", e);
                warn!("💡 Set YOUTUBE_API_KEY or run with --demo");
                return Err(e.into());
            }
        }
    };

    info!("🚀 Shorts Product Filter starting...");
    info!("🔍 Search terms: {}", terms.join(", "));

    let output_dir = config.output.base_dir.clone();
    let export = config.output.export_json;

    let processor = BatchProcessor::new(config, platform).await?;
    let batch = processor.run(&terms).await;

    info!("🎉 Run completed in {:.2}s", batch.stats.elapsed.as_secs_f64());
    info!("{}", batch.stats.summary());

    for (i, result) in batch.results.iter().enumerate() {
        info!("{}. {}", i + 1, result.title);
        info!("   URL: {}", result.url);
        info!("   Patterns: {}", result.matched_patterns.join(", "));
        match result.ml_confidence {
            Some(confidence) => info!("   Classifier: {} ({:.1}%)", result.ml_label, confidence * 100.0),
            None => info!("   Classifier: {}", result.ml_status),
        }
    }

    if export {
        batch.export_json(&output_dir).await?;
    }

    Ok(())
}
