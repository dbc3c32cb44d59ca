use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shorts_product_filter::detection::{LogisticModel, TfidfVectorizer, TrainedArtifact};
use shorts_product_filter::{
    BatchProcessor, Config, DemoPlatform, DurationClassifier, PatternDetector, ProductDetector,
    StatisticalClassifier,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

const PRODUCT_TEXT: &str = "Unboxing the new iPhone 15 Pro Max! #shorts Check out my unboxing of the latest \
    iPhone 15 Pro Max. Link in bio to buy now! Use code SAVE10 for discount. Where did you buy this?";
const PLAIN_TEXT: &str = "Beautiful sunset timelapse #shorts Captured this amazing sunset from my balcony. \
    Nature is beautiful! Gorgeous! Amazing colors";

/// Benchmark duration token parsing
fn bench_duration(c: &mut Criterion) {
    let durations = DurationClassifier::new();

    c.bench_function("duration_classify", |b| {
        b.iter(|| {
            for token in ["PT45S", "PT1M", "PT1M30S", "PT2H5M", "P1D"] {
                black_box(durations.classify(black_box(token)));
            }
        })
    });
}

/// Benchmark the built-in pattern library on matching and non-matching text
fn bench_patterns(c: &mut Criterion) {
    let detector = PatternDetector::default();

    c.bench_function("patterns_product_text", |b| {
        b.iter(|| detector.matches(black_box(PRODUCT_TEXT)))
    });

    c.bench_function("patterns_plain_text", |b| {
        b.iter(|| detector.matches(black_box(PLAIN_TEXT)))
    });
}

/// Benchmark TF-IDF vectorization plus logistic scoring
fn bench_classifier(c: &mut Criterion) {
    let vectorizer = TfidfVectorizer::from_json(
        r#"{"ngram_range": [1, 2], "vocabulary": {"iphone": 0, "unboxing": 1, "buy": 2, "sunset": 3, "buy this": 4},
            "idf": [1.2, 1.4, 1.1, 1.6, 2.0]}"#,
    )
    .unwrap();
    let model = LogisticModel::from_json(
        r#"{"classes": [0, 1], "coef": [1.5, 1.2, 0.9, -2.0, 0.7], "intercept": -0.3}"#,
    )
    .unwrap();
    let classifier = StatisticalClassifier::with_artifact(TrainedArtifact::new(vectorizer, model).unwrap());

    c.bench_function("classifier_detect", |b| {
        b.iter(|| classifier.detect(black_box(PRODUCT_TEXT)))
    });
}

/// Benchmark a full offline run over the demo platform
fn bench_demo_run(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut config = Config::default();
    config.performance.request_delay_ms = 0;
    config.detection.model_path = "nonexistent/model.json".into();
    config.detection.vectorizer_path = "nonexistent/vectorizer.json".into();

    let processor = rt
        .block_on(BatchProcessor::new(config, Arc::new(DemoPlatform::new())))
        .unwrap();
    let terms = vec!["shorts".to_string(), "review".to_string()];

    c.bench_function("demo_batch_run", |b| {
        b.iter(|| {
            rt.block_on(async { black_box(processor.run(black_box(&terms)).await) })
        })
    });
}

criterion_group!(benches, bench_duration, bench_patterns, bench_classifier, bench_demo_run);
criterion_main!(benches);
