use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Identifiers already processed during the current run.
///
/// Grows monotonically and is dropped when the run ends; an identifier is
/// never run through the pipeline twice in the same run.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identifier; returns false if it was already present
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Identifiers not yet seen, in first-occurrence order and without repeats
    pub fn filter_new(&self, ids: &[String]) -> Vec<String> {
        let mut batch = HashSet::new();
        ids.iter()
            .filter(|id| !self.contains(id) && batch.insert(id.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Aggregate counters for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Search terms queried
    pub terms_searched: usize,
    /// Identifiers returned by search, before dedup
    pub candidates_examined: usize,
    /// Identifiers dropped because they were already seen
    pub duplicates_skipped: usize,
    /// Identifiers run through the candidate pipeline
    pub pipeline_invocations: usize,
    /// Candidates whose metadata could not be fetched
    pub unavailable: usize,
    /// Candidates that passed the duration gate
    pub shorts_identified: usize,
    /// Shorts retained by at least one detector
    pub products_detected: usize,
    /// Platform requests issued: searches, metadata and comment fetches
    pub api_calls: usize,
    /// Time spent inside the candidate pipeline, summed over invocations
    #[serde(with = "duration_secs")]
    pub processing_time: Duration,
    /// Wall-clock time of the run
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl RunStats {
    /// Mean pipeline time per invocation, zero before the first one
    pub fn average_processing_time(&self) -> Duration {
        match u32::try_from(self.pipeline_invocations) {
            Ok(0) => Duration::ZERO,
            Ok(count) => self.processing_time / count,
            Err(_) => Duration::from_secs_f64(
                self.processing_time.as_secs_f64() / self.pipeline_invocations as f64,
            ),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Run statistics:\n\
            - Terms searched: {}\n\
            - Candidates examined: {}\n\
            - Duplicates skipped: {}\n\
            - Pipeline invocations: {}\n\
            - Unavailable: {}\n\
            - Shorts identified: {}\n\
            - Products detected: {}\n\
            - API calls: {}\n\
            - Processing time: {:.2}s (avg {:.3}s per video)\n\
            - Elapsed: {:.2}s",
            self.terms_searched,
            self.candidates_examined,
            self.duplicates_skipped,
            self.pipeline_invocations,
            self.unavailable,
            self.shorts_identified,
            self.products_detected,
            self.api_calls,
            self.processing_time.as_secs_f64(),
            self.average_processing_time().as_secs_f64(),
            self.elapsed.as_secs_f64()
        )
    }
}

pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
