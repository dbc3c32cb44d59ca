use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest duration, in seconds, that still counts as a Short
pub const SHORTS_MAX_SECONDS: u64 = 60;

/// Outcome of classifying a platform duration token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationClass {
    /// At or under the Shorts threshold
    Short(u64),
    /// Over the threshold
    Long(u64),
    /// Token did not have the expected `PT..H..M..S` shape
    Unknown,
}

impl DurationClass {
    pub fn is_short(&self) -> bool {
        matches!(self, DurationClass::Short(_))
    }

    pub fn seconds(&self) -> Option<u64> {
        match self {
            DurationClass::Short(secs) | DurationClass::Long(secs) => Some(*secs),
            DurationClass::Unknown => None,
        }
    }
}

/// Parses the compact ISO-8601 duration subset returned by the video platform
/// (`PT1M30S`, `PT45S`, `PT2M`) and applies the Shorts threshold.
///
/// Every component is optional and defaults to zero, so the bare token `PT`
/// parses as zero seconds and classifies as short.
#[derive(Debug, Clone)]
pub struct DurationClassifier {
    pattern: Regex,
    max_seconds: u64,
}

impl DurationClassifier {
    pub fn new() -> Self {
        Self::with_threshold(SHORTS_MAX_SECONDS)
    }

    pub fn with_threshold(max_seconds: u64) -> Self {
        // Literal pattern; compiling it cannot fail.
        let pattern = Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$")
            .expect("duration pattern is valid");

        Self { pattern, max_seconds }
    }

    /// Total seconds encoded by the token, or `None` if it is not a duration
    pub fn total_seconds(&self, token: &str) -> Option<u64> {
        let captures = self.pattern.captures(token.trim())?;

        let component = |index: usize| -> Option<u64> {
            match captures.get(index) {
                Some(m) => m.as_str().parse::<u64>().ok(),
                None => Some(0),
            }
        };

        let hours = component(1)?;
        let minutes = component(2)?;
        let seconds = component(3)?;

        hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)
    }

    pub fn classify(&self, token: &str) -> DurationClass {
        match self.total_seconds(token) {
            Some(secs) if secs <= self.max_seconds => DurationClass::Short(secs),
            Some(secs) => DurationClass::Long(secs),
            None => DurationClass::Unknown,
        }
    }

    /// True iff the token parses and is within the threshold
    pub fn is_short(&self, token: &str) -> bool {
        self.classify(token).is_short()
    }
}

impl Default for DurationClassifier {
    fn default() -> Self {
        Self::new()
    }
}
