use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::{DetectorReport, Evidence, ProductDetector};
use crate::error::Result;

/// Pattern categories for better organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatternCategory {
    Brand,
    ShoppingIntent,
    ContentType,
    Ecommerce,
    Pricing,
    Affiliate,
    Custom,
}

impl PatternCategory {
    fn from_header(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "brand" | "brands" => PatternCategory::Brand,
            "shopping" | "shopping_intent" => PatternCategory::ShoppingIntent,
            "content" | "content_type" => PatternCategory::ContentType,
            "ecommerce" | "e-commerce" => PatternCategory::Ecommerce,
            "pricing" => PatternCategory::Pricing,
            "affiliate" => PatternCategory::Affiliate,
            _ => PatternCategory::Custom,
        }
    }
}

/// A single case-insensitive rule; its identifier is the rule text itself
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub rule: String,
    pub category: PatternCategory,
    regex: Regex,
}

impl PatternRule {
    pub fn new(rule: &str, category: PatternCategory) -> Result<Self> {
        let regex = RegexBuilder::new(rule).case_insensitive(true).build()?;
        Ok(Self {
            rule: rule.to_string(),
            category,
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

const DEFAULT_RULES: &[(PatternCategory, &[&str])] = &[
    (
        PatternCategory::Brand,
        &[
            r"iphone\s*\d+",
            r"galaxy\s*s\d+",
            r"macbook\s*(pro|air)?",
            r"airpods?\s*(pro|max)?",
            r"nike",
            r"adidas",
        ],
    ),
    (
        PatternCategory::ShoppingIntent,
        &[
            r"buy\s+now",
            r"shop\s+here",
            r"get\s+yours?",
            r"order\s+now",
            r"link\s+in\s+bio",
            r"swipe\s+up",
        ],
    ),
    (
        PatternCategory::ContentType,
        &[r"product\s+review", r"unboxing", r"haul", r"first\s+impressions?"],
    ),
    (
        PatternCategory::Ecommerce,
        &[
            r"amazon\.com",
            r"amzn\.to",
            r"etsy\.com",
            r"shopify\.com",
            r"walmart\.com",
            r"target\.com",
            r"bestbuy\.com",
        ],
    ),
    (
        PatternCategory::Pricing,
        &[r"(\$|€|£)\d+(\.\d{2})?", r"discount", r"sale", r"deal", r"\d+%\s*off"],
    ),
    (
        PatternCategory::Affiliate,
        &[r"affiliate\s+link", r"sponsored", r"#ad", r"promo\s*code"],
    ),
];

/// Ordered, immutable list of lexical product rules
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    rules: Vec<PatternRule>,
}

impl PatternLibrary {
    /// Library with the built-in rule set
    pub fn new() -> Self {
        let mut rules = Vec::new();
        for (category, patterns) in DEFAULT_RULES {
            for pattern in *patterns {
                // Built-in rules are literals covered by the tests below.
                let rule = PatternRule::new(pattern, *category).expect("built-in pattern is valid");
                rules.push(rule);
            }
        }
        Self { rules }
    }

    /// Library with no rules, for assembling a custom set
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Built-in rules followed by the rules in a patterns file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let mut library = Self::new();
        library.extend_from_str(&content)?;
        info!("🧩 Loaded extra product patterns from: {}", path.as_ref().display());
        Ok(library)
    }

    /// Append a rule at the end of the library. Duplicate rule texts are ignored.
    pub fn add_rule(&mut self, category: PatternCategory, rule: &str) -> Result<()> {
        if self.contains_rule(rule) {
            return Ok(());
        }
        self.rules.push(PatternRule::new(rule, category)?);
        Ok(())
    }

    /// Parse a patterns file: `[category]` headers, `#` comments, one regex per line
    pub fn extend_from_str(&mut self, content: &str) -> Result<()> {
        let mut current_category = PatternCategory::Custom;

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_category = PatternCategory::from_header(&line[1..line.len() - 1]);
                continue;
            }

            self.add_rule(current_category, line)?;
        }

        Ok(())
    }

    pub fn contains_rule(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r.rule == rule)
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule texts of every rule that occurs anywhere in `text`, in library order
    pub fn find_matches(&self, text: &str) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| rule.is_match(text))
            .map(|rule| rule.rule.clone())
            .collect()
    }

    pub fn get_stats(&self) -> PatternLibraryStats {
        let mut category_counts: HashMap<PatternCategory, usize> = HashMap::new();
        for rule in &self.rules {
            *category_counts.entry(rule.category).or_insert(0) += 1;
        }

        PatternLibraryStats {
            total_rules: self.rules.len(),
            category_counts,
        }
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the pattern library
#[derive(Debug, Clone)]
pub struct PatternLibraryStats {
    pub total_rules: usize,
    pub category_counts: HashMap<PatternCategory, usize>,
}

/// Detector that reports every matching rule of a pattern library
#[derive(Debug, Clone)]
pub struct PatternDetector {
    library: PatternLibrary,
}

impl PatternDetector {
    pub fn new(library: PatternLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn matches(&self, text: &str) -> Vec<String> {
        self.library.find_matches(text)
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new(PatternLibrary::new())
    }
}

impl ProductDetector for PatternDetector {
    fn name(&self) -> &str {
        "patterns"
    }

    fn detect(&self, text: &str) -> DetectorReport {
        DetectorReport {
            detector: self.name().to_string(),
            evidence: Evidence::Patterns(self.matches(text)),
        }
    }
}
