//! Core data types for the Daybook knowledge layer
//!
//! Raw activity events come in from upstream collectors, get classified into
//! [`StructuredEvent`]s, and are then analyzed for patterns. None of these
//! types outlive a single pipeline run; the only persisted value is the
//! topic history in [`crate::recurrence`].

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum topics kept on a classified event
pub const MAX_EVENT_TOPICS: usize = 3;

/// Maximum entities kept on a classified event
pub const MAX_EVENT_ENTITIES: usize = 5;

/// Maximum summary length in characters
pub const MAX_SUMMARY_CHARS: usize = 120;

/// Fixed confidence for rule classification, kept below anything the LLM path reports
pub const RULE_CONFIDENCE: f32 = 0.3;

/// Where an activity event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    Browser,
    Search,
    AiAssistant,
    Commit,
}

impl ActivitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivitySource::Browser => "browser",
            ActivitySource::Search => "search",
            ActivitySource::AiAssistant => "ai_assistant",
            ActivitySource::Commit => "commit",
        }
    }
}

impl std::fmt::Display for ActivitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse label for what the user was doing
///
/// Declaration order doubles as the tie-break order for plurality votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Implementation,
    Debugging,
    Research,
    Learning,
    Review,
    Architecture,
    Writing,
    Planning,
    Communication,
    Browsing,
    Admin,
    Unknown,
}

impl ActivityType {
    pub const ALL: [ActivityType; 12] = [
        ActivityType::Implementation,
        ActivityType::Debugging,
        ActivityType::Research,
        ActivityType::Learning,
        ActivityType::Review,
        ActivityType::Architecture,
        ActivityType::Writing,
        ActivityType::Planning,
        ActivityType::Communication,
        ActivityType::Browsing,
        ActivityType::Admin,
        ActivityType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Implementation => "implementation",
            ActivityType::Debugging => "debugging",
            ActivityType::Research => "research",
            ActivityType::Learning => "learning",
            ActivityType::Review => "review",
            ActivityType::Architecture => "architecture",
            ActivityType::Writing => "writing",
            ActivityType::Planning => "planning",
            ActivityType::Communication => "communication",
            ActivityType::Browsing => "browsing",
            ActivityType::Admin => "admin",
            ActivityType::Unknown => "unknown",
        }
    }

    /// Lenient parse used for LLM output; anything unrecognized is `Unknown`
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .unwrap_or(ActivityType::Unknown)
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the user was doing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Compare,
    Implement,
    Evaluate,
    Read,
    Troubleshoot,
    Configure,
    Explore,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::Compare,
        Intent::Implement,
        Intent::Evaluate,
        Intent::Read,
        Intent::Troubleshoot,
        Intent::Configure,
        Intent::Explore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Compare => "compare",
            Intent::Implement => "implement",
            Intent::Evaluate => "evaluate",
            Intent::Read => "read",
            Intent::Troubleshoot => "troubleshoot",
            Intent::Configure => "configure",
            Intent::Explore => "explore",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|i| i.as_str() == normalized)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common shape every upstream record is normalized into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivityEvent {
    /// `None` when the upstream timestamp was missing or unparseable
    pub timestamp: Option<DateTime<FixedOffset>>,

    pub source: ActivitySource,

    /// Text projection used by every classifier
    pub text: String,

    /// Domain category assigned upstream (e.g. "dev", "shopping")
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RawActivityEvent {
    pub fn new(
        timestamp: Option<DateTime<FixedOffset>>,
        source: ActivitySource,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            source,
            text: text.into(),
            category: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// A classified activity event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredEvent {
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub source: ActivitySource,
    pub activity_type: ActivityType,

    /// At most [`MAX_EVENT_TOPICS`]
    pub topics: Vec<String>,

    /// At most [`MAX_EVENT_ENTITIES`]
    pub entities: Vec<String>,

    pub intent: Intent,

    /// In [0, 1]
    pub confidence: f32,

    #[serde(default)]
    pub category: Option<String>,

    /// At most [`MAX_SUMMARY_CHARS`] characters
    pub summary: String,
}

impl StructuredEvent {
    /// Wall-clock hour in the offset the event was recorded in
    pub fn local_hour(&self) -> Option<u32> {
        self.timestamp.map(|ts| ts.hour())
    }
}

/// Output of the classification engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Same order as the submitted raw events
    pub events: Vec<StructuredEvent>,
    pub total_processed: usize,
    pub llm_classified: usize,
    pub rule_classified: usize,
    pub processing_time_ms: u64,
}
