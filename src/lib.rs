//! Daybook - Personal Activity Knowledge Layer
//!
//! The analytical core of a daily digest pipeline. It turns raw activity
//! (browser visits, searches, AI-assistant sessions, commits) into:
//! - Classified events with activity type, intent, topics, and entities
//! - Hour-based activity clusters and a bounded focus score
//! - Topic co-occurrence and entity relation graphs
//! - Day-over-day topic trends against a persisted history
//! - Commit work units grouped by session, repository, and work mode
//!
//! # Architecture
//!
//! - **Classification**: rule engine plus an optional LLM batch path that
//!   falls back to rules one batch at a time
//! - **Patterns**: clustering, co-occurrence, focus, distribution
//! - **Recurrence**: `TopicHistory` in, `TopicHistory` out
//! - **Commits**: conventional-commit parsing, work modes, sessions
//!
//! The crate owns no I/O beyond the optional LLM HTTP call. Loading and
//! saving the topic history is left to the host.
//!
//! # Example
//!
//! ```ignore
//! use daybook_core::{classify_events, extract_patterns, DaybookConfig, TopicHistory};
//!
//! #[tokio::main]
//! async fn main() -> daybook_core::Result<()> {
//!     let config = DaybookConfig::from_file("daybook.toml")?;
//!     let history = TopicHistory::load_or_default(&std::fs::read_to_string("history.json")?);
//!
//!     let result = classify_events(&bundle.to_raw_events(), &config.classification).await;
//!     let today = chrono::Local::now().date_naive();
//!     let analysis = extract_patterns(&result, &config.patterns, &history, today);
//!
//!     let topics = daybook_core::patterns::daily_topics(&result.events);
//!     let next = daybook_core::recurrence::update_topic_history(&history, &topics, today);
//!     std::fs::write("history.json", next.to_json_string()?)?;
//!     Ok(())
//! }
//! ```

pub mod classification;
pub mod commits;
pub mod config;
pub mod error;
pub mod logging;
pub mod patterns;
pub mod recurrence;
pub mod types;
pub mod utils;
pub mod vocabulary;

// Re-export commonly used types
pub use classification::{
    classifier_from_config, classify_events, ActivityBundle, EventClassifier, LlmBackend,
    LlmClassifier, RuleClassifier,
};
pub use commits::{extract_work_units, CommitWorkUnit, WorkMode};
pub use config::{ClassificationConfig, DaybookConfig, PatternConfig};
pub use error::{ConfigError, DaybookError, Result};
pub use patterns::{extract_patterns, PatternAnalysis};
pub use recurrence::{KnowledgeDelta, RecurrenceSignal, TopicHistory, Trend};
pub use types::{
    ActivitySource, ActivityType, ClassificationResult, Intent, RawActivityEvent, StructuredEvent,
};
