//! Day-over-day topic recurrence
//!
//! The host loads a [`TopicHistory`] before a run and saves the value
//! returned by [`update_topic_history`] afterwards. Nothing here touches the
//! filesystem, and the history passed in is never mutated.

use crate::error::{DaybookError, Result};
use crate::patterns::cooccurrence::TopicCooccurrence;
use crate::utils::normalize_key;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// Current persisted schema version
pub const HISTORY_VERSION: u32 = 1;

/// Most dates kept in [`TopicRecord::recent_days`]
pub const MAX_RECENT_DAYS: usize = 30;

/// Days of history kept in [`TopicRecord::recent_days`]
pub const RECENT_DAYS_WINDOW: i64 = 30;

/// Trailing window used for frequency-based trends
pub const TREND_WINDOW_DAYS: i64 = 14;

/// A topic unseen for longer than this is "returning"
pub const RETURNING_GAP_DAYS: i64 = 7;

const STABLE_MIN_DAYS: usize = 5;
const RISING_MIN_DAYS: usize = 3;

pub const MAX_NOVEL_ENTITIES: usize = 10;
pub const MAX_CONNECTIONS: usize = 8;

/// Per-topic history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRecord {
    /// Never changes once set
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    /// Distinct days the topic has been seen
    pub day_count: u32,
    /// Sorted, within the trailing 30 days, at most 30 entries
    #[serde(default)]
    pub recent_days: Vec<NaiveDate>,
}

impl TopicRecord {
    fn first_seen_on(day: NaiveDate) -> Self {
        Self {
            first_seen: day,
            last_seen: day,
            day_count: 0,
            recent_days: Vec::new(),
        }
    }

    /// Distinct days within `[today - 13, today]`, counting today
    pub fn frequency(&self, today: NaiveDate) -> usize {
        let window_start = today - Duration::days(TREND_WINDOW_DAYS - 1);
        let mut days: BTreeSet<NaiveDate> = self
            .recent_days
            .iter()
            .copied()
            .filter(|d| *d >= window_start && *d <= today)
            .collect();
        days.insert(today);
        days.len()
    }
}

/// Persisted multi-day topic history, keyed by normalized topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicHistory {
    pub version: u32,
    #[serde(default)]
    pub topics: BTreeMap<String, TopicRecord>,
}

impl Default for TopicHistory {
    fn default() -> Self {
        Self {
            version: HISTORY_VERSION,
            topics: BTreeMap::new(),
        }
    }
}

impl TopicHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a persisted history, rejecting unknown versions
    pub fn from_json_str(json: &str) -> Result<Self> {
        let history: TopicHistory = serde_json::from_str(json)?;
        if history.version != HISTORY_VERSION {
            return Err(DaybookError::Other(format!(
                "Unsupported topic history version {} (expected {})",
                history.version, HISTORY_VERSION
            )));
        }
        Ok(history)
    }

    /// Parse a persisted history, starting fresh if it can't be used
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json_str(json) {
            Ok(history) => history,
            Err(e) => {
                warn!("Discarding unusable topic history: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, topic: &str) -> Option<&TopicRecord> {
        self.topics.get(&normalize_key(topic))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Trend of a topic across days
///
/// Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    New,
    Returning,
    Rising,
    Stable,
    Declining,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::New => "new",
            Trend::Returning => "returning",
            Trend::Rising => "rising",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceSignal {
    pub topic: String,
    /// Distinct days seen in the trailing 14 days, today included
    pub frequency: usize,
    pub trend: Trend,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub day_count: u32,
}

/// Classify one topic against the history as it stood before today
pub fn classify_topic(topic: &str, history: &TopicHistory, today: NaiveDate) -> RecurrenceSignal {
    let Some(record) = history.get(topic) else {
        return RecurrenceSignal {
            topic: topic.to_string(),
            frequency: 1,
            trend: Trend::New,
            first_seen: today,
            last_seen: today,
            day_count: 1,
        };
    };

    let frequency = record.frequency(today);
    let trend = if (today - record.last_seen).num_days() > RETURNING_GAP_DAYS {
        Trend::Returning
    } else if frequency >= STABLE_MIN_DAYS {
        Trend::Stable
    } else if frequency >= RISING_MIN_DAYS {
        Trend::Rising
    } else {
        Trend::Declining
    };

    RecurrenceSignal {
        topic: topic.to_string(),
        frequency,
        trend,
        first_seen: record.first_seen,
        last_seen: record.last_seen,
        day_count: record.day_count,
    }
}

/// Classify today's topics, sorted by trend then frequency (highest first)
pub fn compute_recurrence(
    topics: &[String],
    history: &TopicHistory,
    today: NaiveDate,
) -> Vec<RecurrenceSignal> {
    let mut seen = HashSet::new();
    let mut signals: Vec<RecurrenceSignal> = topics
        .iter()
        .filter(|t| seen.insert(normalize_key(t)))
        .map(|t| classify_topic(t, history, today))
        .collect();

    signals.sort_by(|a, b| {
        a.trend
            .cmp(&b.trend)
            .then(b.frequency.cmp(&a.frequency))
            .then_with(|| a.topic.cmp(&b.topic))
    });
    signals
}

fn prune_recent_days(record: &mut TopicRecord, today: NaiveDate) {
    let cutoff = today - Duration::days(RECENT_DAYS_WINDOW);
    record.recent_days.retain(|d| *d > cutoff && *d <= today);
    record.recent_days.sort();
    record.recent_days.dedup();
    if record.recent_days.len() > MAX_RECENT_DAYS {
        let excess = record.recent_days.len() - MAX_RECENT_DAYS;
        record.recent_days.drain(..excess);
    }
}

/// Record today's topics, returning the new history
///
/// `day_count` grows at most once per calendar day, so re-running a day is
/// harmless. Every record's `recent_days` is pruned, touched or not.
pub fn update_topic_history(history: &TopicHistory, topics: &[String], today: NaiveDate) -> TopicHistory {
    let mut updated = history.clone();
    updated.version = HISTORY_VERSION;

    for topic in topics {
        let key = normalize_key(topic);
        if key.is_empty() {
            continue;
        }

        let record = updated
            .topics
            .entry(key)
            .or_insert_with(|| TopicRecord::first_seen_on(today));

        if !record.recent_days.contains(&today) {
            record.recent_days.push(today);
            record.day_count += 1;
        }
        record.last_seen = record.last_seen.max(today);
    }

    for record in updated.topics.values_mut() {
        prune_recent_days(record, today);
    }

    debug!(
        "Topic history updated: {} topics today, {} tracked",
        topics.len(),
        updated.topics.len()
    );
    updated
}

/// A new topic that showed up alongside a recurring one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicConnection {
    pub new_topic: String,
    pub recurring_topic: String,
    pub strength: f64,
}

/// What changed in the knowledge layer today
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDelta {
    pub new_topics: Vec<String>,
    pub recurring_topics: Vec<String>,
    /// Entities not found inside any recurring topic name
    pub novel_entities: Vec<String>,
    pub connections: Vec<TopicConnection>,
}

/// Derive the knowledge delta from recurrence signals
///
/// Entity novelty is a substring check against recurring topic names, not a
/// lookup in per-entity history.
pub fn compute_knowledge_delta(
    signals: &[RecurrenceSignal],
    entities: &[String],
    cooccurrences: &[TopicCooccurrence],
) -> KnowledgeDelta {
    let (new, recurring): (Vec<&RecurrenceSignal>, Vec<&RecurrenceSignal>) =
        signals.iter().partition(|s| s.trend == Trend::New);

    let new_topics: Vec<String> = new.iter().map(|s| s.topic.clone()).collect();
    let recurring_topics: Vec<String> = recurring.iter().map(|s| s.topic.clone()).collect();

    let recurring_keys: Vec<String> = recurring_topics.iter().map(|t| normalize_key(t)).collect();
    let new_keys: HashSet<String> = new_topics.iter().map(|t| normalize_key(t)).collect();

    let mut seen = HashSet::new();
    let novel_entities: Vec<String> = entities
        .iter()
        .filter(|e| {
            let key = normalize_key(e);
            !key.is_empty() && !recurring_keys.iter().any(|t| t.contains(&key)) && seen.insert(key)
        })
        .take(MAX_NOVEL_ENTITIES)
        .cloned()
        .collect();

    let recurring_set: HashSet<&String> = recurring_keys.iter().collect();
    let connections: Vec<TopicConnection> = cooccurrences
        .iter()
        .filter_map(|pair| {
            let a = normalize_key(&pair.topic_a);
            let b = normalize_key(&pair.topic_b);
            if new_keys.contains(&a) && recurring_set.contains(&b) {
                Some((pair.topic_a.clone(), pair.topic_b.clone(), pair.strength))
            } else if new_keys.contains(&b) && recurring_set.contains(&a) {
                Some((pair.topic_b.clone(), pair.topic_a.clone(), pair.strength))
            } else {
                None
            }
        })
        .take(MAX_CONNECTIONS)
        .map(|(new_topic, recurring_topic, strength)| TopicConnection {
            new_topic,
            recurring_topic,
            strength,
        })
        .collect();

    KnowledgeDelta {
        new_topics,
        recurring_topics,
        novel_entities,
        connections,
    }
}
