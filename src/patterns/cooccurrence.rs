//! Topic co-occurrence windows and entity relations

use crate::types::{ActivityType, StructuredEvent};
use crate::utils::normalize_key;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Maximum co-occurrence pairs reported
pub const MAX_COOCCURRENCES: usize = 20;

/// Maximum entity relations reported
pub const MAX_ENTITY_RELATIONS: usize = 15;

/// Minimum co-occurrences before an entity pair counts as a relation
pub const MIN_ENTITY_COOCCURRENCES: usize = 3;

/// Longest co-occurrence window honoured, one week
pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// Two topics seen together inside one time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCooccurrence {
    pub topic_a: String,
    pub topic_b: String,
    /// Pair count divided by the highest pair count of the run
    pub strength: f64,
    /// Number of windows containing both topics
    pub shared_events: usize,
    /// `HH:MM-HH:MM` span of the first window containing the pair
    pub window: String,
}

/// Two entities named together on the same events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRelation {
    pub entity_a: String,
    pub entity_b: String,
    pub cooccurrences: usize,
    /// Activity types of the events the pair appeared on
    pub contexts: BTreeSet<ActivityType>,
}

/// Case-insensitive dedupe, first spelling wins
fn distinct<'a>(items: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(normalize_key(s)))
        .collect()
}

/// An unordered pair keyed case-insensitively, keeping the spellings it was
/// first seen with
struct PairKey<'a> {
    key: (String, String),
    spelling: (&'a str, &'a str),
}

/// Every unordered pair, each ordered by its lowercased key
fn pairs<'a>(items: &[&'a str]) -> Vec<PairKey<'a>> {
    let mut out = Vec::new();
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            let (ka, kb) = (normalize_key(a), normalize_key(b));
            out.push(if ka <= kb {
                PairKey { key: (ka, kb), spelling: (*a, *b) }
            } else {
                PairKey { key: (kb, ka), spelling: (*b, *a) }
            });
        }
    }
    out
}

/// Greedy time windows: a new window opens once an event is more than
/// `window_minutes` after the current window's first event
///
/// Untimed events are skipped. Windows with a single event are dropped.
/// Window lengths are clamped to `0..=MAX_WINDOW_MINUTES`.
pub fn build_windows(events: &[StructuredEvent], window_minutes: i64) -> Vec<Vec<&StructuredEvent>> {
    let mut timed: Vec<&StructuredEvent> = events.iter().filter(|e| e.timestamp.is_some()).collect();
    timed.sort_by_key(|e| e.timestamp);

    let limit = Duration::minutes(window_minutes.clamp(0, MAX_WINDOW_MINUTES));
    let mut windows: Vec<Vec<&StructuredEvent>> = Vec::new();

    for event in timed {
        let opens_new = match windows.last().and_then(|w| w.first()) {
            Some(first) => match (first.timestamp, event.timestamp) {
                (Some(start), Some(ts)) => ts - start > limit,
                _ => true,
            },
            None => true,
        };

        if opens_new {
            windows.push(vec![event]);
        } else if let Some(current) = windows.last_mut() {
            current.push(event);
        }
    }

    windows.retain(|w| w.len() >= 2);
    windows
}

fn window_span(window: &[&StructuredEvent]) -> String {
    let start = window.first().and_then(|e| e.timestamp);
    let end = window.last().and_then(|e| e.timestamp);
    match (start, end) {
        (Some(s), Some(e)) => format!("{}-{}", s.format("%H:%M"), e.format("%H:%M")),
        _ => String::new(),
    }
}

/// Topic pairs co-occurring within time windows, strongest first
pub fn extract_cooccurrences(events: &[StructuredEvent], window_minutes: i64) -> Vec<TopicCooccurrence> {
    // key -> (first spellings, windows, span of first window)
    let mut counts: BTreeMap<(String, String), ((String, String), usize, String)> = BTreeMap::new();

    for window in build_windows(events, window_minutes) {
        let topics = distinct(window.iter().flat_map(|e| e.topics.iter()));
        if topics.len() < 2 {
            continue;
        }

        let span = window_span(&window);
        for pair in pairs(&topics) {
            let (a, b) = pair.spelling;
            counts
                .entry(pair.key)
                .or_insert_with(|| ((a.to_string(), b.to_string()), 0, span.clone()))
                .1 += 1;
        }
    }

    let Some(max) = counts.values().map(|(_, count, _)| *count).max() else {
        return Vec::new();
    };

    let mut cooccurrences: Vec<TopicCooccurrence> = counts
        .into_values()
        .map(|((topic_a, topic_b), count, window)| TopicCooccurrence {
            topic_a,
            topic_b,
            strength: count as f64 / max as f64,
            shared_events: count,
            window,
        })
        .collect();

    // BTreeMap order already breaks ties by lowercased pair name
    cooccurrences.sort_by(|a, b| b.shared_events.cmp(&a.shared_events));
    cooccurrences.truncate(MAX_COOCCURRENCES);
    cooccurrences
}

/// Entity pairs named together on single events, across the whole day
///
/// A pair needs at least [`MIN_ENTITY_COOCCURRENCES`] events and one
/// context other than `unknown`.
pub fn extract_entity_relations(events: &[StructuredEvent]) -> Vec<EntityRelation> {
    // key -> (first spellings, events, contexts)
    type RelationCount = ((String, String), usize, BTreeSet<ActivityType>);
    let mut counts: BTreeMap<(String, String), RelationCount> = BTreeMap::new();

    for event in events {
        let entities = distinct(event.entities.iter());
        if entities.len() < 2 {
            continue;
        }

        for pair in pairs(&entities) {
            let (a, b) = pair.spelling;
            let entry = counts
                .entry(pair.key)
                .or_insert_with(|| ((a.to_string(), b.to_string()), 0, BTreeSet::new()));
            entry.1 += 1;
            entry.2.insert(event.activity_type);
        }
    }

    let mut relations: Vec<EntityRelation> = counts
        .into_values()
        .filter(|(_, count, contexts)| {
            *count >= MIN_ENTITY_COOCCURRENCES
                && contexts.iter().any(|t| *t != ActivityType::Unknown)
        })
        .map(|((entity_a, entity_b), cooccurrences, contexts)| EntityRelation {
            entity_a,
            entity_b,
            cooccurrences,
            contexts,
        })
        .collect();

    relations.sort_by(|a, b| b.cooccurrences.cmp(&a.cooccurrences));
    relations.truncate(MAX_ENTITY_RELATIONS);
    relations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivitySource, Intent};
    use chrono::DateTime;

    fn event(ts: &str, topics: &[&str], entities: &[&str]) -> StructuredEvent {
        StructuredEvent {
            timestamp: Some(DateTime::parse_from_rfc3339(ts).unwrap()),
            source: ActivitySource::Browser,
            activity_type: ActivityType::Research,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            entities: entities.iter().map(|t| t.to_string()).collect(),
            intent: Intent::Explore,
            confidence: 0.3,
            category: Some("dev".to_string()),
            summary: String::new(),
        }
    }

    #[test]
    fn test_two_events_share_pair() {
        let events = vec![
            event("2026-03-02T09:00:00Z", &["A", "B"], &[]),
            event("2026-03-02T09:02:00Z", &["A", "B"], &[]),
        ];

        let pairs = extract_cooccurrences(&events, 30);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].topic_a, "A");
        assert_eq!(pairs[0].topic_b, "B");
        assert_eq!(pairs[0].shared_events, 1);
        assert_eq!(pairs[0].strength, 1.0);
        assert_eq!(pairs[0].window, "09:00-09:02");
    }

    #[test]
    fn test_window_measured_from_start() {
        // 09:00, 09:20, 09:40: the third is 40 minutes after the window start
        let events = vec![
            event("2026-03-02T09:00:00Z", &["a"], &[]),
            event("2026-03-02T09:20:00Z", &["b"], &[]),
            event("2026-03-02T09:40:00Z", &["c"], &[]),
        ];

        let windows = build_windows(&events, 30);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].len(), 2);
    }

    #[test]
    fn test_single_event_window_ignored() {
        let events = vec![event("2026-03-02T09:00:00Z", &["a", "b"], &[])];
        assert!(extract_cooccurrences(&events, 30).is_empty());
    }

    #[test]
    fn test_strength_normalized_by_max() {
        let events = vec![
            event("2026-03-02T09:00:00Z", &["rust", "tokio"], &[]),
            event("2026-03-02T09:05:00Z", &["axum"], &[]),
            event("2026-03-02T11:00:00Z", &["rust", "tokio"], &[]),
            event("2026-03-02T11:05:00Z", &[], &[]),
        ];

        let pairs = extract_cooccurrences(&events, 30);
        assert_eq!(pairs[0].topic_a, "rust");
        assert_eq!(pairs[0].topic_b, "tokio");
        assert_eq!(pairs[0].shared_events, 2);
        assert_eq!(pairs[0].strength, 1.0);
        assert!(pairs[1..].iter().all(|p| p.strength == 0.5));
    }

    #[test]
    fn test_entity_relations_need_three() {
        let events = vec![
            event("2026-03-02T09:00:00Z", &[], &["Rust", "Tokio"]),
            event("2026-03-02T12:00:00Z", &[], &["Tokio", "Rust"]),
            event("2026-03-02T15:00:00Z", &[], &["Rust", "Tokio", "Axum"]),
        ];

        let relations = extract_entity_relations(&events);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].entity_a, "Rust");
        assert_eq!(relations[0].entity_b, "Tokio");
        assert_eq!(relations[0].cooccurrences, 3);
        assert!(relations[0].contexts.contains(&ActivityType::Research));
    }

    #[test]
    fn test_unknown_only_context_excluded() {
        let events: Vec<_> = (0..3)
            .map(|_| {
                let mut e = event("2026-03-02T09:00:00Z", &[], &["Rust", "Tokio"]);
                e.activity_type = ActivityType::Unknown;
                e
            })
            .collect();
        assert!(extract_entity_relations(&events).is_empty());
    }

    #[test]
    fn test_case_variants_count_as_one_pair() {
        let events = vec![
            event("2026-03-02T09:00:00Z", &["Rust", "tokio"], &[]),
            event("2026-03-02T09:05:00Z", &[], &[]),
            event("2026-03-02T12:00:00Z", &["rust", "Tokio"], &[]),
            event("2026-03-02T12:05:00Z", &[], &[]),
        ];

        let pairs = extract_cooccurrences(&events, 30);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].topic_a, "Rust");
        assert_eq!(pairs[0].topic_b, "tokio");
        assert_eq!(pairs[0].shared_events, 2);
        assert_eq!(pairs[0].window, "09:00-09:05");
    }

    #[test]
    fn test_entity_case_variants_reach_threshold() {
        let events = vec![
            event("2026-03-02T09:00:00Z", &[], &["GitHub", "Tokio"]),
            event("2026-03-02T10:00:00Z", &[], &["github", "Tokio"]),
            event("2026-03-02T11:00:00Z", &[], &["tokio", "github"]),
        ];

        let relations = extract_entity_relations(&events);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].entity_a, "GitHub");
        assert_eq!(relations[0].entity_b, "Tokio");
        assert_eq!(relations[0].cooccurrences, 3);
    }

    #[test]
    fn test_out_of_range_window_is_clamped() {
        let events = vec![
            event("2026-03-01T09:00:00Z", &["rust", "tokio"], &[]),
            event("2026-03-02T09:00:00Z", &["rust", "tokio"], &[]),
        ];

        let windows = build_windows(&events, i64::MAX);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].len(), 2);

        assert!(build_windows(&events, i64::MIN).is_empty());
        assert_eq!(extract_cooccurrences(&events, i64::MAX)[0].shared_events, 1);
    }

    #[test]
    fn test_cooccurrences_capped_strongest_first() {
        let crowd: Vec<String> = (0..8).map(|i| format!("topic{}", i)).collect();
        let crowd: Vec<&str> = crowd.iter().map(String::as_str).collect();
        let events = vec![
            event("2026-03-02T09:00:00Z", &["rust", "tokio"], &[]),
            event("2026-03-02T09:01:00Z", &crowd, &[]),
            event("2026-03-02T12:00:00Z", &["rust", "tokio"], &[]),
            event("2026-03-02T12:01:00Z", &[], &[]),
        ];

        // 10 topics in the first window give 45 pairs
        let pairs = extract_cooccurrences(&events, 30);
        assert_eq!(pairs.len(), MAX_COOCCURRENCES);
        assert_eq!((pairs[0].topic_a.as_str(), pairs[0].topic_b.as_str()), ("rust", "tokio"));
        assert_eq!(pairs[0].shared_events, 2);
        assert!(pairs[1..].iter().all(|p| p.shared_events == 1 && p.strength == 0.5));
    }

    #[test]
    fn test_entity_relations_capped_by_count() {
        let names = ["n0", "n1", "n2", "n3", "n4", "n5", "n6"];
        let mut events: Vec<StructuredEvent> = (0..3)
            .map(|i| event(&format!("2026-03-02T0{}:00:00Z", i + 1), &[], &names))
            .collect();
        events.push(event("2026-03-02T05:00:00Z", &[], &["n5", "n6"]));

        // 7 entities give 21 pairs, each seen on 3 events
        let relations = extract_entity_relations(&events);
        assert_eq!(relations.len(), MAX_ENTITY_RELATIONS);
        assert_eq!(
            (relations[0].entity_a.as_str(), relations[0].entity_b.as_str()),
            ("n5", "n6")
        );
        assert_eq!(relations[0].cooccurrences, 4);
        assert!(relations[1..].iter().all(|r| r.cooccurrences == 3));
        assert_eq!(
            (relations[1].entity_a.as_str(), relations[1].entity_b.as_str()),
            ("n0", "n1")
        );
    }
}
