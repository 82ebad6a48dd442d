//! Hour-based temporal clustering

use super::rank_by_frequency;
use crate::types::{ActivityType, StructuredEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum topics or entities kept per cluster
pub const MAX_CLUSTER_ITEMS: usize = 5;

/// Topics shown in a cluster label
const LABEL_TOPICS: usize = 3;

/// A contiguous block of hours dominated by one activity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalCluster {
    pub hour_start: u32,
    /// Inclusive
    pub hour_end: u32,
    pub activity_type: ActivityType,
    pub event_count: usize,
    pub topics: Vec<String>,
    pub entities: Vec<String>,
    /// Events per hour of the block
    pub intensity: f64,
    pub label: String,
}

struct ClusterBuilder<'a> {
    hour_start: u32,
    hour_end: u32,
    activity_type: ActivityType,
    events: Vec<&'a StructuredEvent>,
}

impl<'a> ClusterBuilder<'a> {
    fn build(self) -> TemporalCluster {
        let topics = rank_by_frequency(
            self.events.iter().flat_map(|e| e.topics.iter()),
            MAX_CLUSTER_ITEMS,
        );
        let entities = rank_by_frequency(
            self.events.iter().flat_map(|e| e.entities.iter()),
            MAX_CLUSTER_ITEMS,
        );
        let hours = (self.hour_end - self.hour_start + 1) as f64;
        let label = cluster_label(self.activity_type, self.hour_start, self.hour_end, &topics);

        TemporalCluster {
            hour_start: self.hour_start,
            hour_end: self.hour_end,
            activity_type: self.activity_type,
            event_count: self.events.len(),
            intensity: self.events.len() as f64 / hours,
            topics,
            entities,
            label,
        }
    }
}

/// Most frequent activity type, ties going to declaration order
pub fn dominant_activity_type<'a, I>(events: I) -> Option<ActivityType>
where
    I: IntoIterator<Item = &'a StructuredEvent>,
{
    let mut votes: BTreeMap<ActivityType, usize> = BTreeMap::new();
    for event in events {
        *votes.entry(event.activity_type).or_default() += 1;
    }
    // max_by_key keeps the last maximum, so walk in reverse
    votes
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(activity_type, _)| activity_type)
}

/// 12-hour clock label: 0 → "12am", 9 → "9am", 12 → "12pm", 24 → "12am"
pub fn format_hour(hour: u32) -> String {
    let hour = hour % 24;
    let suffix = if hour < 12 { "am" } else { "pm" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}{}", display, suffix)
}

/// `"{type} {start}-{end+1}: {top topics}"`
pub fn cluster_label(
    activity_type: ActivityType,
    hour_start: u32,
    hour_end: u32,
    topics: &[String],
) -> String {
    let span = format!(
        "{} {}-{}",
        activity_type,
        format_hour(hour_start),
        format_hour(hour_end + 1)
    );
    if topics.is_empty() {
        return span;
    }

    let top: Vec<&str> = topics.iter().take(LABEL_TOPICS).map(String::as_str).collect();
    format!("{}: {}", span, top.join(", "))
}

/// Cluster events by local hour
///
/// Events without a timestamp are skipped. Adjacent hours merge while their
/// dominant activity type stays the same; blocks with fewer than
/// `min_cluster_size` events are dropped. Output is sorted by event count,
/// largest first, earlier blocks first on ties.
pub fn extract_clusters(events: &[StructuredEvent], min_cluster_size: usize) -> Vec<TemporalCluster> {
    let mut by_hour: BTreeMap<u32, Vec<&StructuredEvent>> = BTreeMap::new();
    for event in events {
        if let Some(hour) = event.local_hour() {
            by_hour.entry(hour).or_default().push(event);
        }
    }

    let mut clusters = Vec::new();
    let mut current: Option<ClusterBuilder> = None;

    for (hour, hour_events) in by_hour {
        let Some(dominant) = dominant_activity_type(hour_events.iter().copied()) else {
            continue;
        };

        let extends_current = current
            .as_ref()
            .is_some_and(|b| b.activity_type == dominant && hour - b.hour_end <= 1);

        if extends_current {
            if let Some(builder) = current.as_mut() {
                builder.hour_end = hour;
                builder.events.extend(hour_events);
            }
            continue;
        }

        if let Some(done) = current.take() {
            if done.events.len() >= min_cluster_size {
                clusters.push(done.build());
            }
        }
        current = Some(ClusterBuilder {
            hour_start: hour,
            hour_end: hour,
            activity_type: dominant,
            events: hour_events,
        });
    }

    if let Some(done) = current {
        if done.events.len() >= min_cluster_size {
            clusters.push(done.build());
        }
    }

    clusters.sort_by(|a, b| b.event_count.cmp(&a.event_count));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivitySource, Intent};
    use chrono::DateTime;

    fn event(ts: &str, activity_type: ActivityType, topics: &[&str]) -> StructuredEvent {
        StructuredEvent {
            timestamp: Some(DateTime::parse_from_rfc3339(ts).unwrap()),
            source: ActivitySource::Browser,
            activity_type,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            entities: vec![],
            intent: Intent::Explore,
            confidence: 0.3,
            category: Some("dev".to_string()),
            summary: String::new(),
        }
    }

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(0), "12am");
        assert_eq!(format_hour(9), "9am");
        assert_eq!(format_hour(12), "12pm");
        assert_eq!(format_hour(13), "1pm");
        assert_eq!(format_hour(24), "12am");
    }

    #[test]
    fn test_plurality_tie_uses_declaration_order() {
        let events = vec![
            event("2026-03-02T09:00:00Z", ActivityType::Research, &[]),
            event("2026-03-02T09:10:00Z", ActivityType::Implementation, &[]),
        ];
        assert_eq!(
            dominant_activity_type(&events),
            Some(ActivityType::Implementation)
        );
    }

    #[test]
    fn test_adjacent_hours_merge() {
        let events = vec![
            event("2026-03-02T09:00:00Z", ActivityType::Implementation, &["authentication"]),
            event("2026-03-02T09:30:00Z", ActivityType::Implementation, &["authentication"]),
            event("2026-03-02T10:00:00Z", ActivityType::Implementation, &["authentication"]),
            event("2026-03-02T11:15:00Z", ActivityType::Implementation, &["authentication"]),
            event("2026-03-02T11:45:00Z", ActivityType::Implementation, &["authentication"]),
        ];

        let clusters = extract_clusters(&events, 3);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].hour_start, 9);
        assert_eq!(clusters[0].hour_end, 11);
        assert_eq!(clusters[0].event_count, 5);
        assert!((clusters[0].intensity - 5.0 / 3.0).abs() < 1e-9);
        assert_eq!(clusters[0].label, "implementation 9am-12pm: authentication");
    }

    #[test]
    fn test_gap_splits_and_small_blocks_drop() {
        let events = vec![
            event("2026-03-02T09:00:00Z", ActivityType::Research, &[]),
            event("2026-03-02T09:10:00Z", ActivityType::Research, &[]),
            event("2026-03-02T09:20:00Z", ActivityType::Research, &[]),
            event("2026-03-02T14:00:00Z", ActivityType::Research, &[]),
        ];

        let clusters = extract_clusters(&events, 3);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].hour_end, 9);
        assert_eq!(clusters[0].label, "research 9am-10am");
    }

    #[test]
    fn test_type_change_splits_and_sorts_by_count() {
        let events = vec![
            event("2026-03-02T09:00:00Z", ActivityType::Research, &[]),
            event("2026-03-02T10:00:00Z", ActivityType::Debugging, &[]),
            event("2026-03-02T10:05:00Z", ActivityType::Debugging, &[]),
        ];

        let clusters = extract_clusters(&events, 1);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].activity_type, ActivityType::Debugging);
        assert_eq!(clusters[1].activity_type, ActivityType::Research);
    }

    #[test]
    fn test_untimed_events_skipped() {
        let mut untimed = event("2026-03-02T09:00:00Z", ActivityType::Research, &[]);
        untimed.timestamp = None;
        assert!(extract_clusters(&[untimed], 1).is_empty());
    }

    #[test]
    fn test_cluster_items_capped_by_frequency() {
        let mut events = vec![
            event("2026-03-02T09:00:00Z", ActivityType::Research, &["gamma", "alpha"]),
            event("2026-03-02T09:10:00Z", ActivityType::Research, &["delta", "alpha", "beta"]),
            event(
                "2026-03-02T09:20:00Z",
                ActivityType::Research,
                &["epsilon", "zeta", "eta", "Alpha", "beta"],
            ),
        ];
        events[0].entities = vec!["Kafka".into(), "Redis".into(), "Tokio".into()];
        events[1].entities = vec!["Postgres".into(), "Tokio".into(), "Axum".into()];
        events[2].entities = vec!["Tokio".into(), "Axum".into(), "Serde".into(), "Hyper".into()];

        let clusters = extract_clusters(&events, 3);
        assert_eq!(clusters.len(), 1);
        // case variants fold into the first spelling; ties keep first appearance
        assert_eq!(
            clusters[0].topics,
            vec!["alpha", "beta", "gamma", "delta", "epsilon"]
        );
        assert_eq!(
            clusters[0].entities,
            vec!["Tokio", "Axum", "Kafka", "Redis", "Postgres"]
        );
        assert_eq!(clusters[0].label, "research 9am-10am: alpha, beta, gamma");
    }
}
