//! Focus score and activity distribution

use super::clusters::dominant_activity_type;
use crate::types::{ActivityType, StructuredEvent};
use crate::utils::normalize_key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower bound of a real focus reading
pub const FOCUS_FLOOR: f64 = 0.30;

/// Upper bound of a real focus reading
pub const FOCUS_CEILING: f64 = 0.98;

const TOPIC_WEIGHT: f64 = 0.6;
const ACTIVITY_WEIGHT: f64 = 0.4;
const SIGMOID_STEEPNESS: f64 = 5.0;

pub const MAX_TOP_ACTIVITY_TYPES: usize = 5;
pub const MAX_PEAK_HOURS: usize = 3;

/// Share of the day spent on one activity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityShare {
    pub activity_type: ActivityType,
    pub count: usize,
    /// `count` over all events, in [0, 1]
    pub share: f64,
}

/// `1 - H / log2(max(2, unique))` over all topic mentions; 0 with no mentions
pub fn topic_focus(events: &[StructuredEvent]) -> f64 {
    let mut mentions: BTreeMap<String, usize> = BTreeMap::new();
    for topic in events.iter().flat_map(|e| e.topics.iter()) {
        *mentions.entry(normalize_key(topic)).or_default() += 1;
    }

    let total: usize = mentions.values().sum();
    if total == 0 {
        return 0.0;
    }

    let entropy: f64 = mentions
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum();
    let max_entropy = (mentions.len().max(2) as f64).log2();

    (1.0 - entropy / max_entropy).clamp(0.0, 1.0)
}

/// Fraction of events in the most common activity type
pub fn activity_concentration(events: &[StructuredEvent]) -> f64 {
    let Some(dominant) = dominant_activity_type(events) else {
        return 0.0;
    };
    let count = events.iter().filter(|e| e.activity_type == dominant).count();
    count as f64 / events.len() as f64
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-SIGMOID_STEEPNESS * (x - 0.5)).exp())
}

/// Squash a [0, 1] blend onto [`FOCUS_FLOOR`], [`FOCUS_CEILING`]
pub fn compress_focus(blend: f64) -> f64 {
    let low = sigmoid(0.0);
    let high = sigmoid(1.0);
    let normalized = (sigmoid(blend.clamp(0.0, 1.0)) - low) / (high - low);
    (FOCUS_FLOOR + normalized * (FOCUS_CEILING - FOCUS_FLOOR)).clamp(FOCUS_FLOOR, FOCUS_CEILING)
}

/// Blended focus reading; exactly 0 when there are no events
pub fn focus_score(events: &[StructuredEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let blend = TOPIC_WEIGHT * topic_focus(events) + ACTIVITY_WEIGHT * activity_concentration(events);
    compress_focus(blend)
}

/// Up to five activity types by count, ties in declaration order
pub fn top_activity_types(events: &[StructuredEvent]) -> Vec<ActivityShare> {
    let mut counts: BTreeMap<ActivityType, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(event.activity_type).or_default() += 1;
    }

    let total = events.len() as f64;
    let mut shares: Vec<ActivityShare> = counts
        .into_iter()
        .map(|(activity_type, count)| ActivityShare {
            activity_type,
            count,
            share: count as f64 / total,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares.truncate(MAX_TOP_ACTIVITY_TYPES);
    shares
}

/// Up to three busiest local hours, earlier hour first on ties
pub fn peak_hours(events: &[StructuredEvent]) -> Vec<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for hour in events.iter().filter_map(StructuredEvent::local_hour) {
        *counts.entry(hour).or_default() += 1;
    }

    let mut hours: Vec<(u32, usize)> = counts.into_iter().collect();
    hours.sort_by(|a, b| b.1.cmp(&a.1));
    hours.into_iter().take(MAX_PEAK_HOURS).map(|(hour, _)| hour).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivitySource, Intent};
    use chrono::DateTime;

    fn event(hour: u32, activity_type: ActivityType, topics: &[&str]) -> StructuredEvent {
        let ts = format!("2026-03-02T{:02}:00:00Z", hour);
        StructuredEvent {
            timestamp: Some(DateTime::parse_from_rfc3339(&ts).unwrap()),
            source: ActivitySource::Browser,
            activity_type,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            entities: vec![],
            intent: Intent::Explore,
            confidence: 0.3,
            category: None,
            summary: String::new(),
        }
    }

    #[test]
    fn test_empty_is_zero_sentinel() {
        assert_eq!(focus_score(&[]), 0.0);
    }

    #[test]
    fn test_compression_bounds() {
        assert!((compress_focus(0.0) - FOCUS_FLOOR).abs() < 1e-9);
        assert!((compress_focus(1.0) - FOCUS_CEILING).abs() < 1e-9);
        assert!((compress_focus(0.5) - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_single_topic_is_fully_focused() {
        let events = vec![
            event(9, ActivityType::Implementation, &["rust"]),
            event(10, ActivityType::Implementation, &["Rust"]),
        ];
        assert_eq!(topic_focus(&events), 1.0);
        assert_eq!(activity_concentration(&events), 1.0);
        assert!((focus_score(&events) - FOCUS_CEILING).abs() < 1e-9);
    }

    #[test]
    fn test_even_spread_is_unfocused() {
        let events = vec![
            event(9, ActivityType::Implementation, &["a"]),
            event(10, ActivityType::Research, &["b"]),
        ];
        assert!(topic_focus(&events).abs() < 1e-9);
        assert_eq!(activity_concentration(&events), 0.5);
    }

    #[test]
    fn test_no_topics_still_scores() {
        let events = vec![event(9, ActivityType::Browsing, &[])];
        assert_eq!(topic_focus(&events), 0.0);
        let score = focus_score(&events);
        assert!((FOCUS_FLOOR..=FOCUS_CEILING).contains(&score));
    }

    #[test]
    fn test_distribution_and_peaks() {
        let events = vec![
            event(9, ActivityType::Research, &[]),
            event(9, ActivityType::Research, &[]),
            event(14, ActivityType::Debugging, &[]),
            event(11, ActivityType::Implementation, &[]),
        ];

        let top = top_activity_types(&events);
        assert_eq!(top[0].activity_type, ActivityType::Research);
        assert_eq!(top[0].share, 0.5);
        assert_eq!(top[1].activity_type, ActivityType::Implementation);
        assert_eq!(top[2].activity_type, ActivityType::Debugging);

        assert_eq!(peak_hours(&events), vec![9, 11, 14]);
    }
}
