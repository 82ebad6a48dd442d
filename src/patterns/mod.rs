//! Temporal pattern extraction
//!
//! Consumes a [`ClassificationResult`] and produces a [`PatternAnalysis`]:
//! hour clusters, topic co-occurrence, entity relations, activity
//! distribution, focus score, and (with a topic history) recurrence trends
//! and the knowledge delta.
//!
//! Every event is first passed through [`topics::gate_event`], so
//! non-knowledge categories count toward volume and focus but never
//! contribute topics or entities. Output ordering is fully deterministic:
//! the same inputs serialize to the same bytes.

pub mod clusters;
pub mod cooccurrence;
pub mod focus;
pub mod topics;

pub use clusters::TemporalCluster;
pub use cooccurrence::{EntityRelation, TopicCooccurrence};
pub use focus::ActivityShare;

use crate::config::PatternConfig;
use crate::recurrence::{self, KnowledgeDelta, RecurrenceSignal, TopicHistory};
use crate::types::{ClassificationResult, StructuredEvent};
use crate::utils::normalize_key;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Everything the pattern extractor learned about one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub temporal_clusters: Vec<TemporalCluster>,
    pub topic_cooccurrences: Vec<TopicCooccurrence>,
    pub entity_relations: Vec<EntityRelation>,
    pub recurrence_signals: Vec<RecurrenceSignal>,
    pub knowledge_delta: KnowledgeDelta,
    /// 0 when there were no events, otherwise in [0.30, 0.98]
    pub focus_score: f64,
    pub activity_concentration_score: f64,
    pub top_activity_types: Vec<ActivityShare>,
    pub peak_hours: Vec<u32>,
}

impl PatternAnalysis {
    pub fn is_empty(&self) -> bool {
        self.temporal_clusters.is_empty()
            && self.topic_cooccurrences.is_empty()
            && self.top_activity_types.is_empty()
    }
}

/// Rank strings by frequency (case-insensitive), keeping the first spelling
/// seen; ties keep first-appearance order
pub(crate) fn rank_by_frequency<'a, I>(items: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    // key -> (first spelling, count, first position)
    let mut counts: HashMap<String, (&'a str, usize, usize)> = HashMap::new();
    for (position, item) in items.into_iter().enumerate() {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        counts
            .entry(normalize_key(trimmed))
            .or_insert((trimmed, 0, position))
            .1 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(cap)
        .map(|(s, _, _)| s.to_string())
        .collect()
}

fn ranked_topics(gated: &[StructuredEvent]) -> Vec<String> {
    rank_by_frequency(gated.iter().flat_map(|e| e.topics.iter()), usize::MAX)
}

fn ranked_entities(gated: &[StructuredEvent]) -> Vec<String> {
    rank_by_frequency(gated.iter().flat_map(|e| e.entities.iter()), usize::MAX)
}

/// Distinct knowledge topics of the day, most frequent first
///
/// Gating and topic filtering are applied, so this is the list a host should
/// feed to [`recurrence::update_topic_history`].
pub fn daily_topics(events: &[StructuredEvent]) -> Vec<String> {
    let gated: Vec<StructuredEvent> = events.iter().map(topics::gate_event).collect();
    ranked_topics(&gated)
}

/// Run every pattern extractor over one day of classified events
///
/// With `config.enabled == false` the empty analysis is returned. Recurrence
/// signals and the knowledge delta stay empty unless
/// `config.track_recurrence` is set.
pub fn extract_patterns(
    result: &ClassificationResult,
    config: &PatternConfig,
    history: &TopicHistory,
    today: NaiveDate,
) -> PatternAnalysis {
    if !config.enabled {
        return PatternAnalysis::default();
    }

    let events: Vec<StructuredEvent> = result.events.iter().map(topics::gate_event).collect();

    let temporal_clusters = clusters::extract_clusters(&events, config.min_cluster_size);
    let topic_cooccurrences =
        cooccurrence::extract_cooccurrences(&events, config.cooccurrence_window_minutes);
    let entity_relations = cooccurrence::extract_entity_relations(&events);

    let (recurrence_signals, knowledge_delta) = if config.track_recurrence {
        let signals = recurrence::compute_recurrence(&ranked_topics(&events), history, today);
        let delta = recurrence::compute_knowledge_delta(
            &signals,
            &ranked_entities(&events),
            &topic_cooccurrences,
        );
        (signals, delta)
    } else {
        (Vec::new(), KnowledgeDelta::default())
    };

    let analysis = PatternAnalysis {
        focus_score: focus::focus_score(&events),
        activity_concentration_score: focus::activity_concentration(&events),
        top_activity_types: focus::top_activity_types(&events),
        peak_hours: focus::peak_hours(&events),
        temporal_clusters,
        topic_cooccurrences,
        entity_relations,
        recurrence_signals,
        knowledge_delta,
    };

    debug!(
        "Extracted patterns from {} events: {} clusters, {} co-occurrences, {} relations, focus {:.2}",
        events.len(),
        analysis.temporal_clusters.len(),
        analysis.topic_cooccurrences.len(),
        analysis.entity_relations.len(),
        analysis.focus_score
    );
    analysis
}
