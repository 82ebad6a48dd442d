//! Topic hygiene and category gating
//!
//! Raw topics come from page titles and LLM output, so they can carry slug,
//! domain, or brand fragments. Everything here runs before a topic reaches a
//! cluster label or a co-occurrence pair.

use crate::types::StructuredEvent;
use crate::utils::normalize_key;
use crate::vocabulary::Vocabulary;
use std::collections::HashSet;

const URL_CHARS: [char; 5] = ['/', '\\', '?', '=', '&'];

/// Whether a raw topic string is safe to surface
pub fn is_valid_topic(topic: &str) -> bool {
    let topic = topic.trim();
    if topic.is_empty() || topic.contains('.') || topic.contains(&URL_CHARS[..]) {
        return false;
    }

    let words: Vec<&str> = topic.split_whitespace().collect();
    if words.len() >= 2 && looks_like_name_fragment(&words) {
        return false;
    }
    if words.len() >= 2 && is_mostly_stopwords(&words) {
        return false;
    }

    true
}

/// Every word capitalized and at least one mixed-case, e.g. "Acme Corp Login".
/// All-caps phrases like "AWS IAM" pass.
fn looks_like_name_fragment(words: &[&str]) -> bool {
    let all_capitalized = words
        .iter()
        .all(|w| w.chars().next().is_some_and(char::is_uppercase));
    let any_mixed = words.iter().any(|w| {
        w.chars().any(char::is_uppercase) && w.chars().any(char::is_lowercase)
    });
    all_capitalized && any_mixed
}

fn is_mostly_stopwords(words: &[&str]) -> bool {
    let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let rest = match lowered.split_first() {
        Some((first, rest)) if Vocabulary::leading_determiners().contains(first.as_str()) => rest,
        _ => &lowered[..],
    };
    if rest.is_empty() {
        return true;
    }

    let stop = rest
        .iter()
        .filter(|w| Vocabulary::stopwords().contains(w.as_str()))
        .count();
    stop * 2 >= rest.len()
}

/// Drop invalid topics and case-insensitive duplicates, keeping first spelling
pub fn filter_topics<S: AsRef<str>>(topics: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    topics
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| is_valid_topic(t))
        .filter(|t| seen.insert(normalize_key(t)))
        .map(str::to_string)
        .collect()
}

/// Whether events of this category may contribute topics and entities
///
/// Uncategorized events pass; the gate targets categories known to be noise.
pub fn is_knowledge_category(category: Option<&str>) -> bool {
    match category {
        Some(c) => Vocabulary::knowledge_categories().contains(c.trim().to_lowercase().as_str()),
        None => true,
    }
}

/// Copy of `event` ready for pattern extraction: topics filtered, and topics
/// and entities emptied for non-knowledge categories
pub fn gate_event(event: &StructuredEvent) -> StructuredEvent {
    let mut gated = event.clone();
    if is_knowledge_category(event.category.as_deref()) {
        gated.topics = filter_topics(&event.topics);
    } else {
        gated.topics.clear();
        gated.entities.clear();
    }
    gated
}
