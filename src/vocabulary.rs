//! Static word lists and lookup tables
//!
//! Built once on first use and shared read-only by every classifier and
//! extractor.

use crate::types::ActivityType;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Vocabulary tables used across the crate
pub struct Vocabulary;

impl Vocabulary {
    /// Common English function words plus web-title filler
    pub fn stopwords() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            [
                "a", "an", "the", "and", "or", "but", "if", "then", "else", "of", "to", "in",
                "on", "at", "by", "for", "with", "about", "from", "into", "onto", "over",
                "under", "up", "down", "out", "off", "as", "is", "are", "was", "were", "be",
                "been", "being", "am", "do", "does", "did", "doing", "done", "have", "has",
                "had", "having", "can", "could", "should", "would", "will", "shall", "may",
                "might", "must", "not", "no", "nor", "so", "too", "very", "just", "only",
                "also", "than", "that", "this", "these", "those", "there", "here", "what",
                "which", "who", "whom", "whose", "when", "where", "why", "how", "all", "any",
                "both", "each", "few", "more", "most", "other", "some", "such", "own", "same",
                "it", "its", "i", "me", "my", "we", "our", "you", "your", "he", "him", "his",
                "she", "her", "they", "them", "their", "us", "get", "got", "make", "made",
                "using", "use", "used", "via", "new", "vs", "like", "one", "two", "way",
                "home", "page", "welcome", "login", "sign", "search", "results", "untitled",
                "official", "site", "website", "online", "free", "best", "top", "guide",
                "null", "none", "http", "https", "www", "com", "org", "net", "html",
            ]
            .iter()
            .copied()
            .collect()
        });
        &SET
    }

    /// Pronouns, articles, and demonstratives stripped from the start of a topic
    pub fn leading_determiners() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            [
                "a", "an", "the", "this", "that", "these", "those", "my", "our", "your",
                "his", "her", "their", "its", "i", "we", "you", "he", "she", "they", "it",
            ]
            .iter()
            .copied()
            .collect()
        });
        &SET
    }

    /// Domain labels that never make a useful entity
    pub fn noisy_domains() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            [
                "google", "bing", "duckduckgo", "yahoo", "baidu", "yandex", "ecosia",
                "localhost", "127", "t", "bit", "goo", "lnkd", "amzn", "www", "mail", "accounts",
                "login", "auth", "cdn", "static", "docs", "app", "web", "m", "l", "s",
            ]
            .iter()
            .copied()
            .collect()
        });
        &SET
    }

    /// Upstream domain category → activity type for browser and search events
    pub fn category_activity() -> &'static HashMap<&'static str, ActivityType> {
        static MAP: Lazy<HashMap<&'static str, ActivityType>> = Lazy::new(|| {
            [
                ("dev", ActivityType::Implementation),
                ("ai_tools", ActivityType::Implementation),
                ("research", ActivityType::Research),
                ("education", ActivityType::Learning),
                ("pkm", ActivityType::Writing),
                ("writing", ActivityType::Writing),
                ("work", ActivityType::Communication),
                ("productivity", ActivityType::Planning),
                ("social", ActivityType::Browsing),
                ("news", ActivityType::Browsing),
                ("shopping", ActivityType::Browsing),
                ("entertainment", ActivityType::Browsing),
                ("media", ActivityType::Browsing),
                ("maps", ActivityType::Browsing),
                ("travel", ActivityType::Browsing),
                ("finance", ActivityType::Admin),
                ("personal", ActivityType::Admin),
                ("health", ActivityType::Admin),
            ]
            .into_iter()
            .collect()
        });
        &MAP
    }

    /// Categories whose events may contribute topics and entities to the knowledge graph
    pub fn knowledge_categories() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            ["dev", "work", "research", "education", "ai_tools", "pkm", "writing"]
                .iter()
                .copied()
                .collect()
        });
        &SET
    }

    /// Filler words ignored when labeling commit groups
    pub fn commit_stopwords() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            [
                "add", "added", "adds", "update", "updated", "updates", "fix", "fixed", "fixes",
                "remove", "removed", "change", "changed", "changes", "make", "use", "move",
                "bump", "minor", "small", "some", "more", "when", "into", "from", "with",
                "the", "and", "for", "not", "all", "now", "new", "also", "via", "per",
            ]
            .iter()
            .copied()
            .collect()
        });
        &SET
    }
}
