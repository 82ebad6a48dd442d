//! Deterministic rule classification
//!
//! Always available, never fails, and produces the same output for the same
//! input. Activity type comes from the category table (browser/search), an
//! ordered decision tree over the prompt (AI assistant), or the commit
//! work-mode classifier (commits). Intent, topics, and entities come from
//! ordered pattern tables and token extraction.

use crate::commits::{classify_work_mode, parse_commit_message, WorkMode};
use crate::types::{
    ActivitySource, ActivityType, Intent, RawActivityEvent, StructuredEvent, MAX_EVENT_ENTITIES,
    MAX_EVENT_TOPICS, MAX_SUMMARY_CHARS, RULE_CONFIDENCE,
};
use crate::utils::{clamp_chars, collapse_whitespace};
use crate::vocabulary::Vocabulary;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

type Rule<T> = (Regex, T);

fn compile<T: Copy>(rules: &[(&str, T)]) -> Vec<Rule<T>> {
    rules
        .iter()
        .map(|(pattern, value)| {
            (
                Regex::new(pattern).expect("Valid classification rule regex"),
                *value,
            )
        })
        .collect()
}

fn first_match<T: Copy>(rules: &[Rule<T>], text: &str) -> Option<T> {
    rules
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, value)| *value)
}

/// Decision tree for AI-assistant prompts, evaluated top to bottom
fn prompt_activity_rules() -> &'static [Rule<ActivityType>] {
    static RULES: Lazy<Vec<Rule<ActivityType>>> = Lazy::new(|| {
        compile(&[
            (
                r"(?i)\b(error|bug|fix|failing|fails|failed|crash(es|ing)?|exception|stack ?trace|traceback|panic(ked|s)?|debug(ging)?|broken|not working|segfault)\b",
                ActivityType::Debugging,
            ),
            (
                r"(?i)\b(review|code review|refactor(ing)?|clean ?up|improve|simplify|pull request|PR|lint)\b",
                ActivityType::Review,
            ),
            (
                r"(?i)\b(explain|what is|what are|what does|how does|how do|why does|why is|understand|learn|teach me|difference between|eli5)\b",
                ActivityType::Learning,
            ),
            (
                r"(?i)\b(architecture|architect|design|system design|structure|pattern|trade-?offs?|scalab(le|ility)|schema|approach|data model)\b",
                ActivityType::Architecture,
            ),
            (
                r"(?i)\b(implement|write|create|build|add|generate|scaffold|make)\b",
                ActivityType::Implementation,
            ),
        ])
    });
    &RULES
}

fn search_intent_rules() -> &'static [Rule<Intent>] {
    static RULES: Lazy<Vec<Rule<Intent>>> = Lazy::new(|| {
        compile(&[
            (r"(?i)\b(vs\.?|versus|compare|comparison|difference between|alternatives? to)\b", Intent::Compare),
            (r"(?i)\b(how to|how do i|example|tutorial|implement|snippet)\b", Intent::Implement),
            (r"(?i)\b(best|review|reviews|pricing|benchmark|pros and cons|worth it|rating)\b", Intent::Evaluate),
            (r"(?i)\b(docs|documentation|reference|manual|what is|what are|meaning|definition)\b", Intent::Read),
            (r"(?i)\b(error|errors|fix|not working|fails?|failed|crash|exception|issue|bug|undefined)\b", Intent::Troubleshoot),
            (r"(?i)\b(config|configure|configuration|setup|set up|install|settings|enable|disable)\b", Intent::Configure),
        ])
    });
    &RULES
}

fn prompt_intent_rules() -> &'static [Rule<Intent>] {
    static RULES: Lazy<Vec<Rule<Intent>>> = Lazy::new(|| {
        compile(&[
            (r"(?i)\b(compare|versus|vs\.?|which is better|trade-?offs? between)\b", Intent::Compare),
            (r"(?i)\b(implement|write|create|build|add|generate|scaffold)\b", Intent::Implement),
            (r"(?i)\b(review|evaluate|assess|audit|is this (good|correct|right))\b", Intent::Evaluate),
            (r"(?i)\b(explain|summari[sz]e|what is|what does|read through|walk me through)\b", Intent::Read),
            (r"(?i)\b(error|bug|fix|failing|crash|exception|traceback|debug|broken|not working)\b", Intent::Troubleshoot),
            (r"(?i)\b(config|configure|setup|set up|install|deploy|environment|env var)\b", Intent::Configure),
        ])
    });
    &RULES
}

fn browser_intent_rules() -> &'static [Rule<Intent>] {
    static RULES: Lazy<Vec<Rule<Intent>>> = Lazy::new(|| {
        compile(&[
            (r"(?i)\b(vs\.?|versus|compare|comparison|alternatives)\b", Intent::Compare),
            (r"(?i)\b(tutorial|how to|getting started|quickstart|example|examples)\b", Intent::Implement),
            (r"(?i)\b(pricing|plans|review|reviews|benchmark|benchmarks)\b", Intent::Evaluate),
            (r"(?i)\b(docs|documentation|reference|api|guide|handbook|blog|article|readme)\b", Intent::Read),
            (r"(?i)\b(error|issue|issues|bug|stack overflow|stackoverflow|troubleshoot(ing)?|fix)\b", Intent::Troubleshoot),
            (r"(?i)\b(settings|config|configuration|install|installation|setup|preferences)\b", Intent::Configure),
        ])
    });
    &RULES
}

fn capitalized_word() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b[A-Z][A-Za-z0-9+#]*[A-Za-z0-9+#]\b").expect("Valid capitalized word regex")
    });
    &PATTERN
}

fn kebab_tool() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b[a-z][a-z0-9]*(?:-[a-z0-9]+)+\b").expect("Valid kebab-case regex")
    });
    &PATTERN
}

fn topic_token() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"[A-Za-z][A-Za-z0-9+#-]*[A-Za-z0-9+#]").expect("Valid topic token regex")
    });
    &PATTERN
}

/// Registrable label of a domain: `github` for `api.github.com`, `bbc` for `bbc.co.uk`
pub fn domain_label(domain: &str) -> Option<String> {
    let labels: Vec<&str> = domain
        .trim()
        .trim_start_matches("www.")
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();

    let label = match labels.len() {
        0 => return None,
        1 => labels[0],
        n if n >= 3 && labels[n - 2].len() <= 3 && labels[n - 1].len() == 2 => labels[n - 3],
        n => labels[n - 2],
    };
    Some(label.to_lowercase())
}

/// Domain of an event, from metadata or the `"{domain} - {title}"` projection
fn event_domain(event: &RawActivityEvent) -> Option<String> {
    if let Some(domain) = event.metadata_value("domain") {
        return Some(domain.to_lowercase());
    }
    if event.source != ActivitySource::Browser {
        return None;
    }
    event
        .text
        .split_once(" - ")
        .map(|(d, _)| d.trim().to_lowercase())
        .filter(|d| d.contains('.'))
}

/// The part of `text` that isn't the domain prefix
fn content_text(event: &RawActivityEvent) -> &str {
    match event.source {
        ActivitySource::Browser => match event.text.split_once(" - ") {
            Some((prefix, rest)) if prefix.contains('.') => rest,
            _ => &event.text,
        },
        ActivitySource::Commit => event
            .text
            .split_once(": ")
            .map_or(event.text.as_str(), |(_, rest)| rest),
        _ => &event.text,
    }
}

fn commit_work_mode(event: &RawActivityEvent) -> WorkMode {
    let message = event
        .metadata_value("message")
        .unwrap_or_else(|| content_text(event));
    let insertions = event
        .metadata_value("insertions")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let deletions = event
        .metadata_value("deletions")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    classify_work_mode(&parse_commit_message(message), insertions, deletions)
}

/// Activity type by deterministic rules
pub fn classify_activity_type(event: &RawActivityEvent) -> ActivityType {
    let by_category = || {
        event
            .category
            .as_deref()
            .and_then(|c| Vocabulary::category_activity().get(c.trim()))
            .copied()
    };

    match event.source {
        ActivitySource::Browser => by_category().unwrap_or(ActivityType::Unknown),
        ActivitySource::Search => by_category().unwrap_or(ActivityType::Research),
        ActivitySource::AiAssistant => first_match(prompt_activity_rules(), &event.text)
            .unwrap_or(ActivityType::Implementation),
        ActivitySource::Commit => match commit_work_mode(event) {
            WorkMode::Debugging => ActivityType::Debugging,
            WorkMode::Documenting => ActivityType::Writing,
            WorkMode::Testing | WorkMode::Restructuring => ActivityType::Review,
            _ => ActivityType::Implementation,
        },
    }
}

/// Intent by deterministic rules
pub fn classify_intent(event: &RawActivityEvent) -> Intent {
    let rules = match event.source {
        ActivitySource::Search => search_intent_rules(),
        ActivitySource::AiAssistant => prompt_intent_rules(),
        ActivitySource::Browser => browser_intent_rules(),
        ActivitySource::Commit => {
            return match commit_work_mode(event) {
                WorkMode::Debugging => Intent::Troubleshoot,
                _ => Intent::Implement,
            };
        }
    };
    first_match(rules, content_text(event)).unwrap_or(Intent::Explore)
}

/// Offset of a sentence-case first word ("Migrating ...") that is never
/// capitalized again later in the text
fn sentence_opener(content: &str) -> Option<usize> {
    let first = capitalized_word().find(content)?;
    let leading = content.len() - content.trim_start().len();
    let word = first.as_str();
    if first.start() != leading || !word.chars().skip(1).all(|c| c.is_ascii_lowercase()) {
        return None;
    }

    let repeated = capitalized_word()
        .find_iter(&content[first.end()..])
        .any(|m| m.as_str() == word);
    (!repeated).then_some(first.start())
}

/// Entities: domain label, capitalized words, kebab-case tool names
pub fn extract_entities(event: &RawActivityEvent) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut push = |candidate: &str, entities: &mut Vec<String>| {
        let key = candidate.to_lowercase();
        if entities.len() >= MAX_EVENT_ENTITIES
            || key.len() < 2
            || Vocabulary::stopwords().contains(key.as_str())
            || Vocabulary::noisy_domains().contains(key.as_str())
        {
            return;
        }
        if seen.insert(key) {
            entities.push(candidate.to_string());
        }
    };

    if event.source == ActivitySource::Commit {
        if let Some(repo) = event.metadata_value("repo") {
            push(repo, &mut entities);
        }
    } else if let Some(label) = event_domain(event).as_deref().and_then(domain_label) {
        push(&label, &mut entities);
    }

    let content = content_text(event);
    let opener = sentence_opener(content);
    for m in capitalized_word().find_iter(content) {
        if opener == Some(m.start()) {
            continue;
        }
        push(m.as_str(), &mut entities);
    }
    for m in kebab_tool().find_iter(content) {
        push(m.as_str(), &mut entities);
    }

    entities
}

/// Topics: first distinct keyword tokens of the content text
pub fn extract_topics(event: &RawActivityEvent) -> Vec<String> {
    let domain = event_domain(event).as_deref().and_then(domain_label);
    let content = match event.source {
        ActivitySource::Commit => {
            let message = event
                .metadata_value("message")
                .unwrap_or_else(|| content_text(event));
            parse_commit_message(message).description
        }
        _ => content_text(event).to_string(),
    };

    let mut topics: Vec<String> = Vec::new();
    for m in topic_token().find_iter(&content) {
        let token = m.as_str().to_lowercase();
        if token.len() < 4
            || Vocabulary::stopwords().contains(token.as_str())
            || domain.as_deref() == Some(token.as_str())
            || topics.contains(&token)
        {
            continue;
        }
        topics.push(token);
        if topics.len() == MAX_EVENT_TOPICS {
            break;
        }
    }
    topics
}

/// Classify a single raw event by rules alone
pub fn classify_event(event: &RawActivityEvent) -> StructuredEvent {
    StructuredEvent {
        timestamp: event.timestamp,
        source: event.source,
        activity_type: classify_activity_type(event),
        topics: extract_topics(event),
        entities: extract_entities(event),
        intent: classify_intent(event),
        confidence: RULE_CONFIDENCE,
        category: event.category.clone(),
        summary: clamp_chars(&collapse_whitespace(&event.text), MAX_SUMMARY_CHARS),
    }
}
