//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use daybook_core::{
    ActivitySource, ActivityType, ClassificationResult, DaybookError, Intent, LlmBackend,
    RawActivityEvent, Result, StructuredEvent,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Route library logs to stderr; safe to call from every test
pub fn init_logging() {
    daybook_core::logging::init_tracing(tracing::Level::DEBUG);
}

pub fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("valid test timestamp")
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// A raw browser event on 2026-03-02 at the given UTC time
pub fn browser_raw(time: &str, text: &str, category: &str) -> RawActivityEvent {
    RawActivityEvent::new(
        Some(ts(&format!("2026-03-02T{}:00Z", time))),
        ActivitySource::Browser,
        text,
    )
    .with_category(category)
}

/// A classified event with explicit fields
pub fn structured(
    timestamp: Option<&str>,
    activity_type: ActivityType,
    category: Option<&str>,
    topics: &[&str],
    entities: &[&str],
) -> StructuredEvent {
    StructuredEvent {
        timestamp: timestamp.map(ts),
        source: ActivitySource::Browser,
        activity_type,
        topics: topics.iter().map(|t| t.to_string()).collect(),
        entities: entities.iter().map(|e| e.to_string()).collect(),
        intent: Intent::Explore,
        confidence: 0.3,
        category: category.map(str::to_string),
        summary: String::new(),
    }
}

pub fn result_of(events: Vec<StructuredEvent>) -> ClassificationResult {
    ClassificationResult {
        total_processed: events.len(),
        llm_classified: 0,
        rule_classified: events.len(),
        events,
        processing_time_ms: 0,
    }
}

/// JSON array the scripted backend can return for `n` events
pub fn llm_reply(n: usize, activity_type: &str) -> String {
    let items: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "activityType": activity_type,
                "intent": "implement",
                "topics": [format!("topic {}", i)],
                "entities": ["Tokio"],
                "confidence": 0.85,
                "summary": format!("llm summary {}", i),
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

/// LLM backend that replays a fixed script of replies, one per call
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(DaybookError::LlmApi(message)),
            None => Err(DaybookError::LlmApi("script exhausted".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
