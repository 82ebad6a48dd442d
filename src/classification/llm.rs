//! LLM-assisted batch classification
//!
//! One request per batch asks for a strict JSON array with one object per
//! event. The whole batch is rejected (and re-done by rules upstream) when
//! the call fails, the text isn't a JSON array, its length doesn't match the
//! batch, or any element lacks `activityType`, `topics`, or `entities`.

use super::rules;
use crate::config::ClassificationConfig;
use crate::error::{DaybookError, Result};
use crate::types::{
    ActivityType, Intent, RawActivityEvent, StructuredEvent, MAX_EVENT_ENTITIES,
    MAX_EVENT_TOPICS, MAX_SUMMARY_CHARS,
};
use crate::utils::{clamp_chars, collapse_whitespace};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Characters of event text included per event in the prompt
const PROMPT_TEXT_CHARS: usize = 300;

/// Confidence used when the model doesn't report one
const DEFAULT_LLM_CONFIDENCE: f32 = 0.7;

/// Text-completion transport used by the LLM classifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Send a prompt, return the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// Ollama-compatible `generate` endpoint backend
pub struct HttpLlmBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl HttpLlmBackend {
    pub fn new(config: &ClassificationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmBackend for HttpLlmBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Calling LLM endpoint {}", self.endpoint);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DaybookError::LlmApi(format!(
                "request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DaybookError::LlmApi(format!("Failed to parse response: {}", e)))?;

        if body.response.trim().is_empty() {
            return Err(DaybookError::LlmApi("Empty response from LLM".to_string()));
        }
        Ok(body.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// One element of the model's JSON array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmEventClassification {
    activity_type: String,
    topics: Vec<Value>,
    entities: Vec<Value>,
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    summary: Option<String>,
}

/// Build the classification prompt for one batch
pub fn build_prompt(batch: &[RawActivityEvent]) -> String {
    let activity_types = ActivityType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let intents = Intent::ALL
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = Vec::with_capacity(batch.len());
    for (i, event) in batch.iter().enumerate() {
        lines.push(format!(
            "{}. [{}{}] {}",
            i + 1,
            event.source,
            event
                .category
                .as_deref()
                .map(|c| format!("/{}", c))
                .unwrap_or_default(),
            clamp_chars(&collapse_whitespace(&event.text), PROMPT_TEXT_CHARS)
        ));
    }

    format!(
        r#"Classify each of the following {count} personal activity events.

Return ONLY a JSON array with exactly {count} objects, in the same order as the events.
Each object must have:
- "activityType": one of {activity_types}
- "intent": one of {intents}
- "topics": array of at most 3 short lowercase topic phrases
- "entities": array of at most 5 named tools, products, libraries, or organizations
- "confidence": number between 0 and 1
- "summary": one sentence, at most 120 characters

Events:
{events}
"#,
        count = batch.len(),
        activity_types = activity_types,
        intents = intents,
        events = lines.join("\n")
    )
}

/// Locate the JSON array in a completion, tolerating code fences and prose
pub fn extract_json_array(text: &str) -> Result<Vec<Value>> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        match value {
            Value::Array(items) => return Ok(items),
            Value::Object(map) => {
                if let Some(items) = map.into_iter().find_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                }) {
                    return Ok(items);
                }
            }
            _ => {}
        }
    }

    let start = trimmed.find('[');
    let end = trimmed.rfind(']');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            let items: Vec<Value> = serde_json::from_str(&trimmed[start..=end])?;
            Ok(items)
        }
        _ => Err(DaybookError::InvalidLlmResponse(
            "no JSON array in response".to_string(),
        )),
    }
}

fn string_items(values: &[Value], cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let Some(s) = value.as_str() else { continue };
        let s = collapse_whitespace(s);
        if s.is_empty() || out.iter().any(|o| o.eq_ignore_ascii_case(&s)) {
            continue;
        }
        out.push(s);
        if out.len() == cap {
            break;
        }
    }
    out
}

fn to_structured(raw: &RawActivityEvent, parsed: LlmEventClassification) -> StructuredEvent {
    let intent = parsed
        .intent
        .as_deref()
        .and_then(Intent::from_label)
        .unwrap_or_else(|| rules::classify_intent(raw));

    let confidence = parsed
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0) as f32)
        .unwrap_or(DEFAULT_LLM_CONFIDENCE);

    let summary = parsed
        .summary
        .map(|s| collapse_whitespace(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| collapse_whitespace(&raw.text));

    StructuredEvent {
        timestamp: raw.timestamp,
        source: raw.source,
        activity_type: ActivityType::from_label(&parsed.activity_type),
        topics: string_items(&parsed.topics, MAX_EVENT_TOPICS),
        entities: string_items(&parsed.entities, MAX_EVENT_ENTITIES),
        intent,
        confidence,
        category: raw.category.clone(),
        summary: clamp_chars(&summary, MAX_SUMMARY_CHARS),
    }
}

/// Validate a completion against its batch and map every element
pub fn parse_batch_response(
    batch: &[RawActivityEvent],
    response: &str,
) -> Result<Vec<StructuredEvent>> {
    let items = extract_json_array(response)?;
    if items.len() != batch.len() {
        return Err(DaybookError::InvalidLlmResponse(format!(
            "expected {} classifications, got {}",
            batch.len(),
            items.len()
        )));
    }

    batch
        .iter()
        .zip(items)
        .enumerate()
        .map(|(i, (raw, item))| {
            let parsed: LlmEventClassification = serde_json::from_value(item).map_err(|e| {
                DaybookError::InvalidLlmResponse(format!("element {}: {}", i, e))
            })?;
            Ok(to_structured(raw, parsed))
        })
        .collect()
}

/// Classify one batch through the backend; any failure is returned to the caller
pub async fn classify_batch(
    backend: &dyn LlmBackend,
    batch: &[RawActivityEvent],
) -> Result<Vec<StructuredEvent>> {
    let prompt = build_prompt(batch);
    let response = backend.complete(&prompt).await?;
    parse_batch_response(batch, &response)
}
