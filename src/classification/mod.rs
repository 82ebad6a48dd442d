//! Classification engine
//!
//! Turns [`RawActivityEvent`]s into [`StructuredEvent`]s. Two strategies
//! implement [`EventClassifier`]:
//! - [`RuleClassifier`]: deterministic rules only
//! - [`LlmClassifier`]: batched LLM calls, with every failed batch
//!   re-classified by rules
//!
//! The strategy is chosen once from [`ClassificationConfig`]. Neither
//! strategy can fail: the result always has one event per input, in input
//! order.

pub mod llm;
pub mod normalize;
pub mod rules;

pub use llm::{HttpLlmBackend, LlmBackend};
pub use normalize::{ActivityBundle, AiSession, BrowserVisit, GitCommitRecord, SearchQuery};

use crate::config::ClassificationConfig;
use crate::error::Result;
use crate::types::{ClassificationResult, RawActivityEvent};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A classification strategy
#[async_trait]
pub trait EventClassifier: Send + Sync {
    /// Strategy name, for logging
    fn name(&self) -> &str;

    /// Classify every event, preserving input order
    async fn classify(&self, events: &[RawActivityEvent]) -> ClassificationResult;
}

/// Rules-only strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous entry point; the async trait method delegates here
    pub fn classify_sync(&self, events: &[RawActivityEvent]) -> ClassificationResult {
        let start = Instant::now();
        let classified: Vec<_> = events.iter().map(rules::classify_event).collect();

        ClassificationResult {
            total_processed: classified.len(),
            llm_classified: 0,
            rule_classified: classified.len(),
            events: classified,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[async_trait]
impl EventClassifier for RuleClassifier {
    fn name(&self) -> &str {
        "rules"
    }

    async fn classify(&self, events: &[RawActivityEvent]) -> ClassificationResult {
        self.classify_sync(events)
    }
}

/// LLM strategy with per-batch rule fallback
pub struct LlmClassifier {
    backend: Arc<dyn LlmBackend>,
    batch_size: usize,
}

impl LlmClassifier {
    pub fn new(backend: Arc<dyn LlmBackend>, batch_size: usize) -> Self {
        Self {
            backend,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[async_trait]
impl EventClassifier for LlmClassifier {
    fn name(&self) -> &str {
        "llm"
    }

    async fn classify(&self, events: &[RawActivityEvent]) -> ClassificationResult {
        let start = Instant::now();
        let mut classified = Vec::with_capacity(events.len());
        let mut llm_classified = 0;
        let mut rule_classified = 0;

        for (index, batch) in events.chunks(self.batch_size).enumerate() {
            match llm::classify_batch(self.backend.as_ref(), batch).await {
                Ok(batch_events) => {
                    debug!("Batch {} classified by {}", index, self.backend.model_name());
                    llm_classified += batch_events.len();
                    classified.extend(batch_events);
                }
                Err(e) => {
                    warn!(
                        "LLM classification failed for batch {} ({} events), using rules: {}",
                        index,
                        batch.len(),
                        e
                    );
                    rule_classified += batch.len();
                    classified.extend(batch.iter().map(rules::classify_event));
                }
            }
        }

        ClassificationResult {
            total_processed: classified.len(),
            llm_classified,
            rule_classified,
            events: classified,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Pick the strategy the configuration asks for
///
/// Fails only if the HTTP client can't be built.
pub fn classifier_from_config(config: &ClassificationConfig) -> Result<Box<dyn EventClassifier>> {
    if !config.enabled {
        return Ok(Box::new(RuleClassifier::new()));
    }

    let backend = HttpLlmBackend::new(config)?;
    info!(
        "LLM classification enabled: model={}, batch_size={}",
        config.model, config.batch_size
    );
    Ok(Box::new(LlmClassifier::new(
        Arc::new(backend),
        config.batch_size,
    )))
}

/// Classify with whatever strategy the configuration selects
///
/// Never fails: if the LLM strategy can't even be constructed, rules are used.
pub async fn classify_events(
    events: &[RawActivityEvent],
    config: &ClassificationConfig,
) -> ClassificationResult {
    let classifier = classifier_from_config(config).unwrap_or_else(|e| {
        warn!("Falling back to rule classification: {}", e);
        Box::new(RuleClassifier::new())
    });

    let result = classifier.classify(events).await;
    debug!(
        "Classified {} events via {} ({} llm, {} rules) in {}ms",
        result.total_processed,
        classifier.name(),
        result.llm_classified,
        result.rule_classified,
        result.processing_time_ms
    );
    result
}
