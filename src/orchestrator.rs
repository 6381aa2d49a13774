//! Cache-first sequential fallback orchestration.
//!
//! The orchestrator is the single entry point for diagnosis requests. It
//! computes a content-addressable cache key, serves hits immediately, and
//! on a miss walks an ordered provider chain — vision-language, then
//! classifier, then the in-process mock table — stopping at the first
//! success. Each tier gets one bounded attempt; any failure (timeout,
//! transport error, non-success status) is logged and advances the chain.
//! No tier failure ever propagates to the caller.
//!
//! The chain is strictly sequential by design: trying all tiers at once
//! would spend the expensive vision tier on requests a cheaper tier could
//! satisfy, and tier priority is itself the desired behavior. Callers
//! needing a hard latency bound should wrap [`Orchestrator::diagnose`] in
//! their own deadline; the worst case is the sum of the configured tier
//! timeouts.

use crate::cache::{CacheConfig, CacheKey, CacheStats, DiagnosisCache};
use crate::config::OrchestratorConfig;
use crate::normalize::{HeuristicNormalizer, Normalizer};
use crate::providers::{
    ClassifierProvider, DiagnosisProvider, MockProvider, ProviderOutput, VisionProvider,
};
use crate::types::{DiagnosisRequest, DiagnosisResult, QuestionAnswer, SourceTier};
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

const QUESTION_FALLBACK_ANSWER: &str =
    "Unable to answer this question right now; please retry or consult a local expert.";

/// Orchestrates the fallback chain and owns the response cache.
pub struct Orchestrator {
    providers: Vec<Arc<dyn DiagnosisProvider>>,
    cache: DiagnosisCache,
    normalizer: Box<dyn Normalizer>,
    /// Kept separately for conversational mode and the health probe.
    vision: Option<Arc<VisionProvider>>,
    question_timeout: Duration,
}

impl Orchestrator {
    /// Build with the default chain (vision → classifier → mock).
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        OrchestratorBuilder::new().with_config(config).build()
    }

    /// Run one diagnosis request through the cache and fallback chain.
    ///
    /// The only error surfaced here is invalid input (empty image content);
    /// provider failures are absorbed by the chain and the terminal mock
    /// tier guarantees a usable structured answer.
    pub async fn diagnose(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult> {
        if request.image.is_empty() {
            return Err(Error::validation_with_context(
                "image content is empty",
                ErrorContext::new()
                    .with_field_path("request.image")
                    .with_source("orchestrator"),
            ));
        }

        let request_id = Uuid::new_v4();
        let key = CacheKey::for_request(request);
        if let Some(hit) = self.cache.get(&key) {
            info!(%request_id, crop = %request.crop_type, "serving cached diagnosis");
            return Ok(hit);
        }

        let (tier, output) = self.attempt_chain(request, request_id).await;
        let result = match output {
            ProviderOutput::FreeText(text) => self.normalizer.normalize(&text).into_result(tier),
            ProviderOutput::Structured(result) => result,
        };

        // Mock results are cached too: repeated identical requests should
        // short-circuit even when the real tiers are down.
        self.cache.put(&key, result.clone());
        info!(
            %request_id,
            tier = %tier,
            disease = %result.disease,
            confidence = result.confidence,
            "diagnosis complete"
        );
        Ok(result)
    }

    /// Walk the chain in priority order; first success wins. One attempt
    /// per tier, no retries.
    async fn attempt_chain(
        &self,
        request: &DiagnosisRequest,
        request_id: Uuid,
    ) -> (SourceTier, ProviderOutput) {
        for provider in &self.providers {
            let tier = provider.tier();
            let budget = provider.timeout(request);
            match tokio::time::timeout(budget, provider.diagnose(request)).await {
                Ok(Ok(output)) => {
                    info!(%request_id, tier = %tier, "tier succeeded");
                    return (tier, output);
                }
                Ok(Err(err)) if err.is_tier_unavailable() => {
                    warn!(%request_id, tier = %tier, error = %err, "tier unavailable, advancing");
                }
                Ok(Err(err)) => {
                    error!(%request_id, tier = %tier, error = %err, "unexpected tier error, advancing");
                }
                Err(_) => {
                    let err = Error::Timeout {
                        tier: tier.as_str().to_string(),
                        timeout_ms: budget.as_millis() as u64,
                    };
                    warn!(%request_id, tier = %tier, error = %err, "tier unavailable, advancing");
                }
            }
        }

        // Unreachable with the default chain (the mock tier is infallible),
        // but a custom chain may exhaust; keep the no-throw guarantee.
        error!(%request_id, "all tiers exhausted, serving generic record");
        (
            SourceTier::Mock,
            ProviderOutput::Structured(MockProvider::generic_result()),
        )
    }

    /// Conversational mode: answer an ordered list of independent questions
    /// about one image, one vision-tier call per question.
    ///
    /// Bypasses the response cache (batch repeat rates are too low to pay
    /// for it). A failed question gets a fixed fallback answer rather than
    /// failing the batch.
    pub async fn answer_questions(
        &self,
        image: Bytes,
        questions: &[String],
    ) -> Result<Vec<QuestionAnswer>> {
        if image.is_empty() {
            return Err(Error::validation_with_context(
                "image content is empty",
                ErrorContext::new()
                    .with_field_path("image")
                    .with_source("orchestrator"),
            ));
        }
        let vision = self.vision.as_ref().ok_or_else(|| {
            Error::configuration_with_context(
                "conversational mode requires the vision-language tier",
                ErrorContext::new().with_source("orchestrator"),
            )
        })?;

        let request_id = Uuid::new_v4();
        let mut answers = Vec::with_capacity(questions.len());
        for question in questions {
            let answer =
                match tokio::time::timeout(self.question_timeout, vision.ask(&image, question))
                    .await
                {
                    Ok(Ok(answer)) => answer,
                    Ok(Err(err)) => {
                        warn!(%request_id, error = %err, question = %question, "question failed");
                        QUESTION_FALLBACK_ANSWER.to_string()
                    }
                    Err(_) => {
                        warn!(%request_id, question = %question, "question timed out");
                        QUESTION_FALLBACK_ANSWER.to_string()
                    }
                };
            answers.push(QuestionAnswer {
                question: question.clone(),
                answer,
            });
        }
        Ok(answers)
    }

    /// Probe the vision tier's health endpoint. False when the tier is
    /// absent from the chain.
    pub async fn vision_healthy(&self) -> bool {
        match &self.vision {
            Some(vision) => vision.health().await,
            None => false,
        }
    }

    /// Operator-triggered cache invalidation.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Read-only cache introspection.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Builder for [`Orchestrator`].
///
/// Without explicit providers, `build` assembles the default chain from the
/// configuration; tests and embedders can inject a custom chain instead.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    providers: Vec<Arc<dyn DiagnosisProvider>>,
    normalizer: Option<Box<dyn Normalizer>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            providers: Vec::new(),
            normalizer: None,
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache_config(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    /// Append a provider to the chain, replacing the default chain.
    /// Providers are attempted in the order they are added.
    pub fn with_provider(mut self, provider: impl DiagnosisProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Swap in an alternate free-text normalization strategy.
    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Some(Box::new(normalizer));
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        let question_timeout = self.config.vision.timeout;
        let mut vision_handle = None;
        let providers: Vec<Arc<dyn DiagnosisProvider>> = if self.providers.is_empty() {
            let vision = Arc::new(VisionProvider::new(self.config.vision.clone())?);
            vision_handle = Some(Arc::clone(&vision));
            let classifier = Arc::new(ClassifierProvider::new(self.config.classifier.clone())?);
            vec![vision, classifier, Arc::new(MockProvider::new())]
        } else {
            self.providers
        };

        Ok(Orchestrator {
            providers,
            cache: DiagnosisCache::new(self.config.cache),
            normalizer: self
                .normalizer
                .unwrap_or_else(|| Box::new(HeuristicNormalizer::new())),
            vision: vision_handle,
            question_timeout,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
