//! Diagnosis provider tiers.
//!
//! Each tier of the fallback chain implements [`DiagnosisProvider`] and is
//! driven through `Box<dyn DiagnosisProvider>` by the orchestrator, so
//! adding or reordering tiers is a data change, not a control-flow change.
//!
//! | Tier | Transport | Output |
//! |------|-----------|--------|
//! | [`VisionProvider`] | HTTP JSON | Free text (normalized downstream) |
//! | [`ClassifierProvider`] | HTTP multipart | Already structured |
//! | [`MockProvider`] | In-process table | Already structured, infallible |

pub mod classifier;
pub mod mock;
pub mod vision;

use crate::types::{DiagnosisRequest, DiagnosisResult, SourceTier};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

pub use classifier::ClassifierProvider;
pub use mock::MockProvider;
pub use vision::VisionProvider;

/// Raw outcome of one provider attempt.
///
/// Free text comes only from the vision-language tier and is passed through
/// the normalizer by the orchestrator; structured output bypasses it.
#[derive(Debug, Clone)]
pub enum ProviderOutput {
    FreeText(String),
    Structured(DiagnosisResult),
}

/// One tier in the fallback chain.
///
/// Object-safe so the orchestrator can hold a heterogeneous ordered chain
/// of `Box<dyn DiagnosisProvider>`.
#[async_trait]
pub trait DiagnosisProvider: Send + Sync {
    /// Which tier this provider represents (tags results and log lines).
    fn tier(&self) -> SourceTier;

    /// Per-attempt budget for this request. The orchestrator enforces it;
    /// a provider exceeding it counts as unavailable for this request.
    fn timeout(&self, request: &DiagnosisRequest) -> Duration;

    /// Attempt a diagnosis. Any error advances the chain to the next tier.
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<ProviderOutput>;
}
