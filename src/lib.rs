//! # agrodiag
//!
//! Multi-tier crop disease diagnosis engine with response caching and
//! free-text normalization.
//!
//! ## Overview
//!
//! This library orchestrates automated crop-disease diagnosis requests
//! against a chain of heterogeneous backend inference services. A request
//! flows through a content-addressable cache first; on a miss, an ordered
//! fallback chain of providers is attempted sequentially until one
//! succeeds. Free-text output from the vision-language tier is converted
//! into the fixed structured result schema before it is cached or returned.
//!
//! ## Core Guarantees
//!
//! - **Always answers**: the terminal mock tier is a pure in-process table
//!   lookup that cannot fail, so [`Orchestrator::diagnose`] always
//!   terminates with a usable, schema-complete result.
//! - **Uniform schema**: every [`DiagnosisResult`] looks the same
//!   regardless of which tier produced it; callers never branch on source.
//! - **Bounded cache**: the cache never exceeds its configured entry count
//!   (FIFO eviction) and entries expire after a configured TTL.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agrodiag::{DiagnosisRequest, OrchestratorBuilder, OrchestratorConfig};
//! use bytes::Bytes;
//!
//! #[tokio::main]
//! async fn main() -> agrodiag::Result<()> {
//!     let orchestrator = OrchestratorBuilder::new()
//!         .with_config(OrchestratorConfig::from_env())
//!         .build()?;
//!
//!     let request = DiagnosisRequest::new(
//!         Bytes::from_static(b"...image bytes..."),
//!         "tomato",
//!         "yellow leaves with brown spots",
//!     );
//!
//!     let result = orchestrator.diagnose(&request).await?;
//!     println!("{} ({:.0}%)", result.disease, result.confidence * 100.0);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Core type definitions (requests, results, severity, tiers) |
//! | [`cache`] | Content-addressable FIFO/TTL response cache |
//! | [`normalize`] | Free-text to structured-result normalization |
//! | [`providers`] | Diagnosis provider tiers (vision, classifier, mock) |
//! | [`orchestrator`] | Cache-first sequential fallback orchestration |
//! | [`config`] | Tier and cache configuration |

pub mod cache;
pub mod config;
pub mod normalize;
pub mod orchestrator;
pub mod providers;
pub mod types;

// Re-export main types for convenience
pub use cache::{CacheConfig, CacheKey, CacheStats, DiagnosisCache};
pub use config::{ClassifierConfig, OrchestratorConfig, VisionConfig};
pub use normalize::{HeuristicNormalizer, NormalizedReport, Normalizer};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use providers::{
    ClassifierProvider, DiagnosisProvider, MockProvider, ProviderOutput, VisionProvider,
};
pub use types::{
    DiagnosisMode, DiagnosisRequest, DiagnosisResult, QuestionAnswer, Severity, SourceTier,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
