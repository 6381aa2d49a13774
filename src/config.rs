//! Engine configuration.
//!
//! Every knob has a production-friendly default and an environment
//! override, so deployments tune behavior without code changes:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `AGRODIAG_VISION_URL` | `http://localhost:8081` | Vision-language tier base URL |
//! | `AGRODIAG_VISION_API_KEY` | unset | Bearer token for the vision tier |
//! | `AGRODIAG_VISION_TIMEOUT_SECS` | `30` | Single-question timeout |
//! | `AGRODIAG_DETAILED_MULTIPLIER` | `4` | Detailed-mode timeout = single × multiplier |
//! | `AGRODIAG_CLASSIFIER_URL` | `http://localhost:8082` | Classifier tier base URL |
//! | `AGRODIAG_CLASSIFIER_TIMEOUT_SECS` | `10` | Classifier timeout |
//! | `AGRODIAG_CACHE_TTL_SECS` | `3600` | Cache entry time-to-live |
//! | `AGRODIAG_CACHE_MAX_ENTRIES` | `100` | Cache capacity |

use crate::cache::CacheConfig;
use std::env;
use std::time::Duration;

// Values that do not parse at the target width fall back to the default.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

/// Primary vision-language tier settings.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Budget for one question/answer round trip.
    pub timeout: Duration,
    /// Detailed mode issues multiple internal sub-questions, so its budget
    /// is this multiple of the single-question timeout.
    pub detailed_multiplier: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            detailed_multiplier: 4,
        }
    }
}

/// Secondary classifier tier settings.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Top-level configuration for the diagnosis orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub vision: VisionConfig,
    pub classifier: ClassifierConfig,
    pub cache: CacheConfig,
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = env::var("AGRODIAG_VISION_URL") {
            cfg.vision.base_url = url;
        }
        cfg.vision.api_key = env::var("AGRODIAG_VISION_API_KEY").ok();
        cfg.vision.timeout =
            Duration::from_secs(env_parse("AGRODIAG_VISION_TIMEOUT_SECS", 30));
        cfg.vision.detailed_multiplier = env_parse("AGRODIAG_DETAILED_MULTIPLIER", 4u32);
        if let Ok(url) = env::var("AGRODIAG_CLASSIFIER_URL") {
            cfg.classifier.base_url = url;
        }
        cfg.classifier.timeout =
            Duration::from_secs(env_parse("AGRODIAG_CLASSIFIER_TIMEOUT_SECS", 10));
        cfg.cache.ttl = Duration::from_secs(env_parse("AGRODIAG_CACHE_TTL_SECS", 3600));
        cfg.cache.max_entries = env_parse("AGRODIAG_CACHE_MAX_ENTRIES", 100usize);
        cfg
    }

    pub fn with_vision(mut self, vision: VisionConfig) -> Self {
        self.vision = vision;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = OrchestratorConfig::new();
        assert_eq!(cfg.vision.timeout, Duration::from_secs(30));
        assert_eq!(cfg.vision.detailed_multiplier, 4);
        assert_eq!(cfg.classifier.timeout, Duration::from_secs(10));
        assert_eq!(cfg.cache.max_entries, 100);
    }

    #[test]
    fn test_env_overrides_parse_at_target_width() {
        // u64::MAX does not fit a u32 multiplier, so the default survives;
        // the in-range capacity override is honored.
        env::set_var("AGRODIAG_DETAILED_MULTIPLIER", "18446744073709551615");
        env::set_var("AGRODIAG_CACHE_MAX_ENTRIES", "42");
        let cfg = OrchestratorConfig::from_env();
        env::remove_var("AGRODIAG_DETAILED_MULTIPLIER");
        env::remove_var("AGRODIAG_CACHE_MAX_ENTRIES");
        assert_eq!(cfg.vision.detailed_multiplier, 4);
        assert_eq!(cfg.cache.max_entries, 42);
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = OrchestratorConfig::new().with_cache(CacheConfig {
            ttl: Duration::from_secs(60),
            max_entries: 8,
        });
        assert_eq!(cfg.cache.ttl, Duration::from_secs(60));
        assert_eq!(cfg.cache.max_entries, 8);
    }
}
