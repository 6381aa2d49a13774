//! Structured diagnosis result types.

use serde::{Deserialize, Serialize};

/// Which tier of the fallback chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    /// Primary vision-language tier (free-text output, normalized).
    VisionLanguage,
    /// Secondary classifier tier (already structured).
    Classifier,
    /// Terminal in-process mock tier (deterministic table lookup).
    Mock,
}

impl SourceTier {
    /// Stable tag used in log fields and serialized payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTier::VisionLanguage => "vision_language",
            SourceTier::Classifier => "classifier",
            SourceTier::Mock => "mock",
        }
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a diagnosed disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Unknown,
}

impl Severity {
    /// Map a free-form severity label (as returned by the classifier tier)
    /// onto the fixed enum. Unrecognized labels become `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" | "mild" | "minor" => Severity::Low,
            "moderate" | "medium" => Severity::Moderate,
            "high" | "severe" | "critical" => Severity::High,
            _ => Severity::Unknown,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Unknown
    }
}

/// A fully structured diagnosis, identical in shape regardless of which
/// tier produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    /// Tier that produced this result.
    pub source: SourceTier,
    /// Disease name, never empty ("Unknown Disease" when undetermined).
    pub disease: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub severity: Severity,
    /// Observed symptoms, never empty.
    pub symptoms: Vec<String>,
    /// Treatment steps, never empty.
    pub treatment: Vec<String>,
    /// Full recommendation text.
    pub recommendation: String,
    /// True when served from the response cache.
    pub cached: bool,
}

/// One answered question from conversational mode. Order matches the
/// order of the submitted question list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_label_mapping() {
        assert_eq!(Severity::from_label("High"), Severity::High);
        assert_eq!(Severity::from_label(" severe "), Severity::High);
        assert_eq!(Severity::from_label("mild"), Severity::Low);
        assert_eq!(Severity::from_label("medium"), Severity::Moderate);
        assert_eq!(Severity::from_label("catastrophic"), Severity::Unknown);
    }

    #[test]
    fn test_tier_tags() {
        assert_eq!(SourceTier::VisionLanguage.as_str(), "vision_language");
        assert_eq!(SourceTier::Mock.to_string(), "mock");
    }
}
