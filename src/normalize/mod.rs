//! Free-text to structured-result normalization.
//!
//! The vision-language tier returns unstructured diagnostic prose. This
//! module converts that prose into the fixed [`DiagnosisResult`] schema via
//! label-pattern heuristics. Normalization is pure and total: it never
//! fails, and every field falls back to a fixed usable default when the
//! text yields nothing.
//!
//! Kept free of any network code so it can be unit-tested directly against
//! text fixtures, and modeled as a swappable strategy ([`Normalizer`]) so an
//! alternate response format can plug in a different implementation.

use crate::types::{DiagnosisResult, Severity, SourceTier};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum items kept in the symptom and treatment lists.
const MAX_LIST_ITEMS: usize = 5;
/// Fragments shorter than this are discarded as noise.
const MIN_FRAGMENT_LEN: usize = 4;
/// Recommendation text is truncated to this many characters.
const MAX_RECOMMENDATION_LEN: usize = 500;

const DEFAULT_DISEASE: &str = "Unknown Disease";
const DEFAULT_CONFIDENCE: f64 = 0.75;
const MAX_CONFIDENCE: f64 = 0.99;
const DEFAULT_SYMPTOM: &str = "Visual symptoms detected in image";
const DEFAULT_TREATMENT: &str = "Consult expert for detailed assessment";

// Ordered label patterns; the first match wins. Captures run to the next
// sentence boundary.
static DISEASE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)disease\s*:\s*([^.\n]+)",
        r"(?i)diagnosis\s*:\s*([^.\n]+)",
        r"(?i)identified as\s*:?\s*([^.\n]+)",
        r"(?i)appears to be\s*:?\s*([^.\n]+)",
        r"(?i)suffering from\s*:?\s*([^.\n]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Plain substring scan, deliberately: boundary-free matching means "low"
// inside "yellow" also registers. Upstream behavior, preserved as-is.
const SEVERITY_HIGH_KEYWORDS: [&str; 4] = ["severe", "critical", "high", "serious"];
const SEVERITY_LOW_KEYWORDS: [&str; 4] = ["mild", "low", "minor", "early"];

static CONFIDENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)confidence\s*[:=]?\s*(\d+(?:\.\d+)?)").unwrap());

// A labelled section runs until a blank line, the next "label:" line, a
// sentence boundary followed by an inline label, or end of input.
static SYMPTOM_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\b(?:symptoms|signs)\s*:\s*(.*?)(?:\n\s*\n|\n[^\n:]{1,40}:|\.\s*[a-z][a-z ]{0,30}:|$)")
        .unwrap()
});
static TREATMENT_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\b(?:treatment|recommend(?:ations?|ed)?|steps)\s*:\s*(.*?)(?:\n\s*\n|\n[^\n:]{1,40}:|\.\s*[a-z][a-z ]{0,30}:|$)")
        .unwrap()
});

// Fragment separators: commas, semicolons, newlines, enumerated-list and
// bullet markers.
static LIST_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\n]|\d+[.)]\s+|[-*•]\s+").unwrap());

/// Normalizer-independent view of the fields extracted from free text.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReport {
    pub disease: String,
    pub severity: Severity,
    pub confidence: f64,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub recommendation: String,
}

impl NormalizedReport {
    /// Assemble the final structured result, tagged with the tier that
    /// produced the underlying text.
    pub fn into_result(self, source: SourceTier) -> DiagnosisResult {
        DiagnosisResult {
            source,
            disease: self.disease,
            confidence: self.confidence,
            severity: self.severity,
            symptoms: self.symptoms,
            treatment: self.treatment,
            recommendation: self.recommendation,
            cached: false,
        }
    }
}

/// Strategy for converting unstructured diagnosis text into the fixed
/// structured schema. Implementations must be pure and total.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> NormalizedReport;
}

/// Default label-pattern heuristic normalizer.
#[derive(Debug, Clone, Default)]
pub struct HeuristicNormalizer;

impl HeuristicNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Extract the disease name, or the fixed default when no label matches.
    pub fn extract_disease(text: &str) -> String {
        for pattern in DISEASE_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(text) {
                let name = caps[1].trim().trim_matches(|c| c == '"' || c == '*');
                if !name.is_empty() {
                    return name.to_string();
                }
            }
        }
        DEFAULT_DISEASE.to_string()
    }

    /// Case-insensitive substring scan for severity keywords. The
    /// high-severity set takes precedence; negation is intentionally not
    /// handled ("not severe" still reads as severe), matching upstream
    /// behavior.
    pub fn extract_severity(text: &str) -> Severity {
        let lower = text.to_lowercase();
        if SEVERITY_HIGH_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            Severity::High
        } else if SEVERITY_LOW_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            Severity::Low
        } else {
            Severity::Moderate
        }
    }

    /// Extract a "confidence: NN" percentage, clamped to 0.99.
    pub fn extract_confidence(text: &str) -> f64 {
        CONFIDENCE_PATTERN
            .captures(text)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(|pct| (pct / 100.0).min(MAX_CONFIDENCE))
            .unwrap_or(DEFAULT_CONFIDENCE)
    }

    /// Split a section body into trimmed fragments, discarding noise
    /// shorter than four characters and capping at five items.
    pub fn split_items(section: &str) -> Vec<String> {
        LIST_SPLIT
            .split(section)
            .map(|fragment| fragment.trim().trim_start_matches("and ").trim())
            .filter(|fragment| fragment.len() >= MIN_FRAGMENT_LEN)
            .map(|fragment| fragment.to_string())
            .take(MAX_LIST_ITEMS)
            .collect()
    }

    fn extract_list(text: &str, section: &Regex, fallback: &str) -> Vec<String> {
        let items = section
            .captures(text)
            .map(|caps| Self::split_items(&caps[1]))
            .unwrap_or_default();
        if items.is_empty() {
            vec![fallback.to_string()]
        } else {
            items
        }
    }

    /// Truncate recommendation text to the fixed maximum, appending an
    /// ellipsis marker when cut.
    pub fn truncate_recommendation(text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.chars().count() <= MAX_RECOMMENDATION_LEN {
            trimmed.to_string()
        } else {
            let cut: String = trimmed.chars().take(MAX_RECOMMENDATION_LEN).collect();
            format!("{}...", cut)
        }
    }
}

impl Normalizer for HeuristicNormalizer {
    fn normalize(&self, text: &str) -> NormalizedReport {
        NormalizedReport {
            disease: Self::extract_disease(text),
            severity: Self::extract_severity(text),
            confidence: Self::extract_confidence(text),
            symptoms: Self::extract_list(text, &SYMPTOM_SECTION, DEFAULT_SYMPTOM),
            treatment: Self::extract_list(text, &TREATMENT_SECTION, DEFAULT_TREATMENT),
            recommendation: Self::truncate_recommendation(text),
        }
    }
}
