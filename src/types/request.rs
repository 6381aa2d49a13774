//! Diagnosis request types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// How a diagnosis request should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisMode {
    /// One question, one answer: the standard diagnosis flow.
    Single,
    /// A batch of independent follow-up questions about the same image.
    Conversational,
    /// Four-section in-depth analysis (disease / severity / treatment / prevention).
    Detailed,
}

impl Default for DiagnosisMode {
    fn default() -> Self {
        Self::Single
    }
}

/// A single diagnosis request as handed to the orchestrator.
///
/// Image content is kept as [`Bytes`] so clones are cheap while the request
/// travels through the provider chain.
#[derive(Debug, Clone)]
pub struct DiagnosisRequest {
    /// Raw image content (opaque byte sequence).
    pub image: Bytes,
    /// Crop type, e.g. "tomato".
    pub crop_type: String,
    /// Free-text issue description from the grower.
    pub description: String,
    /// Follow-up questions for conversational mode.
    pub questions: Option<Vec<String>>,
    /// Requested answer mode.
    pub mode: DiagnosisMode,
}

impl DiagnosisRequest {
    pub fn new(image: impl Into<Bytes>, crop_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            crop_type: crop_type.into(),
            description: description.into(),
            questions: None,
            mode: DiagnosisMode::Single,
        }
    }

    pub fn with_mode(mut self, mode: DiagnosisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_questions(mut self, questions: Vec<String>) -> Self {
        self.questions = Some(questions);
        self.mode = DiagnosisMode::Conversational;
        self
    }

    /// Disambiguating context string used for cache key derivation.
    ///
    /// Semantically distinct requests (different crop/issue pair, different
    /// question batch, detailed-mode sentinel) must never collide; identical
    /// requests must always collide.
    pub fn context_string(&self) -> String {
        match self.mode {
            DiagnosisMode::Single => format!("{}:{}", self.crop_type, self.description),
            DiagnosisMode::Detailed => "detailed_analysis".to_string(),
            DiagnosisMode::Conversational => self
                .questions
                .as_deref()
                .unwrap_or_default()
                .join("|"),
        }
    }
}
