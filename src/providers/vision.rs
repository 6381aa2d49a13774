//! Primary vision-language diagnosis tier.
//!
//! Talks to a vision-language inference service that accepts an image plus
//! a natural-language question and returns unstructured diagnostic text.
//! Single-mode output is free text and is normalized by the orchestrator;
//! detailed mode issues four sub-questions (disease, severity, treatment,
//! prevention) and assembles an already-structured result from them.

use super::{DiagnosisProvider, ProviderOutput};
use crate::config::VisionConfig;
use crate::normalize::HeuristicNormalizer;
use crate::types::{DiagnosisMode, DiagnosisRequest, DiagnosisResult, SourceTier};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    answer: String,
}

/// Client for the vision-language tier.
pub struct VisionProvider {
    client: reqwest::Client,
    config: VisionConfig,
}

impl VisionProvider {
    pub fn new(config: VisionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout * config.detailed_multiplier.max(1))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(Error::Transport)?;
        Ok(Self { client, config })
    }

    /// Ask one question about an image and return the raw answer text.
    pub async fn ask(&self, image: &[u8], question: &str) -> Result<String> {
        let url = format!("{}/v1/analyze", self.config.base_url);
        let body = serde_json::json!({
            "image": BASE64.encode(image),
            "question": question,
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnalyzeResponse = resp.json().await?;
        if parsed.answer.trim().is_empty() {
            return Err(Error::runtime_with_context(
                "vision service returned an empty answer",
                ErrorContext::new().with_source("vision_provider"),
            ));
        }
        debug!(chars = parsed.answer.len(), "vision answer received");
        Ok(parsed.answer)
    }

    /// Lightweight availability probe against the service's health endpoint.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn diagnostic_question(request: &DiagnosisRequest) -> String {
        format!(
            "This is a {} plant with the following issue: {}. \
             What disease is this, how severe is it, what are the symptoms, \
             and what treatment do you recommend?",
            request.crop_type, request.description
        )
    }

    /// Detailed mode: four independent sub-questions assembled into a
    /// structured result via the pure field extractors, so the output needs
    /// no further normalization.
    async fn diagnose_detailed(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult> {
        let crop = &request.crop_type;
        let disease_answer = self
            .ask(
                &request.image,
                &format!("What disease does this {crop} plant have? Answer with the disease name."),
            )
            .await?;
        let severity_answer = self
            .ask(
                &request.image,
                &format!("How severe is the disease on this {crop} plant?"),
            )
            .await?;
        let treatment_answer = self
            .ask(
                &request.image,
                &format!("List the treatment steps for this {crop} plant's disease."),
            )
            .await?;
        let prevention_answer = self
            .ask(
                &request.image,
                &format!("How can this disease be prevented in {crop} crops in the future?"),
            )
            .await?;

        let mut disease = HeuristicNormalizer::extract_disease(&disease_answer);
        if disease == "Unknown Disease" {
            // Unlabelled answers to a direct question are usually just the name.
            let first_sentence = disease_answer
                .split(['.', '\n'])
                .next()
                .unwrap_or("")
                .trim();
            if !first_sentence.is_empty() && first_sentence.len() <= 80 {
                disease = first_sentence.to_string();
            }
        }

        let mut treatment = HeuristicNormalizer::split_items(&treatment_answer);
        if treatment.is_empty() {
            treatment = vec![HeuristicNormalizer::truncate_recommendation(
                &treatment_answer,
            )];
        }
        let mut symptoms = HeuristicNormalizer::split_items(&severity_answer);
        if symptoms.is_empty() {
            symptoms = vec!["Visual symptoms detected in image".to_string()];
        }

        Ok(DiagnosisResult {
            source: SourceTier::VisionLanguage,
            disease,
            confidence: HeuristicNormalizer::extract_confidence(&disease_answer),
            severity: HeuristicNormalizer::extract_severity(&severity_answer),
            symptoms,
            treatment,
            recommendation: HeuristicNormalizer::truncate_recommendation(&prevention_answer),
            cached: false,
        })
    }
}

#[async_trait]
impl DiagnosisProvider for VisionProvider {
    fn tier(&self) -> SourceTier {
        SourceTier::VisionLanguage
    }

    fn timeout(&self, request: &DiagnosisRequest) -> Duration {
        match request.mode {
            // Detailed mode makes multiple internal calls.
            DiagnosisMode::Detailed => {
                self.config.timeout * self.config.detailed_multiplier.max(1)
            }
            _ => self.config.timeout,
        }
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<ProviderOutput> {
        match request.mode {
            DiagnosisMode::Detailed => Ok(ProviderOutput::Structured(
                self.diagnose_detailed(request).await?,
            )),
            _ => {
                let question = Self::diagnostic_question(request);
                let answer = self.ask(&request.image, &question).await?;
                Ok(ProviderOutput::FreeText(answer))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_question_mentions_crop_and_issue() {
        let request = DiagnosisRequest::new(Bytes::new(), "tomato", "yellow leaves");
        let question = VisionProvider::diagnostic_question(&request);
        assert!(question.contains("tomato"));
        assert!(question.contains("yellow leaves"));
    }

    #[test]
    fn test_detailed_timeout_is_a_multiple() {
        let provider = VisionProvider::new(VisionConfig {
            timeout: Duration::from_secs(30),
            detailed_multiplier: 4,
            ..VisionConfig::default()
        })
        .unwrap();

        let single = DiagnosisRequest::new(Bytes::new(), "tomato", "spots");
        let detailed = single.clone().with_mode(DiagnosisMode::Detailed);
        assert_eq!(provider.timeout(&single), Duration::from_secs(30));
        assert_eq!(provider.timeout(&detailed), Duration::from_secs(120));
    }
}
