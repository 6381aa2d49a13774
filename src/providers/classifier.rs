//! Secondary classifier diagnosis tier.
//!
//! A purpose-built image classifier service: cheaper and faster than the
//! vision-language tier, and it already returns structured records, so its
//! output bypasses normalization entirely.

use super::{DiagnosisProvider, ProviderOutput};
use crate::config::ClassifierConfig;
use crate::types::{DiagnosisRequest, DiagnosisResult, Severity, SourceTier};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Wire format of the classifier service. Serde defaults keep a partially
/// filled response usable; empty lists are backfilled during mapping.
#[derive(Debug, Deserialize)]
struct ClassifierResponse {
    #[serde(default)]
    disease: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    symptoms: Vec<String>,
    #[serde(default)]
    treatments: Vec<String>,
    #[serde(default)]
    recommendation: String,
}

impl ClassifierResponse {
    fn into_result(self) -> DiagnosisResult {
        DiagnosisResult {
            source: SourceTier::Classifier,
            disease: if self.disease.is_empty() {
                "Unknown Disease".to_string()
            } else {
                self.disease
            },
            confidence: self.confidence.clamp(0.0, 1.0),
            severity: Severity::from_label(&self.severity),
            symptoms: if self.symptoms.is_empty() {
                vec!["Visual symptoms detected in image".to_string()]
            } else {
                self.symptoms
            },
            treatment: if self.treatments.is_empty() {
                vec!["Consult expert for detailed assessment".to_string()]
            } else {
                self.treatments
            },
            recommendation: self.recommendation,
            cached: false,
        }
    }
}

/// Client for the classifier tier.
pub struct ClassifierProvider {
    client: reqwest::Client,
    config: ClassifierConfig,
}

impl ClassifierProvider {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(Error::Transport)?;
        Ok(Self { client, config })
    }

    async fn classify(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult> {
        let url = format!("{}/classify", self.config.base_url);
        let image = Part::bytes(request.image.to_vec())
            .file_name("image.jpg")
            .mime_str("application/octet-stream")
            .map_err(Error::Transport)?;
        let form = Form::new()
            .part("image", image)
            .text("crop_type", request.crop_type.clone())
            .text("description", request.description.clone());

        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ClassifierResponse = resp.json().await?;
        debug!(disease = %parsed.disease, "classifier response received");
        Ok(parsed.into_result())
    }
}

#[async_trait]
impl DiagnosisProvider for ClassifierProvider {
    fn tier(&self) -> SourceTier {
        SourceTier::Classifier
    }

    fn timeout(&self, _request: &DiagnosisRequest) -> Duration {
        self.config.timeout
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<ProviderOutput> {
        Ok(ProviderOutput::Structured(self.classify(request).await?))
    }
}
