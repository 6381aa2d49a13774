//! Terminal deterministic mock tier.
//!
//! A pure in-process table lookup keyed by crop type and issue-description
//! keywords. It performs no I/O and cannot fail, which is what guarantees
//! the fallback chain always terminates with a usable answer.

use super::{DiagnosisProvider, ProviderOutput};
use crate::types::{DiagnosisRequest, DiagnosisResult, Severity, SourceTier};
use crate::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::time::Duration;

struct CannedDiagnosis {
    disease: &'static str,
    confidence: f64,
    severity: Severity,
    symptoms: &'static [&'static str],
    treatment: &'static [&'static str],
    recommendation: &'static str,
}

impl CannedDiagnosis {
    fn to_result(&self) -> DiagnosisResult {
        DiagnosisResult {
            source: SourceTier::Mock,
            disease: self.disease.to_string(),
            confidence: self.confidence,
            severity: self.severity,
            symptoms: self.symptoms.iter().map(|s| s.to_string()).collect(),
            treatment: self.treatment.iter().map(|s| s.to_string()).collect(),
            recommendation: self.recommendation.to_string(),
            cached: false,
        }
    }
}

// Vec-of-pairs keeps iteration order deterministic: when two keywords carry
// equal confidence, the first one in the table wins the tie-break.
static DIAGNOSIS_TABLE: Lazy<Vec<(&'static str, Vec<(&'static str, CannedDiagnosis)>)>> =
    Lazy::new(|| {
        vec![
            (
                "tomato",
                vec![
                    (
                        "yellow leaves",
                        CannedDiagnosis {
                            disease: "Early Blight",
                            confidence: 0.85,
                            severity: Severity::Moderate,
                            symptoms: &[
                                "Yellowing lower leaves",
                                "Brown concentric ring spots",
                                "Premature leaf drop",
                            ],
                            treatment: &[
                                "Remove and destroy affected leaves",
                                "Apply copper-based fungicide",
                                "Mulch soil to prevent splash",
                            ],
                            recommendation:
                                "Early Blight spreads through rain splash; treat promptly and avoid overhead watering.",
                        },
                    ),
                    (
                        "wilt",
                        CannedDiagnosis {
                            disease: "Fusarium Wilt",
                            confidence: 0.82,
                            severity: Severity::High,
                            symptoms: &[
                                "Wilting despite moist soil",
                                "Yellowing on one side of the plant",
                                "Brown vascular tissue",
                            ],
                            treatment: &[
                                "Remove infected plants entirely",
                                "Solarize soil before replanting",
                                "Plant resistant varieties next season",
                            ],
                            recommendation:
                                "Fusarium Wilt persists in soil for years; rotate away from tomatoes.",
                        },
                    ),
                    (
                        "spots",
                        CannedDiagnosis {
                            disease: "Septoria Leaf Spot",
                            confidence: 0.80,
                            severity: Severity::Moderate,
                            symptoms: &[
                                "Small circular spots with dark borders",
                                "Spots beginning on lower leaves",
                            ],
                            treatment: &[
                                "Prune affected foliage",
                                "Apply chlorothalonil fungicide",
                                "Improve air circulation",
                            ],
                            recommendation:
                                "Septoria rarely kills plants but defoliation reduces yield; act early.",
                        },
                    ),
                    (
                        "curl",
                        CannedDiagnosis {
                            disease: "Tomato Leaf Curl Virus",
                            confidence: 0.78,
                            severity: Severity::High,
                            symptoms: &[
                                "Upward curling leaves",
                                "Stunted growth",
                                "Yellowed leaf margins",
                            ],
                            treatment: &[
                                "Remove infected plants",
                                "Control whitefly vectors",
                                "Use reflective mulch",
                            ],
                            recommendation:
                                "Leaf curl virus is vector-borne; controlling whiteflies protects the rest of the crop.",
                        },
                    ),
                ],
            ),
            (
                "potato",
                vec![
                    (
                        "black",
                        CannedDiagnosis {
                            disease: "Late Blight",
                            confidence: 0.86,
                            severity: Severity::High,
                            symptoms: &[
                                "Dark water-soaked lesions",
                                "White mold on leaf undersides",
                                "Rapid foliage collapse",
                            ],
                            treatment: &[
                                "Destroy infected foliage immediately",
                                "Apply systemic fungicide",
                                "Harvest early if infection is widespread",
                            ],
                            recommendation:
                                "Late Blight can destroy a field within days in humid weather; act immediately.",
                        },
                    ),
                    (
                        "yellow",
                        CannedDiagnosis {
                            disease: "Early Blight",
                            confidence: 0.75,
                            severity: Severity::Moderate,
                            symptoms: &["Target-shaped leaf spots", "Yellowing around lesions"],
                            treatment: &[
                                "Apply protectant fungicide",
                                "Remove volunteer plants",
                                "Ensure balanced fertilization",
                            ],
                            recommendation:
                                "Stressed plants are more susceptible; maintain steady irrigation and nutrition.",
                        },
                    ),
                ],
            ),
            (
                "wheat",
                vec![
                    (
                        "rust",
                        CannedDiagnosis {
                            disease: "Leaf Rust",
                            confidence: 0.84,
                            severity: Severity::Moderate,
                            symptoms: &[
                                "Orange-brown pustules on leaves",
                                "Pustules scattered on upper surface",
                            ],
                            treatment: &[
                                "Apply triazole fungicide",
                                "Monitor flag leaf closely",
                            ],
                            recommendation:
                                "Protecting the flag leaf preserves most of the yield; time fungicide accordingly.",
                        },
                    ),
                    (
                        "powdery",
                        CannedDiagnosis {
                            disease: "Powdery Mildew",
                            confidence: 0.80,
                            severity: Severity::Low,
                            symptoms: &["White powdery patches", "Patches on lower leaves and stems"],
                            treatment: &[
                                "Apply sulfur-based fungicide",
                                "Avoid excess nitrogen",
                            ],
                            recommendation:
                                "Dense canopies favor mildew; moderate seeding rates reduce pressure.",
                        },
                    ),
                ],
            ),
            (
                "rice",
                vec![
                    (
                        "blast",
                        CannedDiagnosis {
                            disease: "Rice Blast",
                            confidence: 0.85,
                            severity: Severity::High,
                            symptoms: &[
                                "Diamond-shaped lesions with gray centers",
                                "Node blackening",
                                "Panicle breakage",
                            ],
                            treatment: &[
                                "Apply tricyclazole fungicide",
                                "Drain fields to reduce humidity",
                                "Avoid excessive nitrogen",
                            ],
                            recommendation:
                                "Blast thrives on lush nitrogen-fed growth; split fertilizer applications.",
                        },
                    ),
                    (
                        "brown spot",
                        CannedDiagnosis {
                            disease: "Brown Spot",
                            confidence: 0.80,
                            severity: Severity::Moderate,
                            symptoms: &["Oval brown lesions on leaves", "Dark spots on grains"],
                            treatment: &[
                                "Correct potassium deficiency",
                                "Treat seed before planting",
                            ],
                            recommendation:
                                "Brown Spot often signals nutrient-poor soil; test and amend before next season.",
                        },
                    ),
                ],
            ),
            (
                "corn",
                vec![
                    (
                        "rust",
                        CannedDiagnosis {
                            disease: "Common Rust",
                            confidence: 0.83,
                            severity: Severity::Moderate,
                            symptoms: &[
                                "Cinnamon-brown pustules on both leaf surfaces",
                                "Pustules turning black late season",
                            ],
                            treatment: &[
                                "Apply foliar fungicide at first sign",
                                "Plant resistant hybrids",
                            ],
                            recommendation:
                                "Common Rust seldom warrants treatment after silking; scout weekly before then.",
                        },
                    ),
                    (
                        "blight",
                        CannedDiagnosis {
                            disease: "Northern Leaf Blight",
                            confidence: 0.82,
                            severity: Severity::Moderate,
                            symptoms: &[
                                "Long gray-green cigar-shaped lesions",
                                "Lesions starting on lower leaves",
                            ],
                            treatment: &[
                                "Rotate away from corn for a season",
                                "Bury crop residue",
                                "Apply fungicide if lesions reach the ear leaf",
                            ],
                            recommendation:
                                "Residue carries the pathogen over winter; tillage and rotation break the cycle.",
                        },
                    ),
                ],
            ),
        ]
    });

static GENERIC_DIAGNOSIS: CannedDiagnosis = CannedDiagnosis {
    disease: "Unknown Disease",
    confidence: 0.65,
    severity: Severity::Unknown,
    symptoms: &["Visual symptoms detected in image"],
    treatment: &[
        "Consult expert for detailed assessment",
        "Isolate affected plants as a precaution",
    ],
    recommendation:
        "The described symptoms did not match a known pattern; a local agricultural extension office can perform a lab diagnosis.",
};

/// Deterministic in-process diagnosis table, the infallible terminal tier.
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    /// Keyword lookup: scan the crop's table against the lower-cased issue
    /// description and keep the highest-confidence match. Strict `>`
    /// comparison means the first of equal-confidence keywords wins.
    pub fn lookup(crop_type: &str, description: &str) -> DiagnosisResult {
        let crop = crop_type.trim().to_lowercase();
        let description = description.to_lowercase();

        let mut best: Option<&CannedDiagnosis> = None;
        if let Some((_, entries)) = DIAGNOSIS_TABLE.iter().find(|(c, _)| *c == crop) {
            for (keyword, canned) in entries {
                if description.contains(keyword)
                    && best.map_or(true, |b| canned.confidence > b.confidence)
                {
                    best = Some(canned);
                }
            }
        }

        best.unwrap_or(&GENERIC_DIAGNOSIS).to_result()
    }

    /// The fixed generic record returned when nothing matches.
    pub fn generic_result() -> DiagnosisResult {
        GENERIC_DIAGNOSIS.to_result()
    }
}

#[async_trait]
impl DiagnosisProvider for MockProvider {
    fn tier(&self) -> SourceTier {
        SourceTier::Mock
    }

    fn timeout(&self, _request: &DiagnosisRequest) -> Duration {
        // Pure computation; the budget exists only to satisfy the contract.
        Duration::from_secs(1)
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<ProviderOutput> {
        Ok(ProviderOutput::Structured(Self::lookup(
            &request.crop_type,
            &request.description,
        )))
    }
}
