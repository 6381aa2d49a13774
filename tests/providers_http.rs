//! HTTP provider tests against a local mock server.

use agrodiag::{
    ClassifierConfig, ClassifierProvider, DiagnosisProvider, DiagnosisRequest, OrchestratorBuilder,
    OrchestratorConfig, ProviderOutput, Severity, SourceTier, VisionConfig, VisionProvider,
};
use bytes::Bytes;

fn request() -> DiagnosisRequest {
    DiagnosisRequest::new(Bytes::from_static(b"leaf-image"), "tomato", "yellow leaves")
}

fn vision_config(base_url: String) -> VisionConfig {
    VisionConfig {
        base_url,
        ..VisionConfig::default()
    }
}

fn classifier_config(base_url: String) -> ClassifierConfig {
    ClassifierConfig {
        base_url,
        ..ClassifierConfig::default()
    }
}

#[tokio::test]
async fn vision_ask_returns_answer_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/analyze")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"answer": "Diagnosis: Early Blight. Severity: mild."}"#)
        .create_async()
        .await;

    let provider = VisionProvider::new(vision_config(server.url())).unwrap();
    let answer = provider.ask(b"leaf-image", "What disease is this?").await.unwrap();
    assert!(answer.contains("Early Blight"));
    mock.assert_async().await;
}

#[tokio::test]
async fn vision_non_success_status_is_remote_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/analyze")
        .with_status(503)
        .with_body("model overloaded")
        .create_async()
        .await;

    let provider = VisionProvider::new(vision_config(server.url())).unwrap();
    let err = provider.ask(b"leaf-image", "What disease?").await.unwrap_err();
    match err {
        agrodiag::Error::Remote { status, message } => {
            assert_eq!(status, 503);
            assert!(message.contains("overloaded"));
        }
        other => panic!("expected remote error, got {other}"),
    }
}

#[tokio::test]
async fn vision_health_probe() {
    let mut server = mockito::Server::new_async().await;
    let healthy = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let provider = VisionProvider::new(vision_config(server.url())).unwrap();
    assert!(provider.health().await);
    healthy.assert_async().await;

    let unreachable =
        VisionProvider::new(vision_config("http://127.0.0.1:1".to_string())).unwrap();
    assert!(!unreachable.health().await);
}

#[tokio::test]
async fn classifier_parses_structured_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/classify")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "disease": "Septoria Leaf Spot",
                "confidence": 0.88,
                "severity": "moderate",
                "symptoms": ["circular spots", "dark borders"],
                "treatments": ["prune foliage", "apply fungicide"],
                "recommendation": "Improve air circulation between plants."
            }"#,
        )
        .create_async()
        .await;

    let provider = ClassifierProvider::new(classifier_config(server.url())).unwrap();
    let output = provider.diagnose(&request()).await.unwrap();
    let result = match output {
        ProviderOutput::Structured(result) => result,
        ProviderOutput::FreeText(_) => panic!("classifier output is structured"),
    };
    assert_eq!(result.source, SourceTier::Classifier);
    assert_eq!(result.disease, "Septoria Leaf Spot");
    assert_eq!(result.severity, Severity::Moderate);
    assert_eq!(result.symptoms.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn classifier_non_success_status_is_remote_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/classify")
        .with_status(404)
        .create_async()
        .await;

    let provider = ClassifierProvider::new(classifier_config(server.url())).unwrap();
    let err = provider.diagnose(&request()).await.unwrap_err();
    assert!(matches!(err, agrodiag::Error::Remote { status: 404, .. }));
}

#[tokio::test]
async fn default_chain_falls_back_from_vision_to_classifier() {
    let mut vision_server = mockito::Server::new_async().await;
    let _vision_down = vision_server
        .mock("POST", "/v1/analyze")
        .with_status(500)
        .create_async()
        .await;

    let mut classifier_server = mockito::Server::new_async().await;
    let _classifier_up = classifier_server
        .mock("POST", "/classify")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"disease": "Late Blight", "confidence": 0.9, "severity": "high"}"#)
        .create_async()
        .await;

    let config = OrchestratorConfig::new()
        .with_vision(vision_config(vision_server.url()))
        .with_classifier(classifier_config(classifier_server.url()));
    let orchestrator = OrchestratorBuilder::new().with_config(config).build().unwrap();

    let result = orchestrator.diagnose(&request()).await.unwrap();
    assert_eq!(result.source, SourceTier::Classifier);
    assert_eq!(result.disease, "Late Blight");
    assert_eq!(result.severity, Severity::High);
}

#[tokio::test]
async fn conversational_mode_answers_each_question_in_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/analyze")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"answer": "Yes, it can spread through rain splash."}"#)
        .expect(2)
        .create_async()
        .await;

    let config = OrchestratorConfig::new().with_vision(vision_config(server.url()));
    let orchestrator = OrchestratorBuilder::new().with_config(config).build().unwrap();

    let questions = vec![
        "Will it spread to nearby plants?".to_string(),
        "Is the fruit still safe to eat?".to_string(),
    ];
    let answers = orchestrator
        .answer_questions(Bytes::from_static(b"leaf-image"), &questions)
        .await
        .unwrap();

    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].question, questions[0]);
    assert_eq!(answers[1].question, questions[1]);
    assert!(answers[0].answer.contains("rain splash"));
    mock.assert_async().await;
}

#[tokio::test]
async fn conversational_question_failure_gets_fallback_answer() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/analyze")
        .with_status(500)
        .create_async()
        .await;

    let config = OrchestratorConfig::new().with_vision(vision_config(server.url()));
    let orchestrator = OrchestratorBuilder::new().with_config(config).build().unwrap();

    let answers = orchestrator
        .answer_questions(
            Bytes::from_static(b"leaf-image"),
            &["Will it spread?".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(answers.len(), 1);
    assert!(answers[0].answer.contains("retry or consult"));
}
