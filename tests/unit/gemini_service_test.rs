// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use formrs::config::settings::ExtractionSettings;
use formrs::domain::models::document_type::DocumentType;
use formrs::domain::services::extraction_service::{
    DocumentExtractor, ExtractionError, GeminiExtractor,
};
use formrs::domain::services::gemini_service::{GeminiError, GeminiService, VisionModel};
use formrs::domain::services::image_validator::ValidatedImage;
use formrs::utils::retry_policy::RetryPolicy;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";

fn image() -> ValidatedImage {
    ValidatedImage {
        mime_type: "image/png",
        width: 1,
        height: 1,
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]}
        }]
    })
}

fn service(server: &MockServer) -> GeminiService {
    GeminiService::new_with_config("test-key".to_string(), MODEL.to_string(), server.uri())
        .with_retry_policy(RetryPolicy {
            initial_backoff: Duration::from_millis(5),
            enable_jitter: false,
            ..RetryPolicy::with_max_retries(2)
        })
}

fn generate_path() -> String {
    format!("/models/{MODEL}:generateContent")
}

#[tokio::test]
async fn test_generate_sends_key_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{\"ok\": true}")))
        .expect(1)
        .mount(&server)
        .await;

    let img = image();
    let text = service(&server).generate("prompt", &[&img]).await.unwrap();
    assert_eq!(text, "{\"ok\": true}");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt");
    assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/png");
    assert_eq!(body["generationConfig"]["temperature"], 0.0);
}

#[tokio::test]
async fn test_generate_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("second")))
        .mount(&server)
        .await;

    let text = service(&server).generate("p", &[]).await.unwrap();
    assert_eq!(text, "second");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_generate_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let err = service(&server).generate("p", &[]).await.unwrap_err();
    match err {
        GeminiError::Api { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad request");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_without_candidates_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    assert_eq!(service(&server).generate("p", &[]).await.unwrap(), "");
}

/// 完整的 Rebut 提取：围栏 JSON、置信度、日期和数量整理
#[tokio::test]
async fn test_extractor_against_mock_api() {
    let server = MockServer::start().await;
    let reply = "```json\n{\"document_type\": \"rebut\", \"header\": {\"date\": \"22-07-2025\", \"uap\": \"UAP 7\", \"equipe\": \"2\"}, \"items\": [{\"reference\": \"A1\", \"quantity\": \"3\", \"total_scrapped\": \"3\"}], \"extraction_confidence\": 90}\n```";
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ExtractionSettings {
        confidence_threshold: 80.0,
        max_attempts: 3,
    };
    let extractor = GeminiExtractor::new(Arc::new(service(&server)), &settings);
    assert_eq!(extractor.model_name(), MODEL);

    let outcome = extractor.extract(DocumentType::Rebut, &image()).await.unwrap();
    assert_eq!(outcome.remark.as_deref(), Some("Rebut extraction complete"));
    assert_eq!(outcome.data["document_type"], "Rebut");
    assert_eq!(outcome.data["header"]["date"], "22/07/2025");
    assert_eq!(outcome.data["items"][0]["quantity"], 3);
    assert_eq!(outcome.data["items"][0]["total_scrapped"], 3);
    assert_eq!(outcome.data["final_confidence"], 95.0);
}

#[tokio::test]
async fn test_extractor_without_api_key() {
    let settings = formrs::config::settings::GeminiSettings {
        api_key: Some("   ".to_string()),
        model: MODEL.to_string(),
        api_base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 1,
        max_retries: 0,
    };
    let model = GeminiService::new(&settings).unwrap();
    let extractor = GeminiExtractor::new(
        Arc::new(model),
        &ExtractionSettings {
            confidence_threshold: 80.0,
            max_attempts: 3,
        },
    );

    let err = extractor.extract(DocumentType::Npt, &image()).await.unwrap_err();
    assert!(matches!(err, ExtractionError::Model(GeminiError::MissingApiKey)));
}
