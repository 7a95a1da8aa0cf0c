// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    body_json, create_test_app, extract_request, json_request, png_bytes, StubExtractor,
};
use axum::http::StatusCode;
use formrs::domain::models::document_type::DocumentType;
use formrs::domain::repositories::document_repository::DocumentRepository;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

fn dirty_defauts_record() -> Value {
    json!({
        "document_type": "defauts",
        "header": {"uap": "UAP12", "equipe": "iv", "semaine": "S29"},
        "entry_header": {"uap": "UAP12"},
        "recorded_defects": [{"code": "D1", "day": "Lun", "station": "E1", "count": 2}]
    })
}

/// Defauts 与 Défauts 解析为同一类型，且 uap / equipe 被归一化
#[tokio::test]
async fn test_extract_alias_and_accented_type_are_equivalent() {
    let extractor = StubExtractor::returning(dirty_defauts_record());
    let app = create_test_app(extractor.clone()).await;
    let png = png_bytes();

    let mut bodies = Vec::new();
    for document_type in ["Defauts", "Défauts", "DEFAUTS"] {
        let response = app
            .router
            .clone()
            .oneshot(extract_request(
                &[("document_type", document_type)],
                Some(("scan.png", &png)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{document_type}");
        bodies.push(body_json(response).await);
    }

    assert_eq!(extractor.calls(), vec![DocumentType::Defauts; 3]);
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));

    let body = &bodies[0];
    assert_eq!(body["status"], "success");
    assert_eq!(body["remark"], "Défauts extraction complete");
    assert_eq!(body["data"]["document_type"], "Défauts");
    assert_eq!(body["data"]["header"]["uap"], "12");
    assert_eq!(body["data"]["header"]["equipe"], "IV");
    // Untouched fields
    assert_eq!(body["data"]["header"]["semaine"], "S29");
    assert_eq!(body["data"]["entry_header"]["uap"], "UAP12");
    assert!(body.get("id").is_none());
}

/// 无法识别的 uap / equipe 变为 null，请求仍然成功
#[tokio::test]
async fn test_extract_degrades_bad_header_fields_to_null() {
    let extractor = StubExtractor::returning(json!({
        "header": {"uap": "1234", "equipe": "XI", "date": "22/07/2025"},
        "items": [{"reference": "A1"}]
    }));
    let app = create_test_app(extractor).await;
    let png = png_bytes();

    let response = app
        .router
        .oneshot(extract_request(&[("document_type", "rebut")], Some(("r.png", &png))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["document_type"], "Rebut");
    assert_eq!(body["data"]["header"]["uap"], Value::Null);
    assert_eq!(body["data"]["header"]["equipe"], Value::Null);
    assert_eq!(body["data"]["header"]["date"], "22/07/2025");
    assert_eq!(body["data"]["items"], json!([{"reference": "A1"}]));
}

#[tokio::test]
async fn test_extract_persists_when_requested() {
    let app = create_test_app(StubExtractor::returning(json!({
        "header": {"uap": "7", "equipe": "2"},
        "downtime_events": []
    })))
    .await;
    let png = png_bytes();

    let response = app
        .router
        .oneshot(extract_request(
            &[("document_type", "npt"), ("persist", "true")],
            Some(("npt.png", &png)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let stored = app
        .repo
        .find_by_id(DocumentType::Npt, id)
        .await
        .unwrap()
        .expect("document should be stored");

    assert_eq!(stored.data["header"]["equipe"], "II");
    assert_eq!(stored.metadata["filename"], "npt.png");
    assert_eq!(stored.metadata["document_type"], "NPT");
    assert_eq!(stored.metadata["image"]["mime_type"], "image/png");
    assert_eq!(stored.remark.as_deref(), Some("NPT extraction complete"));
}

#[tokio::test]
async fn test_extract_rejects_unknown_type() {
    let extractor = StubExtractor::returning(json!({}));
    let app = create_test_app(extractor.clone()).await;
    let png = png_bytes();

    let response = app
        .router
        .oneshot(extract_request(&[("document_type", "invoice")], Some(("a.png", &png))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"], Value::Null);
    assert!(body["remark"].as_str().unwrap().contains("invoice"));
    assert!(extractor.calls().is_empty());
}

#[tokio::test]
async fn test_extract_rejects_malformed_image() {
    let extractor = StubExtractor::returning(json!({}));
    let app = create_test_app(extractor.clone()).await;

    for bytes in [b"not an image at all".to_vec(), {
        // PNG signature followed by garbage
        let mut truncated = png_bytes();
        truncated.truncate(20);
        truncated
    }] {
        let response = app
            .router
            .clone()
            .oneshot(extract_request(&[("document_type", "Kosu")], Some(("k.png", &bytes))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert!(extractor.calls().is_empty());
}

#[tokio::test]
async fn test_extract_requires_file_and_type() {
    let app = create_test_app(StubExtractor::returning(json!({}))).await;
    let png = png_bytes();

    let missing_file = app
        .router
        .clone()
        .oneshot(extract_request(&[("document_type", "Kosu")], None))
        .await
        .unwrap();
    assert_eq!(missing_file.status(), StatusCode::BAD_REQUEST);

    let missing_type = app
        .router
        .oneshot(extract_request(&[], Some(("k.png", &png))))
        .await
        .unwrap();
    assert_eq!(missing_type.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_extract_rejects_non_multipart_body() {
    let app = create_test_app(StubExtractor::returning(json!({}))).await;

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/extract/",
            &json!({"document_type": "Rebut"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(response).await["status"], "error");
}

#[tokio::test]
async fn test_extract_empty_model_result_is_bad_gateway() {
    let app = create_test_app(StubExtractor::empty()).await;
    let png = png_bytes();

    let response = app
        .router
        .oneshot(extract_request(&[("document_type", "Rebut")], Some(("r.png", &png))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["remark"].as_str().unwrap().contains("Rebut"));
}
