// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    body_bytes, body_json, create_test_app, get_request, json_request, StubExtractor, TestApp,
};
use axum::http::{header, StatusCode};
use formrs::domain::models::document::StoredDocument;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

async fn app() -> TestApp {
    create_test_app(StubExtractor::returning(json!({}))).await
}

async fn create(app: &TestApp, payload: Value) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/documents/", &payload))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_create_document_normalizes_and_stores() {
    let app = app().await;

    let (status, body) = create(
        &app,
        json!({
            "metadata": {"document_type": "Défauts", "filename": "week29.jpg"},
            "data": {"header": {"uap": "U-045", "equipe": "Team 3"}, "recorded_defects": []},
            "remark": "entered by hand"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["document_type"], "Défauts");
    assert_eq!(body["data"]["document_type"], "Défauts");
    assert_eq!(body["data"]["header"]["uap"], "045");
    assert_eq!(body["data"]["header"]["equipe"], "III");
    assert_eq!(body["metadata"]["filename"], "week29.jpg");
    assert!(body["metadata"]["processed_at"].is_string());
    assert_eq!(body["remark"], "entered by hand");
}

#[tokio::test]
async fn test_create_document_takes_type_from_data() {
    let app = app().await;

    let (status, body) = create(
        &app,
        json!({"data": {"document_type": "kosu", "Date du document": "22/07/2025"}}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["document_type"], "Kosu");
}

#[tokio::test]
async fn test_create_document_rejects_missing_or_unknown_type() {
    let app = app().await;

    let (status, body) = create(&app, json!({"data": {"header": {}}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = create(&app, json!({"metadata": {"document_type": "facture"}, "data": {}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create(&app, json!({"metadata": {"document_type": "NPT"}, "data": [1]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_and_detail_are_scoped_by_type() {
    let app = app().await;

    let (_, first) = create(&app, json!({"data": {"document_type": "NPT", "n": 1}})).await;
    let (_, second) = create(&app, json!({"data": {"document_type": "NPT", "n": 2}})).await;
    create(&app, json!({"data": {"document_type": "Rebut"}})).await;

    let response = app
        .router
        .clone()
        .oneshot(get_request("/documents/?type=npt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed: Vec<StoredDocument> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id.to_string(), second["id"].as_str().unwrap());

    let response = app
        .router
        .clone()
        .oneshot(get_request("/documents/?type=NPT&limit=1"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let id = first["id"].as_str().unwrap();
    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/documents/{id}/?type=NPT")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["n"], 1);

    // Same id, other type
    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/documents/{id}/?type=Rebut")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .oneshot(get_request("/documents/?type=invoice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_xlsx_headers() {
    let app = app().await;
    for n in 0..3 {
        create(
            &app,
            json!({"data": {"document_type": "Rebut", "header": {"uap": "1"}, "items": [{"reference": format!("R{n}"), "quantity": n}]}}),
        )
        .await;
    }

    let response = app
        .router
        .oneshot(get_request("/documents/export/?type=rebut"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(headers["x-export-count"], "3");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"rebut_export_"));
    assert!(disposition.ends_with(".xlsx\""));

    let bytes = body_bytes(response).await;
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_export_csv_flattens_items() {
    let app = app().await;
    create(
        &app,
        json!({"data": {"document_type": "Rebut", "header": {"ligne": "L2"}, "items": [{"reference": "A"}, {"reference": "B"}]}}),
    )
    .await;

    let response = app
        .router
        .oneshot(get_request("/documents/export/?type=rebut&format=csv"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    assert_eq!(headers["x-export-count"], "1");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.ends_with(".csv\""));

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Document ID,Date,Ligne,OF Number,Item Index,Reference"));
    assert!(lines[2].contains(",L2,,1,B,"));
}

#[tokio::test]
async fn test_bulk_export_csv() {
    let app = app().await;
    let (_, kept) = create(&app, json!({"data": {"document_type": "Kosu", "Nom Ligne": "A41S"}})).await;

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/documents/export/bulk/",
            &json!({"type": "Kosu", "format": "csv", "ids": [kept["id"]]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with(kept["id"].as_str().unwrap()));
    assert!(lines[1].contains("A41S"));
}

#[tokio::test]
async fn test_bulk_export_json_ignores_unknown_ids() {
    let app = app().await;
    let (_, kept) = create(&app, json!({"data": {"document_type": "Kosu", "Equipe": "I"}})).await;
    create(&app, json!({"data": {"document_type": "Kosu"}})).await;

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/documents/export/bulk/",
            &json!({
                "type": "Kosu",
                "format": "json",
                "ids": [kept["id"], Uuid::new_v4()]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-export-count"], "1");
    let exported: Vec<StoredDocument> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].id.to_string(), kept["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_bulk_export_requires_ids() {
    let app = app().await;

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/documents/export/bulk/",
            &json!({"type": "Kosu", "ids": []}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
