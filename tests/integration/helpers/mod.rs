// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::{Extension, Router};
use formrs::config::settings::DatabaseSettings;
use formrs::domain::models::document_type::DocumentType;
use formrs::domain::services::extraction_service::{
    DocumentExtractor, ExtractionError, ExtractionOutcome,
};
use formrs::domain::services::image_validator::ValidatedImage;
use formrs::infrastructure::database::connection;
use formrs::infrastructure::repositories::document_repo_impl::DocumentRepositoryImpl;
use formrs::presentation::routes;
use serde_json::Value;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "formrs-test-boundary";

/// 返回固定记录的提取器，记录每次调用的类型
pub struct StubExtractor {
    data: Option<Value>,
    pub calls: Mutex<Vec<DocumentType>>,
}

impl StubExtractor {
    pub fn returning(data: Value) -> Arc<Self> {
        Arc::new(Self {
            data: Some(data),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// 模型没有给出任何可用结果
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            data: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<DocumentType> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentExtractor for StubExtractor {
    fn model_name(&self) -> &str {
        "stub-vision"
    }

    async fn extract(
        &self,
        doc_type: DocumentType,
        _image: &ValidatedImage,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        self.calls.lock().unwrap().push(doc_type);
        match &self.data {
            Some(data) => Ok(ExtractionOutcome {
                data: data.clone(),
                remark: Some(format!("{doc_type} extraction complete")),
            }),
            None => Err(ExtractionError::EmptyResult(doc_type)),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<DocumentRepositoryImpl>,
}

pub async fn create_repository() -> Arc<DocumentRepositoryImpl> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: None,
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
        log_queries: None,
    };
    let db = connection::connect_and_migrate(&settings)
        .await
        .expect("in-memory database should migrate");
    Arc::new(DocumentRepositoryImpl::new(Arc::new(db)))
}

/// 构建带内存数据库和桩提取器的路由
pub async fn create_test_app(extractor: Arc<StubExtractor>) -> TestApp {
    let repo = create_repository().await;
    let extractor: Arc<dyn DocumentExtractor> = extractor;
    let router = routes::routes()
        .layer(Extension(extractor))
        .layer(Extension(repo.clone()));

    TestApp { router, repo }
}

/// 一张 4x4 的 PNG
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 200, 200]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// 组装 multipart/form-data 请求体
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn extract_request(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, file)))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
