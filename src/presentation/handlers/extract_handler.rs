// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart},
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};

use crate::application::dto::extract_request::ExtractRequestDto;
use crate::application::usecases::extract_document::ExtractDocumentUseCase;
use crate::domain::models::document::ExtractionResult;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::services::extraction_service::DocumentExtractor;
use crate::presentation::errors::ApiError;

/// 上传表单图片并提取结构化数据
///
/// multipart 字段：`document_type`、`file`，可选 `persist`（true/1/yes 时保存结果）
///
/// # 错误
///
/// 请求体不是 multipart 时返回 415；类型或图片无效时返回 400
pub async fn extract<R: DocumentRepository + 'static>(
    Extension(extractor): Extension<Arc<dyn DocumentExtractor>>,
    Extension(repo): Extension<Arc<R>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        if is_multipart(&headers) {
            ApiError::Request(StatusCode::BAD_REQUEST, rejection.body_text())
        } else {
            ApiError::UnsupportedMediaType(
                "Expected a multipart/form-data body with document_type and file".to_string(),
            )
        }
    })?;

    let mut dto = ExtractRequestDto {
        document_type: String::new(),
        filename: None,
        image: Vec::new(),
        persist: false,
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("document_type") => dto.document_type = field.text().await?,
            Some("file") => {
                dto.filename = field.file_name().map(str::to_string);
                dto.image = field.bytes().await?.to_vec();
            }
            Some("persist") => dto.persist = parse_flag(&field.text().await?),
            _ => {}
        }
    }

    let use_case = ExtractDocumentUseCase::new(extractor, repo);
    let result = use_case.execute(dto).await?;
    Ok(Json(result))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/"))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
