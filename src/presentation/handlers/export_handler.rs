// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use axum::{
    extract::Query,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::application::dto::export_request::{BulkExportDto, ExportQuery};
use crate::application::usecases::export_documents::ExportDocumentsUseCase;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::infrastructure::export::ExportFile;
use crate::presentation::errors::ApiError;

static EXPORT_COUNT: HeaderName = HeaderName::from_static("x-export-count");

/// 导出某类型的全部文档
pub async fn export_documents<R: DocumentRepository + 'static>(
    Extension(repo): Extension<Arc<R>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let use_case = ExportDocumentsUseCase::new(repo);
    Ok(attachment(use_case.export_all(query).await?))
}

/// 导出指定ID的文档
pub async fn bulk_export<R: DocumentRepository + 'static>(
    Extension(repo): Extension<Arc<R>>,
    Json(payload): Json<BulkExportDto>,
) -> Result<Response, ApiError> {
    let use_case = ExportDocumentsUseCase::new(repo);
    Ok(attachment(use_case.export_selected(payload).await?))
}

fn attachment(file: ExportFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
            (EXPORT_COUNT.clone(), HeaderValue::from(file.count)),
        ],
        file.bytes,
    )
        .into_response()
}
