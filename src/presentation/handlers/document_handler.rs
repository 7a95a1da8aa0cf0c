// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::application::dto::document_request::{
    CreateDocumentDto, DocumentTypeQuery, ListDocumentsQuery,
};
use crate::application::usecases::manage_documents::ManageDocumentsUseCase;
use crate::domain::models::document::StoredDocument;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::presentation::errors::ApiError;

/// 列出某类型的文档
pub async fn list_documents<R: DocumentRepository + 'static>(
    Extension(repo): Extension<Arc<R>>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    let use_case = ManageDocumentsUseCase::new(repo);
    Ok(Json(use_case.list(query).await?))
}

/// 手工录入文档
pub async fn create_document<R: DocumentRepository + 'static>(
    Extension(repo): Extension<Arc<R>>,
    Json(payload): Json<CreateDocumentDto>,
) -> Result<(StatusCode, Json<StoredDocument>), ApiError> {
    let use_case = ManageDocumentsUseCase::new(repo);
    let document = use_case.create(payload).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// 读取单个文档
pub async fn get_document<R: DocumentRepository + 'static>(
    Extension(repo): Extension<Arc<R>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DocumentTypeQuery>,
) -> Result<Json<StoredDocument>, ApiError> {
    let use_case = ManageDocumentsUseCase::new(repo);
    Ok(Json(use_case.get(&query.document_type, id).await?))
}
