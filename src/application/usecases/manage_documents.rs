// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::extract_document::canonical_record;
use super::UseCaseError;
use crate::application::dto::document_request::{CreateDocumentDto, ListDocumentsQuery};
use crate::domain::models::document::StoredDocument;
use crate::domain::models::document_type::DocumentType;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::infrastructure::metrics;

/// 文档存储用例：手工录入、列表和详情
pub struct ManageDocumentsUseCase<R: DocumentRepository> {
    repository: Arc<R>,
}

impl<R: DocumentRepository> ManageDocumentsUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// 保存一条手工录入的文档
    ///
    /// 类型缺失或不受支持时返回 `UnsupportedDocumentType`；
    /// 记录在插入前经过与提取结果相同的归一化
    pub async fn create(&self, dto: CreateDocumentDto) -> Result<StoredDocument, UseCaseError> {
        dto.validate()?;
        if !dto.data.is_object() {
            return Err(UseCaseError::Validation(
                "data must be a JSON object".to_string(),
            ));
        }

        let declared = dto.declared_type().unwrap_or_default().to_string();
        let doc_type = DocumentType::resolve(&declared)?;

        let mut metadata = match dto.metadata {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        metadata
            .entry("processed_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        let document = StoredDocument::new(
            doc_type,
            canonical_record(doc_type, dto.data),
            dto.remark,
            Value::Object(metadata),
        );
        let stored = self.repository.create(&document).await?;
        metrics::record_document_stored(doc_type);
        info!("Stored {} document {}", doc_type, stored.id);

        Ok(stored)
    }

    /// 列出某类型的文档，最新的在前
    pub async fn list(&self, query: ListDocumentsQuery) -> Result<Vec<StoredDocument>, UseCaseError> {
        query.validate()?;
        let doc_type = DocumentType::resolve(&query.document_type)?;
        Ok(self.repository.find_all(doc_type, query.limit).await?)
    }

    /// 按类型和ID读取文档
    pub async fn get(&self, document_type: &str, id: Uuid) -> Result<StoredDocument, UseCaseError> {
        let doc_type = DocumentType::resolve(document_type)?;
        self.repository
            .find_by_id(doc_type, id)
            .await?
            .ok_or(UseCaseError::NotFound(id))
    }
}

