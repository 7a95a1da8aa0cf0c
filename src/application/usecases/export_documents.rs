// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use super::UseCaseError;
use crate::application::dto::export_request::{BulkExportDto, ExportQuery};
use crate::domain::models::document::StoredDocument;
use crate::domain::models::document_type::DocumentType;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::infrastructure::export::{export_documents, ExportFile, ExportFormat};
use crate::infrastructure::metrics;

pub struct ExportDocumentsUseCase<R: DocumentRepository> {
    repository: Arc<R>,
}

impl<R: DocumentRepository> ExportDocumentsUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// 导出某类型的全部文档
    pub async fn export_all(&self, query: ExportQuery) -> Result<ExportFile, UseCaseError> {
        let doc_type = DocumentType::resolve(&query.document_type)?;
        let documents = self.repository.find_all(doc_type, None).await?;
        self.render(doc_type, query.format, documents).await
    }

    /// 导出指定ID的文档，不存在的ID被忽略
    pub async fn export_selected(&self, dto: BulkExportDto) -> Result<ExportFile, UseCaseError> {
        dto.validate()?;
        let doc_type = DocumentType::resolve(&dto.document_type)?;
        let documents = self.repository.find_by_ids(doc_type, &dto.ids).await?;
        self.render(doc_type, dto.format, documents).await
    }

    async fn render(
        &self,
        doc_type: DocumentType,
        format: ExportFormat,
        documents: Vec<StoredDocument>,
    ) -> Result<ExportFile, UseCaseError> {
        // Workbook generation is CPU bound
        let file = tokio::task::spawn_blocking(move || {
            export_documents(doc_type, format, &documents, Utc::now())
        })
        .await??;

        metrics::record_documents_exported(doc_type, file.count);
        info!(
            "Exported {} {} document(s) as {}",
            file.count,
            doc_type,
            format.extension()
        );
        Ok(file)
    }
}
