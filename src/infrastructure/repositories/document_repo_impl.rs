// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::document::StoredDocument;
use crate::domain::models::document_type::DocumentType;
use crate::domain::repositories::document_repository::{DocumentRepository, RepositoryError};
use crate::infrastructure::database::entities::document;
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 文档仓库实现
#[derive(Clone)]
pub struct DocumentRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl DocumentRepositoryImpl {
    /// 创建新的文档仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentRepository for DocumentRepositoryImpl {
    async fn create(&self, doc: &StoredDocument) -> Result<StoredDocument, RepositoryError> {
        let model = document::ActiveModel {
            id: Set(doc.id),
            document_type: Set(doc.document_type.as_str().to_string()),
            data: Set(doc.data.clone()),
            remark: Set(doc.remark.clone()),
            metadata: Set(doc.metadata.clone()),
            created_at: Set(doc.created_at.into()),
        };

        document::Entity::insert(model)
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(doc.clone())
    }

    async fn find_by_id(
        &self,
        document_type: DocumentType,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, RepositoryError> {
        let model = document::Entity::find_by_id(id)
            .filter(document::Column::DocumentType.eq(document_type.as_str()))
            .one(self.db.as_ref())
            .await?;

        model.map(StoredDocument::try_from).transpose()
    }

    async fn find_by_ids(
        &self,
        document_type: DocumentType,
        ids: &[Uuid],
    ) -> Result<Vec<StoredDocument>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = document::Entity::find()
            .filter(document::Column::DocumentType.eq(document_type.as_str()))
            .filter(document::Column::Id.is_in(ids.iter().copied()))
            .order_by_desc(document::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(StoredDocument::try_from).collect()
    }

    async fn find_all(
        &self,
        document_type: DocumentType,
        limit: Option<u64>,
    ) -> Result<Vec<StoredDocument>, RepositoryError> {
        let mut query = document::Entity::find()
            .filter(document::Column::DocumentType.eq(document_type.as_str()))
            .order_by_desc(document::Column::CreatedAt);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let models = query.all(self.db.as_ref()).await?;

        models.into_iter().map(StoredDocument::try_from).collect()
    }
}

impl TryFrom<document::Model> for StoredDocument {
    type Error = RepositoryError;

    fn try_from(model: document::Model) -> Result<Self, Self::Error> {
        let document_type = DocumentType::resolve(&model.document_type)
            .map_err(|e| RepositoryError::Corrupted(format!("document {}: {}", model.id, e)))?;

        Ok(Self {
            id: model.id,
            document_type,
            data: model.data,
            remark: model.remark,
            metadata: model.metadata,
            created_at: model.created_at.into(),
        })
    }
}
