// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::document::StoredDocument;
use crate::domain::models::document_type::DocumentType;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 存储的数据无法还原为领域模型
    #[error("Corrupted record: {0}")]
    Corrupted(String),
}

/// 文档仓库特质
///
/// 只追加：没有更新和删除。所有查询都限定在一个规范文档类型内。
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// 保存新文档
    async fn create(&self, document: &StoredDocument) -> Result<StoredDocument, RepositoryError>;
    /// 根据类型和ID查找文档
    async fn find_by_id(
        &self,
        document_type: DocumentType,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, RepositoryError>;
    /// 根据一组ID查找文档，忽略不存在的ID，按创建时间倒序
    async fn find_by_ids(
        &self,
        document_type: DocumentType,
        ids: &[Uuid],
    ) -> Result<Vec<StoredDocument>, RepositoryError>;
    /// 列出某类型的文档，按创建时间倒序
    async fn find_all(
        &self,
        document_type: DocumentType,
        limit: Option<u64>,
    ) -> Result<Vec<StoredDocument>, RepositoryError>;
}
