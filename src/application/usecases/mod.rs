// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用用例模块
///
/// 定义应用程序层的具体用例实现
/// 负责协调领域对象完成特定的业务操作
pub mod export_documents;
pub mod extract_document;
pub mod manage_documents;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::document_type::DocumentTypeError;
use crate::domain::repositories::document_repository::RepositoryError;
use crate::domain::services::extraction_service::ExtractionError;
use crate::domain::services::image_validator::ImageError;
use crate::infrastructure::export::ExportError;

/// 用例错误
#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error(transparent)]
    DocumentType(#[from] DocumentTypeError),
    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Document {0} not found")]
    NotFound(Uuid),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<validator::ValidationErrors> for UseCaseError {
    fn from(errors: validator::ValidationErrors) -> Self {
        UseCaseError::Validation(errors.to_string())
    }
}
