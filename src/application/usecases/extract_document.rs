// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};
use validator::Validate;

use super::UseCaseError;
use crate::application::dto::extract_request::ExtractRequestDto;
use crate::domain::models::document::{ExtractionResult, StoredDocument};
use crate::domain::models::document_type::DocumentType;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::services::extraction_service::{DocumentExtractor, ExtractionError};
use crate::domain::services::field_normalizer;
use crate::domain::services::gemini_service::GeminiError;
use crate::domain::services::image_validator::{validate_image, ValidatedImage};
use crate::infrastructure::metrics;

pub struct ExtractDocumentUseCase<R: DocumentRepository> {
    extractor: Arc<dyn DocumentExtractor>,
    repository: Arc<R>,
}

impl<R: DocumentRepository> ExtractDocumentUseCase<R> {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, repository: Arc<R>) -> Self {
        Self {
            extractor,
            repository,
        }
    }

    /// 执行一次提取
    ///
    /// 解析类型 → 校验图片 → 调用提取器 → 归一化 `header.uap` / `header.equipe`
    /// → 按需保存。
    ///
    /// # 错误
    ///
    /// 类型不受支持、图片无法解码、提取失败或保存失败时返回错误
    pub async fn execute(&self, dto: ExtractRequestDto) -> Result<ExtractionResult, UseCaseError> {
        if let Err(e) = dto.validate() {
            metrics::record_extraction_failure("validation");
            return Err(e.into());
        }

        let doc_type = DocumentType::resolve(&dto.document_type).inspect_err(|_| {
            metrics::record_extraction_failure("unsupported_document_type");
        })?;
        metrics::record_extraction_request(doc_type);

        let image = tokio::task::spawn_blocking(move || validate_image(dto.image))
            .await?
            .inspect_err(|_| metrics::record_extraction_failure("malformed_image"))?;

        let started = Instant::now();
        let outcome = self
            .extractor
            .extract(doc_type, &image)
            .await
            .inspect_err(|e| metrics::record_extraction_failure(failure_reason(e)))?;
        metrics::record_extraction_duration(doc_type, started.elapsed());

        let data = canonical_record(doc_type, outcome.data);
        info!(
            "Extracted {} document with model {}",
            doc_type,
            self.extractor.model_name()
        );

        let mut result = ExtractionResult::success(data, outcome.remark);
        if dto.persist {
            let metadata = self.metadata(dto.filename, &image);
            let document = StoredDocument::new(
                doc_type,
                result.data.clone().unwrap_or(Value::Null),
                result.remark.clone(),
                metadata,
            );
            let stored = self.repository.create(&document).await.inspect_err(|e| {
                warn!("Failed to store extracted {} document: {}", doc_type, e);
                metrics::record_extraction_failure("storage");
            })?;
            metrics::record_document_stored(doc_type);
            result.id = Some(stored.id);
        }

        Ok(result)
    }

    fn metadata(&self, filename: Option<String>, image: &ValidatedImage) -> Value {
        json!({
            "filename": filename,
            "processed_at": Utc::now().to_rfc3339(),
            "model": self.extractor.model_name(),
            "image": {
                "mime_type": image.mime_type,
                "width": image.width,
                "height": image.height,
            },
        })
    }
}

/// 写入规范类型名并归一化受控字段
pub fn canonical_record(doc_type: DocumentType, mut data: Value) -> Value {
    if let Some(obj) = data.as_object_mut() {
        obj.insert(
            "document_type".to_string(),
            Value::String(doc_type.as_str().to_string()),
        );
    }
    field_normalizer::normalize(&mut data);
    data
}

fn failure_reason(error: &ExtractionError) -> &'static str {
    match error {
        ExtractionError::EmptyResult(_) => "empty_result",
        ExtractionError::Model(GeminiError::MissingApiKey) => "missing_api_key",
        ExtractionError::Model(_) => "upstream",
    }
}
