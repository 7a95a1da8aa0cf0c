// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::settings::ExtractionSettings;
use crate::domain::models::document_type::DocumentType;
use crate::domain::services::date_normalizer::normalize_dates;
use crate::domain::services::gemini_service::{parse_model_json, GeminiError, VisionModel};
use crate::domain::services::image_validator::ValidatedImage;
use crate::domain::services::post_processing::{self, is_blank};
use crate::domain::services::prompts::{self, CONFIDENCE_SUFFIX};

/// 模型未给出置信度时使用的默认值
const DEFAULT_CONFIDENCE: f64 = 50.0;

const DEFAUTS_HEADER_KEYS: [&str; 8] = [
    "uap",
    "ligne",
    "n_poste",
    "operation",
    "code_famillier",
    "semaine",
    "annee",
    "mois",
];

/// 提取错误
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// 模型有应答，但没有可用的 JSON
    #[error("Primary extraction returned no usable data for {0}")]
    EmptyResult(DocumentType),
    #[error(transparent)]
    Model(#[from] GeminiError),
}

/// 一次提取的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    pub data: Value,
    pub remark: Option<String>,
}

/// 提取协作者：把一张表单图片变成文档记录
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// 后端模型名称
    fn model_name(&self) -> &str;

    async fn extract(
        &self,
        doc_type: DocumentType,
        image: &ValidatedImage,
    ) -> Result<ExtractionOutcome, ExtractionError>;
}

/// 基于 Gemini 视觉模型的提取器
///
/// Rebut、NPT、Kosu 走置信度重试；Défauts 走主提取、核验、补漏、再核验四轮。
pub struct GeminiExtractor {
    model: Arc<dyn VisionModel>,
    confidence_threshold: f64,
    max_attempts: u32,
}

impl GeminiExtractor {
    pub fn new(model: Arc<dyn VisionModel>, settings: &ExtractionSettings) -> Self {
        Self {
            model,
            confidence_threshold: settings.confidence_threshold,
            max_attempts: settings.max_attempts.max(1),
        }
    }

    /// 带置信度的重试提取
    ///
    /// 每次调用的得分为 (模型置信度 + 完整度) / 2，完整度为非空顶层字段占比。
    /// 保留得分最高的结果并写入 `final_confidence`，得分达到阈值即停止。
    ///
    /// # 错误
    /// * 未配置 API 密钥时立即返回
    /// * 所有尝试都没有可用结果时：有调用错误则返回最后一个错误，否则返回 `EmptyResult`
    async fn extract_with_confidence_retry(
        &self,
        doc_type: DocumentType,
        image: &ValidatedImage,
    ) -> Result<Map<String, Value>, ExtractionError> {
        let prompt = format!("{}{}", prompts::primary_prompt(doc_type), CONFIDENCE_SUFFIX);
        let mut best: Option<(f64, Map<String, Value>)> = None;
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            let text = match self.model.generate(&prompt, &[image]).await {
                Ok(text) => text,
                Err(GeminiError::MissingApiKey) => return Err(GeminiError::MissingApiKey.into()),
                Err(e) => {
                    warn!(%doc_type, attempt, error = %e, "Extraction attempt failed");
                    last_error = Some(e);
                    continue;
                }
            };

            let Some(Value::Object(mut data)) = parse_model_json(&text) else {
                debug!(%doc_type, attempt, "Model output is not a JSON object");
                continue;
            };
            if data.is_empty() {
                continue;
            }

            let score = combined_confidence(&data);
            info!(%doc_type, attempt, confidence = score, "Extraction attempt scored");

            if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
                data.insert("final_confidence".to_string(), json!(score));
                best = Some((score, data));
            }
            if score >= self.confidence_threshold {
                break;
            }
        }

        match (best, last_error) {
            (Some((_, data)), _) => Ok(data),
            (None, Some(e)) => Err(e.into()),
            (None, None) => Err(ExtractionError::EmptyResult(doc_type)),
        }
    }

    async fn extract_standard(
        &self,
        doc_type: DocumentType,
        image: &ValidatedImage,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let mut data = self.extract_with_confidence_retry(doc_type, image).await?;
        data.insert("document_type".to_string(), json!(doc_type.as_str()));

        let mut data = Value::Object(data);
        match doc_type {
            DocumentType::Rebut => {
                post_processing::deduplicate_rebut_items(&mut data);
                post_processing::normalize_rebut_numeric_fields(&mut data);
            }
            DocumentType::Kosu => post_processing::post_process_kosu(&mut data),
            DocumentType::Npt | DocumentType::Defauts => {}
        }
        normalize_dates(&mut data, doc_type);

        Ok(ExtractionOutcome {
            data,
            remark: Some(format!("{doc_type} extraction complete")),
        })
    }

    async fn extract_defauts(&self, image: &ValidatedImage) -> Result<ExtractionOutcome, ExtractionError> {
        let doc_type = DocumentType::Defauts;
        let text = self
            .model
            .generate(prompts::DEFAUTS_PRIMARY_PROMPT, &[image])
            .await?;
        let Some(Value::Object(mut root)) = parse_model_json(&text) else {
            return Err(ExtractionError::EmptyResult(doc_type));
        };

        root.insert("document_type".to_string(), json!(doc_type.as_str()));
        root.entry("entry_header").or_insert_with(|| {
            Value::Object(
                DEFAUTS_HEADER_KEYS
                    .iter()
                    .map(|k| (k.to_string(), Value::Null))
                    .collect(),
            )
        });
        root.entry("recorded_defects")
            .or_insert_with(|| Value::Array(Vec::new()));

        let mut data = Value::Object(root);
        self.verify_defauts_marks(&mut data, image).await;
        self.recover_defauts_marks(&mut data, image).await;
        self.verify_defauts_marks(&mut data, image).await;

        let marks = post_processing::finalize_defauts(&mut data);
        info!(marks, "Défauts marks after normalization");

        Ok(ExtractionOutcome {
            data,
            remark: Some(format!("{doc_type} extraction complete: {marks} marks (refined)")),
        })
    }

    /// 让模型逐条确认缺陷标记；失败时记录日志并跳过
    async fn verify_defauts_marks(&self, data: &mut Value, image: &ValidatedImage) {
        let Some(defects) = data["recorded_defects"].as_array().filter(|d| !d.is_empty()) else {
            return;
        };
        let brief: Vec<Value> = defects
            .iter()
            .enumerate()
            .map(|(index, r)| {
                json!({
                    "index": index,
                    "code": r.get("code"),
                    "day": r.get("day"),
                    "station": r.get("station"),
                    "raw_mark": r.get("raw_mark"),
                })
            })
            .collect();
        let prompt = format!("{}\nEntries:{}", prompts::DEFAUTS_VERIFY_PROMPT, Value::Array(brief));

        match self.model.generate(&prompt, &[image]).await {
            Ok(text) => match parse_model_json(&text) {
                Some(verdict) => post_processing::apply_defauts_verification(data, &verdict),
                None => warn!("Défauts verify pass returned no JSON, skipping"),
            },
            Err(e) => warn!(error = %e, "Défauts verify pass failed, skipping"),
        }
    }

    /// 让模型补充遗漏的缺陷标记；失败时记录日志并跳过
    async fn recover_defauts_marks(&self, data: &mut Value, image: &ValidatedImage) {
        let existing: Vec<Value> = data["recorded_defects"]
            .as_array()
            .map(|defects| {
                defects
                    .iter()
                    .map(|r| json!({"code": r.get("code"), "day": r.get("day"), "station": r.get("station")}))
                    .collect()
            })
            .unwrap_or_default();
        let prompt = format!(
            "{}\nExisting:{}",
            prompts::DEFAUTS_RECOVERY_PROMPT,
            Value::Array(existing)
        );

        match self.model.generate(&prompt, &[image]).await {
            Ok(text) => match parse_model_json(&text) {
                Some(recovered) => {
                    let added = post_processing::merge_recovered_defects(data, &recovered);
                    debug!(added, "Défauts recovery pass merged marks");
                }
                None => warn!("Défauts recovery pass returned no JSON, skipping"),
            },
            Err(e) => warn!(error = %e, "Défauts recovery pass failed, skipping"),
        }
    }
}

#[async_trait]
impl DocumentExtractor for GeminiExtractor {
    fn model_name(&self) -> &str {
        self.model.model_name()
    }

    async fn extract(
        &self,
        doc_type: DocumentType,
        image: &ValidatedImage,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        match doc_type {
            DocumentType::Defauts => self.extract_defauts(image).await,
            _ => self.extract_standard(doc_type, image).await,
        }
    }
}

/// (模型置信度 + 完整度) / 2
fn combined_confidence(data: &Map<String, Value>) -> f64 {
    let confidence = data
        .get("extraction_confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let filled = data
        .values()
        .filter(|v| !is_blank(Some(v)) && v.as_array().map_or(true, |a| !a.is_empty()))
        .count();
    let completeness = if data.is_empty() {
        0.0
    } else {
        filled as f64 / data.len() as f64 * 100.0
    };

    (confidence + completeness) / 2.0
}
