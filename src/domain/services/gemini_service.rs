// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::settings::GeminiSettings;
use crate::domain::services::image_validator::ValidatedImage;
use crate::utils::retry_policy::{is_retryable_status, is_retryable_transport, RetryPolicy};

static JSON_FENCE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)\s*```").ok());

/// Gemini 调用错误
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini API key not configured")]
    MissingApiKey,
    #[error("Failed to send request to Gemini API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gemini API returned error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("Invalid response format from Gemini API: {0}")]
    InvalidResponse(String),
}

/// 视觉模型：输入提示词和图片，输出文本
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// 模型名称，健康检查中返回
    fn model_name(&self) -> &str;

    /// 生成文本
    ///
    /// # 参数
    /// * `prompt` - 提示词
    /// * `images` - 已校验的图片，按顺序附加在提示词之后
    ///
    /// # 返回值
    /// * `Result<String, GeminiError>` - 第一个候选结果的全部文本（可能为空）
    async fn generate(&self, prompt: &str, images: &[&ValidatedImage]) -> Result<String, GeminiError>;
}

/// Gemini 服务 - 调用 Google Generative Language API
///
/// # 配置
///
/// 由 [`GeminiSettings`] 提供：
/// - `api_key` - API 密钥，未配置时每次调用都返回 [`GeminiError::MissingApiKey`]
/// - `model` - 模型名称（默认 gemini-2.5-pro）
/// - `api_base_url` - API 基础URL
/// - `timeout_secs` / `max_retries` - 单次超时和传输重试次数
pub struct GeminiService {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    retry_policy: RetryPolicy,
}

impl GeminiService {
    pub fn new(settings: &GeminiSettings) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::with_max_retries(settings.max_retries),
        })
    }

    pub fn new_with_config(api_key: String, model: String, api_base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: Some(api_key),
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn request_body(prompt: &str, images: &[&ValidatedImage]) -> Value {
        let mut parts = vec![json!({ "text": prompt })];
        parts.extend(images.iter().map(|image| {
            json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": STANDARD.encode(&image.bytes),
                }
            })
        }));

        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": { "temperature": 0.0 }
        })
    }

    async fn send_once(&self, api_key: &str, body: &Value) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}/models/{}:generateContent", self.api_base_url, self.model);
        self.client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
    }
}

#[async_trait]
impl VisionModel for GeminiService {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, images: &[&ValidatedImage]) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let body = Self::request_body(prompt, images);

        let mut retries = 0;
        let response = loop {
            match self.send_once(api_key, &body).await {
                Ok(response) if response.status().is_success() => break response,
                Ok(response) => {
                    let status = response.status();
                    if is_retryable_status(status) && self.retry_policy.should_retry(retries) {
                        retries += 1;
                        let backoff = self.retry_policy.calculate_backoff(retries);
                        warn!(%status, retries, ?backoff, "Gemini API busy, retrying");
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    let body = response.text().await.unwrap_or_default();
                    return Err(GeminiError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) => {
                    if is_retryable_transport(&e) && self.retry_policy.should_retry(retries) {
                        retries += 1;
                        let backoff = self.retry_policy.calculate_backoff(retries);
                        warn!(error = %e, retries, ?backoff, "Gemini request failed, retrying");
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        };

        let body: Value = response
            .json()
            .await
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;

        let Some(parts) = body["candidates"][0]["content"]["parts"].as_array() else {
            debug!(response = %body, "Gemini returned no candidate content");
            return Ok(String::new());
        };

        Ok(parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<Vec<_>>()
            .join(""))
    }
}

/// 解析模型输出中的 JSON
///
/// 接受裸 JSON 或 ```json 代码块（也接受不带语言标记的 ``` 代码块），无法解析时返回 None
pub fn parse_model_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let fenced = JSON_FENCE
        .as_ref()?
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())?;
    serde_json::from_str(fenced).ok()
}
