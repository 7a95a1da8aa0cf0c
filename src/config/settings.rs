// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含服务器、数据库、Gemini 模型、提取流程和上传限制等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Gemini 视觉模型配置
    pub gemini: GeminiSettings,
    /// 提取流程配置
    pub extraction: ExtractionSettings,
    /// 上传配置
    pub upload: UploadSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 是否记录 SQL 语句
    pub log_queries: Option<bool>,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// Gemini 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// API 密钥，未配置时提取请求返回服务器错误
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// API 基础URL
    pub api_base_url: String,
    /// 单次调用超时时间（秒）
    pub timeout_secs: u64,
    /// 传输错误的最大重试次数
    pub max_retries: u32,
}

/// 提取流程配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    /// 置信度达到该值后停止重试 (0-100)
    pub confidence_threshold: f64,
    /// 主提取最多调用模型的次数
    pub max_attempts: u32,
}

/// 上传配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// 请求体最大字节数
    pub max_bytes: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和 `FORMRS__` 前缀的环境变量。
    /// 旧部署使用的 `GOOGLE_API_KEY` / `GEMINI_API_KEY` / `GEMINI_MODEL` 仍然生效。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let legacy_api_key = std::env::var("GOOGLE_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok();
        let legacy_model = std::env::var("GEMINI_MODEL").ok();

        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            // Default DB settings
            .set_default("database.url", "sqlite://formrs.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default Gemini settings
            .set_default("gemini.model", "gemini-2.5-pro")?
            .set_default(
                "gemini.api_base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.timeout_secs", 120)?
            .set_default("gemini.max_retries", 2)?
            // Default extraction settings
            .set_default("extraction.confidence_threshold", 80.0)?
            .set_default("extraction.max_attempts", 3)?
            // 100MB, same ceiling as the upload proxy
            .set_default("upload.max_bytes", 100 * 1024 * 1024)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("FORMRS").separator("__"))
            .set_override_option("gemini.api_key", legacy_api_key)?
            .set_override_option("gemini.model", legacy_model)?;

        builder.build()?.try_deserialize()
    }
}
