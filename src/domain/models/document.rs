// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::document_type::DocumentType;

/// 已存储的文档
///
/// 一次提取（或手工录入）的结果。`data` 是模型返回的松散 JSON，
/// 至少包含 `header` 对象和若干列表段落。只插入，不更新。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredDocument {
    /// 文档唯一标识符
    pub id: Uuid,
    /// 规范文档类型
    pub document_type: DocumentType,
    /// 归一化后的文档记录
    pub data: Value,
    /// 提取备注
    pub remark: Option<String>,
    /// 元数据（文件名、处理时间等）
    pub metadata: Value,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl StoredDocument {
    /// 创建一个新的文档，生成ID和时间戳
    ///
    /// `metadata` 不是对象时替换为空对象，并始终写入 `document_type`
    pub fn new(
        document_type: DocumentType,
        data: Value,
        remark: Option<String>,
        metadata: Value,
    ) -> Self {
        let mut metadata = match metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        metadata.insert(
            "document_type".to_string(),
            Value::String(document_type.as_str().to_string()),
        );

        Self {
            id: Uuid::new_v4(),
            document_type,
            data,
            remark,
            metadata: Value::Object(metadata),
            created_at: Utc::now(),
        }
    }
}

/// 提取请求的状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Success,
    Error,
}

/// 返回给调用方的提取结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub status: ExtractionStatus,
    pub data: Option<Value>,
    pub remark: Option<String>,
    /// 持久化后的文档ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl ExtractionResult {
    pub fn success(data: Value, remark: Option<String>) -> Self {
        Self {
            status: ExtractionStatus::Success,
            data: Some(data),
            remark,
            id: None,
        }
    }

    pub fn error(remark: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Error,
            data: None,
            remark: Some(remark.into()),
            id: None,
        }
    }
}
