// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// 手工录入文档请求
///
/// 文档类型取自 `metadata.document_type`，其次是 `data.document_type`
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateDocumentDto {
    pub metadata: Option<Value>,
    pub data: Value,
    #[validate(length(max = 2000))]
    pub remark: Option<String>,
}

impl CreateDocumentDto {
    /// 请求中声明的文档类型（未解析）
    pub fn declared_type(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("document_type"))
            .and_then(Value::as_str)
            .or_else(|| self.data.get("document_type").and_then(Value::as_str))
    }
}

/// 文档列表查询参数
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ListDocumentsQuery {
    #[serde(rename = "type")]
    pub document_type: String,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

/// 单个文档查询参数
#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentTypeQuery {
    #[serde(rename = "type")]
    pub document_type: String,
}
