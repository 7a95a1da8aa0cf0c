// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::infrastructure::export::ExportFormat;

/// 按类型导出全部文档的查询参数
#[derive(Debug, Deserialize, Serialize)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    pub document_type: String,
    #[serde(default)]
    pub format: ExportFormat,
}

/// 按ID批量导出请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct BulkExportDto {
    #[serde(rename = "type")]
    pub document_type: String,
    #[validate(length(min = 1, max = 500, message = "ids must not be empty"))]
    pub ids: Vec<Uuid>,
    #[serde(default)]
    pub format: ExportFormat,
}
