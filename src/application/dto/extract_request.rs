// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use validator::Validate;

/// 提取请求
///
/// 由 multipart 表单字段组装：`document_type`、`file`、可选的 `persist`
#[derive(Debug, Validate)]
pub struct ExtractRequestDto {
    #[validate(length(min = 1, message = "document_type is required"))]
    pub document_type: String,
    /// 上传文件的原始文件名
    pub filename: Option<String>,
    #[validate(length(min = 1, message = "file is required"))]
    pub image: Vec<u8>,
    /// 是否在提取后保存文档
    pub persist: bool,
}
