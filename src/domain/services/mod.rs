// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 字段归一化（field_normalizer）：`header.uap` / `header.equipe` 的确定性清理
/// - 日期归一化（date_normalizer）：日期字段统一为 DD/MM/YYYY
/// - 后处理（post_processing）：按文档类型整理模型输出
/// - 提示词（prompts）：各类表单的提取提示词
/// - 图片校验（image_validator）：只接受可解码的 JPEG / PNG
/// - Gemini 服务（gemini_service）：视觉模型调用
/// - 提取服务（extraction_service）：置信度重试和各类型提取流程
pub mod date_normalizer;
pub mod extraction_service;
pub mod field_normalizer;
pub mod gemini_service;
pub mod image_validator;
pub mod post_processing;
pub mod prompts;
