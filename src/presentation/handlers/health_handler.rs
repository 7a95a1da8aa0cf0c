// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::domain::services::extraction_service::DocumentExtractor;

/// 健康检查端点
///
/// # 返回值
///
/// `{"status": "ok", "model": <模型名称>}`
pub async fn health_check(
    Extension(extractor): Extension<Arc<dyn DocumentExtractor>>,
) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": extractor.model_name(),
    }))
}
