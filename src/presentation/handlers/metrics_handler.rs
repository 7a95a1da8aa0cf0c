// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::debug;

/// Prometheus 文本格式的指标
///
/// 记录器未安装时返回 503
pub async fn metrics(handle: Option<Extension<PrometheusHandle>>) -> Response {
    let Some(Extension(handle)) = handle else {
        return (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response();
    };

    let body = handle.render();
    debug!("Rendered {} bytes of metrics", body.len());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
