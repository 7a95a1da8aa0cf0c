// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use tracing::warn;

use crate::domain::models::document_type::DocumentType;

/// 初始化指标系统
///
/// 安装 Prometheus 记录器并注册指标说明。返回的句柄供 `GET /metrics` 渲染文本；
/// 记录器已被安装（例如测试中重复初始化）时返回 None。
pub fn init_metrics() -> Option<PrometheusHandle> {
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            return None;
        }
    };

    describe_counter!(
        "extraction_requests_total",
        "Total number of extraction requests by document type"
    );
    describe_counter!(
        "extraction_failures_total",
        "Total number of failed extraction requests by reason"
    );
    describe_counter!("documents_stored_total", "Total number of documents persisted");
    describe_counter!(
        "documents_exported_total",
        "Total number of documents written to exports"
    );
    describe_histogram!(
        "extraction_duration_seconds",
        "Duration of model extraction in seconds"
    );

    Some(handle)
}

pub fn record_extraction_request(doc_type: DocumentType) {
    counter!("extraction_requests_total", "document_type" => doc_type.slug()).increment(1);
}

pub fn record_extraction_failure(reason: &'static str) {
    counter!("extraction_failures_total", "reason" => reason).increment(1);
}

pub fn record_extraction_duration(doc_type: DocumentType, elapsed: Duration) {
    histogram!("extraction_duration_seconds", "document_type" => doc_type.slug())
        .record(elapsed.as_secs_f64());
}

pub fn record_document_stored(doc_type: DocumentType) {
    counter!("documents_stored_total", "document_type" => doc_type.slug()).increment(1);
}

pub fn record_documents_exported(doc_type: DocumentType, count: usize) {
    counter!("documents_exported_total", "document_type" => doc_type.slug())
        .increment(count as u64);
}
