// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::repositories::document_repo_impl::DocumentRepositoryImpl;
use crate::presentation::handlers::{
    document_handler, export_handler, extract_handler, health_handler, metrics_handler,
};
use axum::{
    routing::{get, post},
    Router,
};

/// 创建应用路由
///
/// 共享服务（提取器、文档仓库、指标句柄）由调用方以 `Extension` 层注入
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/", get(health_handler::health_check))
        .route("/health", get(health_handler::health_check))
        .route("/health/", get(health_handler::health_check))
        .route("/metrics", get(metrics_handler::metrics));

    let document_routes = Router::new()
        .route(
            "/extract/",
            post(extract_handler::extract::<DocumentRepositoryImpl>),
        )
        .route(
            "/documents/",
            get(document_handler::list_documents::<DocumentRepositoryImpl>)
                .post(document_handler::create_document::<DocumentRepositoryImpl>),
        )
        .route(
            "/documents/export/",
            get(export_handler::export_documents::<DocumentRepositoryImpl>),
        )
        .route(
            "/documents/export/bulk/",
            post(export_handler::bulk_export::<DocumentRepositoryImpl>),
        )
        .route(
            "/documents/{id}/",
            get(document_handler::get_document::<DocumentRepositoryImpl>),
        );

    Router::new().merge(public_routes).merge(document_routes)
}
