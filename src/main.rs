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

use axum::extract::DefaultBodyLimit;
use axum::Extension;
use formrs::config::settings::Settings;
use formrs::domain::services::extraction_service::{DocumentExtractor, GeminiExtractor};
use formrs::domain::services::gemini_service::GeminiService;
use formrs::infrastructure::database::connection;
use formrs::infrastructure::metrics;
use formrs::infrastructure::repositories::document_repo_impl::DocumentRepositoryImpl;
use formrs::presentation::routes;
use formrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }
    telemetry::init_telemetry();
    info!("Starting formrs...");

    let metrics_handle = metrics::init_metrics();

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Connect to database
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    // 4. Extraction pipeline
    let gemini = GeminiService::new(&settings.gemini)?;
    if settings
        .gemini
        .api_key
        .as_deref()
        .map_or(true, |key| key.trim().is_empty())
    {
        warn!("No Gemini API key configured; extraction requests will fail");
    }
    let extractor: Arc<dyn DocumentExtractor> =
        Arc::new(GeminiExtractor::new(Arc::new(gemini), &settings.extraction));
    info!("Extractor ready with model {}", extractor.model_name());

    let document_repo = Arc::new(DocumentRepositoryImpl::new(db.clone()));

    let mut app = routes::routes()
        .layer(Extension(extractor))
        .layer(Extension(document_repo))
        .layer(DefaultBodyLimit::max(settings.upload.max_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());
    if let Some(handle) = metrics_handle {
        app = app.layer(Extension(handle));
    }

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
