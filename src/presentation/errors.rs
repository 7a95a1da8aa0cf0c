// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::application::usecases::UseCaseError;
use crate::domain::models::document::ExtractionResult;
use crate::domain::services::extraction_service::ExtractionError;

/// 应用错误类型
///
/// 响应体统一为 `{"status": "error", "data": null, "remark": "..."}`
#[derive(Debug)]
pub enum ApiError {
    /// 用例层错误，按类型映射状态码
    UseCase(UseCaseError),
    /// 请求体不是 multipart/form-data
    UnsupportedMediaType(String),
    /// 其他带明确状态码的请求错误
    Request(StatusCode, String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UseCase(e) => use_case_status(e),
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Request(status, _) => *status,
        }
    }

    fn remark(&self) -> String {
        match self {
            ApiError::UseCase(e) => e.to_string(),
            ApiError::UnsupportedMediaType(msg) | ApiError::Request(_, msg) => msg.clone(),
        }
    }
}

fn use_case_status(error: &UseCaseError) -> StatusCode {
    match error {
        UseCaseError::DocumentType(_) | UseCaseError::Image(_) | UseCaseError::Validation(_) => {
            StatusCode::BAD_REQUEST
        }
        UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
        UseCaseError::Extraction(ExtractionError::EmptyResult(_)) => StatusCode::BAD_GATEWAY,
        UseCaseError::Extraction(_)
        | UseCaseError::Repository(_)
        | UseCaseError::Export(_)
        | UseCaseError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let remark = self.remark();

        if status.is_server_error() {
            error!("Request failed with {}: {}", status, remark);
        } else {
            warn!("Request rejected with {}: {}", status, remark);
        }

        (status, Json(ExtractionResult::error(remark))).into_response()
    }
}

impl From<UseCaseError> for ApiError {
    fn from(err: UseCaseError) -> Self {
        ApiError::UseCase(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Request(err.status(), err.body_text())
    }
}
