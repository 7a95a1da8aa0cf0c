// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 导出模块
///
/// 把存储的文档导出为 Excel 工作簿、CSV 平表或 JSON 数组
pub mod csv_export;
pub mod excel;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::XlsxError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::document::StoredDocument;
use crate::domain::models::document_type::DocumentType;
pub use csv_export::CsvExporter;
pub use excel::ExcelExporter;

/// 导出错误
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Excel generation failed: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("CSV generation failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// 导出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

/// 导出结果
#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub count: usize,
    pub bytes: Vec<u8>,
}

/// 按格式导出一组同类型文档
pub fn export_documents(
    doc_type: DocumentType,
    format: ExportFormat,
    documents: &[StoredDocument],
    now: DateTime<Utc>,
) -> Result<ExportFile, ExportError> {
    let bytes = match format {
        ExportFormat::Xlsx => ExcelExporter::export(doc_type, documents)?,
        ExportFormat::Csv => CsvExporter::export(doc_type, documents)?,
        ExportFormat::Json => serde_json::to_vec_pretty(documents)?,
    };

    Ok(ExportFile {
        filename: export_filename(doc_type, format, now),
        content_type: format.content_type(),
        count: documents.len(),
        bytes,
    })
}

/// `{type}_export_{YYYYmmdd_HHMMSS}.{ext}`
pub fn export_filename(doc_type: DocumentType, format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "{}_export_{}.{}",
        doc_type.slug(),
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
