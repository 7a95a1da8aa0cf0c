// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;

use super::ExportError;
use crate::domain::models::document::StoredDocument;
use crate::domain::models::document_type::DocumentType;

/// 一列的取值来源
#[derive(Clone, Copy)]
enum Column {
    Id,
    /// 行在列表段落中的下标（从 0 开始）
    Index,
    Header(&'static str),
    Root(&'static str),
    Nested(&'static str, &'static str),
    Row(&'static str),
}

/// 行的展开方式
#[derive(Clone, Copy)]
enum Rows {
    /// 每个文档一行
    PerDocument,
    /// 指定列表段落里的每个元素一行
    PerEntry(&'static str),
}

struct Layout {
    rows: Rows,
    columns: &'static [(&'static str, Column)],
}

fn layout(doc_type: DocumentType) -> Layout {
    match doc_type {
        DocumentType::Rebut => Layout {
            rows: Rows::PerEntry("items"),
            columns: &[
                ("Document ID", Column::Id),
                ("Date", Column::Header("date")),
                ("Ligne", Column::Header("ligne")),
                ("OF Number", Column::Header("of_number")),
                ("Item Index", Column::Index),
                ("Reference", Column::Row("reference")),
                ("Designation", Column::Row("designation")),
                ("Quantity", Column::Row("quantity")),
                ("Unit", Column::Row("unit")),
                ("Type", Column::Row("type")),
                ("Total Scrapped", Column::Row("total_scrapped")),
            ],
        },
        DocumentType::Npt => Layout {
            rows: Rows::PerEntry("downtime_events"),
            columns: &[
                ("Document ID", Column::Id),
                ("Date", Column::Header("date")),
                ("UAP", Column::Header("uap")),
                ("Equipe", Column::Header("equipe")),
                ("Event Index", Column::Index),
                ("Codes Ligne", Column::Row("codes_ligne")),
                ("Ref PF", Column::Row("ref_pf")),
                ("Designation", Column::Row("designation")),
                ("NPT Minutes", Column::Row("npt_minutes")),
                ("Heure Debut", Column::Row("heure_debut_d_arret")),
                ("Heure Fin", Column::Row("heure_fin_d_arret")),
                ("Cause NPT", Column::Row("cause_npt")),
            ],
        },
        DocumentType::Kosu => Layout {
            rows: Rows::PerDocument,
            columns: &[
                ("Document ID", Column::Id),
                ("Date", Column::Root("Date du document")),
                ("Equipe", Column::Root("Equipe")),
                ("Nom Ligne", Column::Root("Nom Ligne")),
                ("Code Ligne", Column::Root("Code ligne")),
                ("Numero OF", Column::Root("Numéro OF")),
                ("Ref PF", Column::Root("Ref PF")),
                ("Heures Depensees", Column::Nested("Total / Equipe", "Heures Dépensées")),
                ("Objectif Qte EQ", Column::Nested("Total / Equipe", "Objectif Qté / EQ")),
                ("Qte Realisee", Column::Nested("Total / Equipe", "Qté pièces Bonnes / EQ")),
            ],
        },
        DocumentType::Defauts => Layout {
            rows: Rows::PerEntry("recorded_defects"),
            columns: &[
                ("Document ID", Column::Id),
                ("UAP", Column::Nested("entry_header", "uap")),
                ("Ligne", Column::Nested("entry_header", "ligne")),
                ("Semaine", Column::Nested("entry_header", "semaine")),
                ("Defect Index", Column::Index),
                ("Code", Column::Row("code")),
                ("Day", Column::Row("day")),
                ("Station", Column::Row("station")),
                ("Raw Mark", Column::Row("raw_mark")),
                ("Count", Column::Row("count")),
            ],
        },
    }
}

/// CSV 导出器
///
/// 每种类型一张扁平表：Rebut、NPT、Défauts 按列表段落逐行展开并重复文档级字段，
/// Kosu 每个文档一行。缺失或 null 的值写为空串。
pub struct CsvExporter;

impl CsvExporter {
    pub fn export(doc_type: DocumentType, documents: &[StoredDocument]) -> Result<Vec<u8>, ExportError> {
        let layout = layout(doc_type);
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(layout.columns.iter().map(|(title, _)| *title))?;

        for document in documents {
            match layout.rows {
                Rows::PerDocument => {
                    writer.write_record(record(&layout, document, 0, &Value::Null))?;
                }
                Rows::PerEntry(section) => {
                    let entries = document
                        .data
                        .get(section)
                        .and_then(Value::as_array)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    for (index, entry) in entries.iter().enumerate() {
                        writer.write_record(record(&layout, document, index, entry))?;
                    }
                }
            }
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
    }
}

fn record(layout: &Layout, document: &StoredDocument, index: usize, entry: &Value) -> Vec<String> {
    let data = &document.data;
    layout
        .columns
        .iter()
        .map(|(_, column)| match *column {
            Column::Id => document.id.to_string(),
            Column::Index => index.to_string(),
            Column::Header(key) => cell(data.get("header").and_then(|h| h.get(key))),
            Column::Root(key) => cell(data.get(key)),
            Column::Nested(section, key) => cell(data.get(section).and_then(|s| s.get(key))),
            Column::Row(key) => cell(entry.get(key)),
        })
        .collect()
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
