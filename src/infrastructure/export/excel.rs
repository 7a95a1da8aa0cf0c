// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use serde_json::{Map, Value};

use super::ExportError;
use crate::domain::models::document::StoredDocument;
use crate::domain::models::document_type::DocumentType;

// Palette
const HEADER_BG: u32 = 0x1E40AF;
const HEADER_TEXT: u32 = 0xFFFFFF;
const SUBHEADER_BG: u32 = 0x3B82F6;
const TABLE_HEADER_BG: u32 = 0xDBEAFE;
const TABLE_HEADER_TEXT: u32 = 0x1E40AF;
const ALT_ROW_BG: u32 = 0xF3F4F6;
const BORDER_COLOR: u32 = 0xD1D5DB;
const DATA_TEXT: u32 = 0x1F2937;

/// 合并单元格覆盖的最后一列（A..L）
const LAST_COL: u16 = 11;
const COLUMN_WIDTH: f64 = 15.0;
/// Excel 单元格字符串长度上限
const MAX_CELL_CHARS: usize = 32_767;

/// 这些键已经在“Document Information”里展示，或是内部字段
const SKIPPED_SECTIONS: &[&str] = &[
    "header",
    "entry_header",
    "document_type",
    "defects_log",
    "extraction_confidence",
    "final_confidence",
];

/// 信息区字段的来源
#[derive(Clone, Copy)]
enum Field {
    Header(&'static str),
    Root(&'static str),
    EntryHeader(&'static str),
}

struct SheetStyle {
    title: &'static str,
    title_bg: u32,
    title_text: u32,
    section_bg: u32,
    fields: &'static [(&'static str, Field)],
}

fn sheet_style(doc_type: DocumentType) -> SheetStyle {
    match doc_type {
        DocumentType::Rebut => SheetStyle {
            title: "Formulaire de déclaration Rebuts",
            title_bg: 0x4F46E5,
            title_text: HEADER_TEXT,
            section_bg: 0x10B981,
            fields: &[
                ("Date:", Field::Header("date")),
                ("UAP:", Field::Header("uap")),
                ("Ligne:", Field::Header("ligne")),
                ("OF Number:", Field::Header("of_number")),
                ("Mat:", Field::Header("mat_number")),
                ("Equipe:", Field::Header("equipe")),
                ("Visa:", Field::Header("visa")),
            ],
        },
        DocumentType::Npt => SheetStyle {
            title: "Non-Productive Time (NPT) Report",
            title_bg: 0x7C3AED,
            title_text: HEADER_TEXT,
            section_bg: 0x8B5CF6,
            fields: &[
                ("Date:", Field::Header("date")),
                ("UAP:", Field::Header("uap")),
                ("Equipe:", Field::Header("equipe")),
            ],
        },
        DocumentType::Kosu => SheetStyle {
            title: "Kosu Production Report",
            title_bg: 0xF59E0B,
            title_text: DATA_TEXT,
            section_bg: 0xFBBF24,
            fields: &[
                ("Date:", Field::Root("Date du document")),
                ("Equipe:", Field::Root("Equipe")),
                ("Nom Ligne:", Field::Root("Nom Ligne")),
                ("Code Ligne:", Field::Root("Code ligne")),
                ("Numero OF:", Field::Root("Numéro OF")),
                ("Ref PF:", Field::Root("Ref PF")),
                ("Semaine:", Field::Root("Semaine")),
            ],
        },
        DocumentType::Defauts => SheetStyle {
            title: "Formulaire Enregistrement Qualité (Défauts)",
            title_bg: HEADER_BG,
            title_text: HEADER_TEXT,
            section_bg: SUBHEADER_BG,
            fields: &[
                ("UAP:", Field::EntryHeader("uap")),
                ("Ligne:", Field::EntryHeader("ligne")),
                ("N° Poste:", Field::EntryHeader("n_poste")),
                ("Operation:", Field::EntryHeader("operation")),
                ("Semaine:", Field::EntryHeader("semaine")),
                ("Mois:", Field::EntryHeader("mois")),
                ("Année:", Field::EntryHeader("annee")),
            ],
        },
    }
}

/// 一个工作簿内复用的单元格格式
struct Formats {
    title: Format,
    subheader: Format,
    section: Format,
    label: Format,
    value: Format,
    table_header: Format,
    cell: Format,
    cell_alt: Format,
}

impl Formats {
    fn new(style: &SheetStyle) -> Self {
        let base = Format::new()
            .set_font_name("Arial")
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();
        let bordered = base
            .clone()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(BORDER_COLOR));
        let banner = base.clone().set_bold().set_align(FormatAlign::Center);

        Self {
            title: banner
                .clone()
                .set_font_size(16)
                .set_font_color(Color::RGB(style.title_text))
                .set_background_color(Color::RGB(style.title_bg)),
            subheader: banner
                .clone()
                .set_font_size(12)
                .set_font_color(Color::RGB(HEADER_TEXT))
                .set_background_color(Color::RGB(SUBHEADER_BG)),
            section: banner
                .set_font_size(12)
                .set_font_color(Color::RGB(HEADER_TEXT))
                .set_background_color(Color::RGB(style.section_bg)),
            label: bordered
                .clone()
                .set_bold()
                .set_font_size(10)
                .set_background_color(Color::RGB(ALT_ROW_BG)),
            value: bordered
                .clone()
                .set_font_size(10)
                .set_font_color(Color::RGB(DATA_TEXT)),
            table_header: bordered
                .clone()
                .set_bold()
                .set_font_size(10)
                .set_align(FormatAlign::Center)
                .set_font_color(Color::RGB(TABLE_HEADER_TEXT))
                .set_background_color(Color::RGB(TABLE_HEADER_BG)),
            cell: bordered
                .clone()
                .set_font_size(10)
                .set_font_color(Color::RGB(DATA_TEXT)),
            cell_alt: bordered
                .set_font_size(10)
                .set_font_color(Color::RGB(DATA_TEXT))
                .set_background_color(Color::RGB(ALT_ROW_BG)),
        }
    }
}

/// Excel 导出器
///
/// 每个文档一个工作表，名为 `{Type}_{n}`：标题行、Document Information 信息区，
/// 然后把记录中的每个列表段落写成带表头、边框和隔行底色的表格。
pub struct ExcelExporter;

impl ExcelExporter {
    /// 将同一类型的文档导出为 `.xlsx` 字节
    ///
    /// 没有文档时仍生成一个只有标题的工作表。
    pub fn export(doc_type: DocumentType, documents: &[StoredDocument]) -> Result<Vec<u8>, ExportError> {
        let style = sheet_style(doc_type);
        let formats = Formats::new(&style);
        let mut workbook = Workbook::new();

        if documents.is_empty() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(doc_type.as_str())?;
            write_title(worksheet, &style, &formats)?;
            worksheet.merge_range(2, 0, 2, LAST_COL, "No documents", &formats.value)?;
        }

        for (index, document) in documents.iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet_name(doc_type, index))?;
            write_document(worksheet, &style, &formats, document)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// 工作表名：`Rebut_1`、`NPT_2` ...
pub fn sheet_name(doc_type: DocumentType, index: usize) -> String {
    format!("{}_{}", doc_type.as_str(), index + 1)
}

/// 列标题：`_` 换成空格，每个单词首字母大写、其余小写
pub fn column_title(key: &str) -> String {
    let mut title = String::with_capacity(key.len());
    let mut previous_is_letter = false;
    for c in key.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            title.push(c);
            previous_is_letter = false;
        }
    }
    title
}

fn write_title(worksheet: &mut Worksheet, style: &SheetStyle, formats: &Formats) -> Result<(), XlsxError> {
    worksheet.merge_range(0, 0, 0, LAST_COL, style.title, &formats.title)?;
    worksheet.set_row_height(0, 30)?;
    for col in 0..=LAST_COL {
        worksheet.set_column_width(col, COLUMN_WIDTH)?;
    }
    Ok(())
}

fn write_document(
    worksheet: &mut Worksheet,
    style: &SheetStyle,
    formats: &Formats,
    document: &StoredDocument,
) -> Result<(), XlsxError> {
    write_title(worksheet, style, formats)?;

    let mut row: u32 = 2;
    worksheet.merge_range(row, 0, row, LAST_COL, "Document Information", &formats.subheader)?;
    row += 1;

    let mut info: Vec<(&str, String)> = vec![
        ("Filename:", display(document.metadata.get("filename"))),
        ("Document Type:", document.document_type.as_str().to_string()),
    ];
    info.extend(
        style
            .fields
            .iter()
            .map(|(label, field)| (*label, display(lookup(&document.data, *field)))),
    );
    info.push((
        "Processed:",
        document
            .metadata
            .get("processed_at")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| document.created_at.to_rfc3339()),
    ));

    for pair in info.chunks(2) {
        let (label, value) = &pair[0];
        worksheet.write_string_with_format(row, 0, *label, &formats.label)?;
        worksheet.merge_range(row, 1, row, 4, value, &formats.value)?;
        if let Some((label, value)) = pair.get(1) {
            worksheet.write_string_with_format(row, 5, *label, &formats.label)?;
            worksheet.merge_range(row, 6, row, LAST_COL, value, &formats.value)?;
        }
        row += 1;
    }
    row += 1;

    if let Value::Object(sections) = &document.data {
        for (key, section) in sections {
            if SKIPPED_SECTIONS.contains(&key.as_str()) {
                continue;
            }
            row = match section {
                Value::Array(rows) if !rows.is_empty() => {
                    write_list_section(worksheet, formats, row, key, rows)?
                }
                Value::Object(fields) if !fields.is_empty() => {
                    write_object_section(worksheet, formats, row, key, fields)?
                }
                _ => row,
            };
        }
    }

    Ok(())
}

fn write_list_section(
    worksheet: &mut Worksheet,
    formats: &Formats,
    mut row: u32,
    key: &str,
    rows: &[Value],
) -> Result<u32, XlsxError> {
    worksheet.merge_range(row, 0, row, LAST_COL, &column_title(key), &formats.section)?;
    row += 1;

    let Some(Value::Object(first)) = rows.first() else {
        // 标量列表，每项一行
        for item in rows {
            worksheet.merge_range(row, 0, row, LAST_COL, &display(Some(item)), &formats.cell)?;
            row += 1;
        }
        return Ok(row + 1);
    };

    let columns: Vec<&String> = first.keys().collect();
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(row, col as u16, column_title(name), &formats.table_header)?;
    }
    row += 1;

    for (index, item) in rows.iter().enumerate() {
        let format = if index % 2 == 1 { &formats.cell_alt } else { &formats.cell };
        for (col, name) in columns.iter().enumerate() {
            write_cell(worksheet, row, col as u16, item.get(name.as_str()), format)?;
        }
        row += 1;
    }

    Ok(row + 1)
}

fn write_object_section(
    worksheet: &mut Worksheet,
    formats: &Formats,
    mut row: u32,
    key: &str,
    fields: &Map<String, Value>,
) -> Result<u32, XlsxError> {
    worksheet.merge_range(row, 0, row, LAST_COL, &column_title(key), &formats.section)?;
    row += 1;

    for (name, value) in fields {
        worksheet.write_string_with_format(row, 0, column_title(name), &formats.label)?;
        worksheet.merge_range(row, 1, row, LAST_COL, &display(Some(value)), &formats.value)?;
        row += 1;
    }

    Ok(row + 1)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<&Value>,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        None | Some(Value::Null) => worksheet.write_blank(row, col, format)?,
        Some(Value::Bool(b)) => worksheet.write_boolean_with_format(row, col, *b, format)?,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => worksheet.write_number_with_format(row, col, f, format)?,
            None => worksheet.write_string_with_format(row, col, n.to_string(), format)?,
        },
        Some(other) => worksheet.write_string_with_format(row, col, display(Some(other)), format)?,
    };
    Ok(())
}

fn lookup(data: &Value, field: Field) -> Option<&Value> {
    match field {
        Field::Header(key) => data.get("header").and_then(|h| h.get(key)),
        Field::EntryHeader(key) => data.get("entry_header").and_then(|h| h.get(key)),
        Field::Root(key) => data.get(key),
    }
}

/// 单元格文本；缺失或 null 显示为 N/A
fn display(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) if s.is_empty() => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_CHARS {
        text.chars().take(MAX_CELL_CHARS).collect()
    } else {
        text
    }
}
