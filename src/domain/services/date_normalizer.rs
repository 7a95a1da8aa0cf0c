// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::domain::models::document_type::DocumentType;

/// 捕获组的排列顺序
#[derive(Debug, Clone, Copy)]
enum DateOrder {
    DayMonthYear,
    YearMonthDay,
    DayMonthShortYear,
    DayMonthName,
}

const DATE_PATTERNS: &[(&str, DateOrder)] = &[
    // 22/07/2025, 22-07-2025
    (r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$", DateOrder::DayMonthYear),
    (r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$", DateOrder::DayMonthYear),
    (r"^(\d{1,2})\s+(\d{1,2})\s+(\d{4})$", DateOrder::DayMonthYear),
    // 2025/07/22, 2025-07-22, 2025.07.22
    (r"^(\d{4})[/-](\d{1,2})[/-](\d{1,2})$", DateOrder::YearMonthDay),
    (r"^(\d{4})\.(\d{1,2})\.(\d{1,2})$", DateOrder::YearMonthDay),
    // 22/07/25
    (r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2})$", DateOrder::DayMonthShortYear),
    (r"^(\d{1,2})\.(\d{1,2})\.(\d{2})$", DateOrder::DayMonthShortYear),
    // 22072025
    (r"^(\d{2})(\d{2})(\d{4})$", DateOrder::DayMonthYear),
    // 22 juillet 2025
    (
        r"(?i)^(\d{1,2})\s+(janvier|février|fevrier|mars|avril|mai|juin|juillet|août|aout|septembre|octobre|novembre|décembre|decembre)\s+(\d{4})$",
        DateOrder::DayMonthName,
    ),
];

static DATE_REGEXES: Lazy<Vec<(Regex, DateOrder)>> = Lazy::new(|| {
    DATE_PATTERNS
        .iter()
        .filter_map(|(pattern, order)| Regex::new(pattern).ok().map(|re| (re, *order)))
        .collect()
});

const FRENCH_MONTHS: &[(&str, u32)] = &[
    ("janvier", 1),
    ("fevrier", 2),
    ("mars", 3),
    ("avril", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("aout", 8),
    ("septembre", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("decembre", 12),
];

/// 将日期值规范为 `DD/MM/YYYY`
///
/// 支持日/月/年（`/ - .` 或空格分隔）、年/月/日、两位年份（小于 50 视为 20xx）、
/// `DDMMYYYY` 以及法语月份名。日历上不存在的日期被拒绝。
/// 五位以内的纯数字无法判断含义，原样返回。
///
/// # 返回值
///
/// 无法识别时返回 None
pub fn normalize_date_value(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }

    for (re, order) in DATE_REGEXES.iter() {
        let Some(caps) = re.captures(&raw) else {
            continue;
        };
        if let Some(date) = date_from_captures(&caps, *order) {
            return Some(date.format("%d/%m/%Y").to_string());
        }
        debug!(value = %raw, "Rejected calendar date");
    }

    if raw.len() <= 5 && raw.chars().all(|c| c.is_ascii_digit()) {
        return Some(raw);
    }
    None
}

fn date_from_captures(caps: &regex::Captures<'_>, order: DateOrder) -> Option<NaiveDate> {
    let group = |i: usize| caps.get(i).map(|m| m.as_str());
    let number = |i: usize| group(i).and_then(|s| s.parse::<u32>().ok());

    let (day, month, year) = match order {
        DateOrder::DayMonthYear => (number(1)?, number(2)?, number(3)? as i32),
        DateOrder::YearMonthDay => (number(3)?, number(2)?, number(1)? as i32),
        DateOrder::DayMonthShortYear => {
            let short = number(3)? as i32;
            let year = if short < 50 { 2000 + short } else { 1900 + short };
            (number(1)?, number(2)?, year)
        }
        DateOrder::DayMonthName => {
            let name = deunicode::deunicode(group(2)?).to_lowercase();
            let month = FRENCH_MONTHS
                .iter()
                .find(|(m, _)| *m == name)
                .map(|(_, n)| *n)?;
            (number(1)?, month, number(3)? as i32)
        }
    };

    if !(1900..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 规范化记录中该文档类型的日期字段
///
/// Rebut 和 NPT 使用 `header.date`，Kosu 使用根级 `Date du document`。
/// 无法识别的值保持原样。
pub fn normalize_dates(record: &mut Value, doc_type: DocumentType) {
    let slot = match doc_type {
        DocumentType::Rebut | DocumentType::Npt => record
            .get_mut("header")
            .and_then(|h| h.as_object_mut())
            .and_then(|h| h.get_mut("date")),
        DocumentType::Kosu => record
            .as_object_mut()
            .and_then(|r| r.get_mut("Date du document")),
        DocumentType::Defauts => None,
    };

    if let Some(value) = slot {
        match normalize_date_value(value) {
            Some(normalized) => *value = Value::String(normalized),
            None if !value.is_null() => {
                debug!(doc_type = %doc_type, value = %value, "Keeping unrecognised date as extracted");
            }
            None => {}
        }
    }
}
