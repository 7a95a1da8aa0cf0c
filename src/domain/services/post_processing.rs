// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 按文档类型清理模型输出
//!
//! 这里的规则只做确定性的整理（合并、类型转换、剔除明显错误），不做推断。

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

static NUMERIC: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").ok());
static DEFECT_CODE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Z0-9-]{1,10}$").ok());
static MARK_MULTIPLIER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\d+)X$").ok());

const ROMAN: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];
const DAYS: [&str; 6] = ["Lun", "Mar", "Mer", "Jeu", "Ven", "Sam"];
const STATIONS: [&str; 3] = ["E1", "E2", "E3"];
const REBUT_DESCRIPTORS: [&str; 4] = ["designation", "unit", "type", "reference_fjk"];

/// 超过该值的缺陷计数视为误读
const MAX_MARK_COUNT: i64 = 50;

/// 空值：null、空串或字符串 "null"
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty() || s == "null",
        _ => false,
    }
}

fn matches(re: &Lazy<Option<Regex>>, s: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(s))
}

/// 解析 "12,5" / " 3 " 这类数字字符串；整数值返回整数
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().replace(',', ".").replace(' ', "");
            if matches(&NUMERIC, &cleaned) {
                cleaned.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn items_mut<'a>(record: &'a mut Value, key: &str) -> Option<&'a mut Vec<Value>> {
    record.get_mut(key).and_then(Value::as_array_mut)
}

// ---------------- Rebut ----------------

/// 合并重复参考号的废品行
///
/// 按 `reference` 去重并保留首次出现的顺序。重复行只有一两个有效字段时视为噪声：
/// 若首行缺少 `total_scrapped` 而噪声行的 `quantity` 是不超过 50 的不同数值，
/// 则把它当作报废数补上；其余情况只补齐首行缺失的字段。没有参考号的行原样保留。
pub fn deduplicate_rebut_items(record: &mut Value) {
    let Some(items) = items_mut(record, "items") else {
        return;
    };
    if items.is_empty() {
        return;
    }

    let mut merged: Vec<Value> = Vec::with_capacity(items.len());
    let mut index_by_ref: HashMap<String, usize> = HashMap::new();

    for row in items.drain(..) {
        let reference = row
            .get("reference")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let Some(reference) = reference else {
            merged.push(row);
            continue;
        };
        let Some(&idx) = index_by_ref.get(&reference) else {
            index_by_ref.insert(reference, merged.len());
            merged.push(row);
            continue;
        };

        let (Some(existing), Some(row)) = (merged[idx].as_object_mut(), row.as_object()) else {
            continue;
        };
        let meaningful = row.values().filter(|v| !is_blank(Some(v))).count();

        if meaningful <= 2 {
            let new_qty = row.get("quantity").and_then(parse_number);
            let existing_qty = existing.get("quantity").and_then(parse_number);
            if let Some(qty) = new_qty {
                if is_blank(existing.get("total_scrapped"))
                    && qty <= 50.0
                    && existing_qty != Some(qty)
                {
                    existing.insert("total_scrapped".to_string(), number_value(qty));
                }
            }
            for field in REBUT_DESCRIPTORS {
                fill_missing(existing, field, row.get(field));
            }
        } else {
            for (field, value) in row {
                if field != "reference" {
                    fill_missing(existing, field, Some(value));
                }
            }
        }
    }

    *items = merged;
}

fn fill_missing(target: &mut Map<String, Value>, field: &str, value: Option<&Value>) {
    if is_blank(target.get(field)) && !is_blank(value) {
        if let Some(value) = value {
            target.insert(field.to_string(), value.clone());
        }
    }
}

/// 废品行的数值字段转换
///
/// `quantity` 可为小数，`total_scrapped` 必须是整数；无法解析的字符串置为 null。
/// 报废数同时大于数量的 5 倍和 50 时视为误读。
pub fn normalize_rebut_numeric_fields(record: &mut Value) {
    let Some(items) = items_mut(record, "items") else {
        return;
    };

    for item in items.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(Value::String(raw)) = item.get("quantity") {
            let parsed = parse_number(&Value::String(raw.clone()));
            item.insert(
                "quantity".to_string(),
                parsed.map(number_value).unwrap_or(Value::Null),
            );
        }

        if let Some(Value::String(raw)) = item.get("total_scrapped") {
            let cleaned = raw.trim().replace(' ', "");
            let parsed = if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
                cleaned.parse::<i64>().ok().map(Value::from)
            } else {
                None
            };
            item.insert("total_scrapped".to_string(), parsed.unwrap_or(Value::Null));
        }

        let quantity = item.get("quantity").and_then(Value::as_f64);
        let total = item.get("total_scrapped").and_then(Value::as_f64);
        if let (Some(quantity), Some(total)) = (quantity, total) {
            if total > quantity * 5.0 && total > 50.0 {
                item.insert("total_scrapped".to_string(), Value::Null);
            }
        }
    }
}

// ---------------- Kosu ----------------

/// Kosu 的基础整理
///
/// `Equipe` 为 1..=10 的整数时转罗马数字，小数和负数保持原样；`Suivi horaire` 去掉全空行；
/// `Total / Equipe` 中明显是整数的字符串转为整数。
pub fn post_process_kosu(record: &mut Value) {
    let Some(root) = record.as_object_mut() else {
        return;
    };

    let roman = match root.get("Equipe") {
        Some(Value::String(s)) => s.trim().parse::<usize>().ok(),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| usize::try_from(n).ok()),
        _ => None,
    }
    .filter(|n| (1..=10).contains(n))
    .map(|n| ROMAN[n - 1]);
    if let Some(roman) = roman {
        root.insert("Equipe".to_string(), json!(roman));
    }

    if let Some(Value::Array(rows)) = root.get_mut("Suivi horaire") {
        rows.retain(|row| {
            row.as_object()
                .is_some_and(|r| r.values().any(|v| !is_blank(Some(v))))
        });
    }

    if let Some(Value::Object(totals)) = root.get_mut("Total / Equipe") {
        for value in totals.values_mut() {
            let Value::String(raw) = value else { continue };
            let compact = raw.trim().replace(',', ".").replace(' ', "");
            if !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(n) = compact.parse::<i64>() {
                    *value = json!(n);
                }
            }
        }
    }
}

// ---------------- Défauts ----------------

/// 把手写标记换算成次数
///
/// `"3"` → 3，`"2X"` → 2，`"XXX"` / `"✔✔"` → 符号个数；其他写法为 None。
pub fn normalize_defauts_mark(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_f64().map(|f| f.trunc() as i64),
        Value::String(s) => {
            let mark = s.trim().to_uppercase();
            if mark.is_empty() {
                return None;
            }
            if mark.chars().all(|c| c.is_ascii_digit()) {
                return mark.parse().ok();
            }
            if let Some(caps) = MARK_MULTIPLIER.as_ref().and_then(|re| re.captures(&mark)) {
                return caps.get(1).and_then(|m| m.as_str().parse().ok());
            }
            if mark.chars().all(|c| matches!(c, 'X' | '✓' | '✔')) {
                return Some(mark.chars().count() as i64);
            }
            None
        }
        _ => None,
    }
}

/// 统一缺陷记录的字段写法并计算 `count`
pub fn normalize_defauts_records(records: &[Value]) -> Vec<Value> {
    records
        .iter()
        .map(|record| {
            let field = |key: &str| record.get(key).cloned().unwrap_or(Value::Null);
            let raw_mark = field("raw_mark");
            let count = normalize_defauts_mark(&raw_mark);

            let day = match field("day") {
                Value::String(s) => {
                    let upper = s.trim().to_uppercase();
                    let canonical = DAYS.iter().find(|d| d.to_uppercase() == upper);
                    json!(canonical.map(|d| d.to_string()).unwrap_or_else(|| title_case(s.trim())))
                }
                other => other,
            };
            let station = match field("station") {
                Value::String(s) => json!(s.trim().to_uppercase()),
                other => other,
            };
            let code = match field("code") {
                Value::String(s) => json!(s.trim()),
                other => other,
            };

            json!({
                "code": code,
                "day": day,
                "station": station,
                "raw_mark": raw_mark,
                "count": count,
            })
        })
        .collect()
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// 过滤缺陷记录
///
/// 丢弃既无标记也无次数的行；日期、工位不在枚举内时置 null；代码需匹配
/// `[A-Z0-9-]{1,10}`；按 (code, day, station, raw_mark) 去重；次数为负或超过 50 置 null。
pub fn refine_defauts_records(records: Vec<Value>) -> Vec<Value> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut refined = Vec::with_capacity(records.len());

    for mut record in records {
        let Some(fields) = record.as_object_mut() else {
            continue;
        };
        if is_blank(fields.get("raw_mark")) && is_blank(fields.get("count")) {
            continue;
        }

        let day = fields
            .get("day")
            .and_then(Value::as_str)
            .filter(|d| DAYS.contains(d))
            .map(|d| json!(d))
            .unwrap_or(Value::Null);
        let station = fields
            .get("station")
            .and_then(Value::as_str)
            .filter(|s| STATIONS.contains(s))
            .map(|s| json!(s))
            .unwrap_or(Value::Null);
        let code = match fields.get("code") {
            Some(Value::String(c)) => {
                let upper = c.trim().to_uppercase();
                if matches(&DEFECT_CODE, &upper) {
                    json!(upper)
                } else {
                    Value::Null
                }
            }
            Some(other) => other.clone(),
            None => Value::Null,
        };

        let key = json!([code, day, station, fields.get("raw_mark")]).to_string();
        if !seen.insert(key) {
            continue;
        }

        if fields
            .get("count")
            .and_then(Value::as_i64)
            .is_some_and(|c| !(0..=MAX_MARK_COUNT).contains(&c))
        {
            fields.insert("count".to_string(), Value::Null);
        }
        fields.insert("code".to_string(), code);
        fields.insert("day".to_string(), day);
        fields.insert("station".to_string(), station);
        refined.push(record);
    }

    refined
}

/// 按 (day, station) 汇总缺陷次数，按键排序
pub fn compute_defauts_daily_totals(records: &[Value]) -> Vec<Value> {
    let mut totals: BTreeMap<(Option<String>, Option<String>), i64> = BTreeMap::new();
    for record in records {
        let Some(count) = record.get("count").and_then(Value::as_i64) else {
            continue;
        };
        let key = (
            record.get("day").and_then(Value::as_str).map(str::to_string),
            record.get("station").and_then(Value::as_str).map(str::to_string),
        );
        let total = totals.entry(key).or_insert(0);
        *total = total.saturating_add(count);
    }

    totals
        .into_iter()
        .map(|((day, station), total)| {
            json!({"day": day, "station": station, "total_defauts": total})
        })
        .collect()
}

/// 按模型的核验结果保留缺陷记录
///
/// `verdict` 形如 `{"verified":[{"index":0,"keep":false}]}`；只有明确为 false 的条目被删除。
pub fn apply_defauts_verification(record: &mut Value, verdict: &Value) {
    let drop: HashSet<u64> = verdict
        .get("verified")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|e| e.get("keep") == Some(&Value::Bool(false)))
                .filter_map(|e| e.get("index").and_then(Value::as_u64))
                .collect()
        })
        .unwrap_or_default();

    if let Some(defects) = items_mut(record, "recorded_defects") {
        let mut index = 0u64;
        defects.retain(|_| {
            let keep = !drop.contains(&index);
            index += 1;
            keep
        });
    }
}

/// 合并补漏轮找到的额外缺陷
///
/// 与现有 (code, day, station) 重复或没有标记的条目被忽略。返回新增条数。
pub fn merge_recovered_defects(record: &mut Value, recovered: &Value) -> usize {
    let additional = recovered
        .get("additional")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let Some(root) = record.as_object_mut() else {
        return 0;
    };
    let defects = root
        .entry("recorded_defects")
        .or_insert_with(|| Value::Array(Vec::new()));
    let Some(defects) = defects.as_array_mut() else {
        return 0;
    };

    let position = |r: &Value| {
        json!([r.get("code"), r.get("day"), r.get("station")]).to_string()
    };
    let mut present: HashSet<String> = defects.iter().map(position).collect();
    let mut added = 0;

    for entry in additional.into_iter().filter(Value::is_object) {
        if is_blank(entry.get("raw_mark")) || !present.insert(position(&entry)) {
            continue;
        }
        defects.push(entry);
        added += 1;
    }
    added
}

/// Défauts 的最终整理：规范化、过滤并生成 `defects_log` 与每日汇总。返回记录条数。
pub fn finalize_defauts(record: &mut Value) -> usize {
    let Some(root) = record.as_object_mut() else {
        return 0;
    };

    let raw = root
        .get("recorded_defects")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let refined = refine_defauts_records(normalize_defauts_records(&raw));
    let totals = compute_defauts_daily_totals(&refined);
    let count = refined.len();

    root.insert("recorded_defects".to_string(), Value::Array(refined.clone()));
    root.insert("defects_log".to_string(), Value::Array(refined));
    root.insert("summary_data".to_string(), json!({"daily_totals": totals}));
    count
}
