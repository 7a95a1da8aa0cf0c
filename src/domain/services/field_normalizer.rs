// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;

/// 合法的班组代码，下标加一即对应的阿拉伯数字
const ROMAN_TEAMS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// 罗马数字用到的字母
const ROMAN_LETTERS: &str = "IVXLCDM";

/// 班组字段里常见的前缀词，查表前去掉
const TEAM_PREFIXES: &[&str] = &["EQUIPE", "TEAM"];

/// UAP 最多三位数字
const UAP_MAX_DIGITS: usize = 3;

/// 归一化 UAP（车间编号）
///
/// 字符串只保留 ASCII 数字；结果为空或超过三位时返回 None，否则原样返回（不补零）。
/// 1..=999 的整数转成十进制字符串，其他类型一律为 None。
pub fn normalize_uap(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => {
            let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() || digits.len() > UAP_MAX_DIGITS {
                None
            } else {
                Some(digits)
            }
        }
        Value::Number(_) => integral(value)
            .filter(|n| (1..=999).contains(n))
            .map(|n| n.to_string()),
        _ => None,
    }
}

/// 归一化班组代码 (Equipe)
///
/// 合法输出为 I 到 X 的罗马数字。字符串先去重音、转大写、去掉 "EQUIPE"/"TEAM"
/// 并修剪两端的标点空白：剩下的若全是数字，按整数在 1..=10 内换算（"03" 为 III）；
/// 否则只保留罗马数字字母后查 [`ROMAN_TEAMS`]。1..=10 的整数直接换算。
pub fn normalize_equipe(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => {
            let mut upper = deunicode::deunicode(raw).to_uppercase();
            for prefix in TEAM_PREFIXES {
                upper = upper.replace(prefix, "");
            }
            let token = upper.trim_matches(|c: char| !c.is_ascii_alphanumeric());

            if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
                return token.parse::<i64>().ok().and_then(roman_team);
            }
            let letters: String = token.chars().filter(|c| ROMAN_LETTERS.contains(*c)).collect();
            ROMAN_TEAMS
                .iter()
                .find(|roman| **roman == letters)
                .map(|roman| (*roman).to_string())
        }
        Value::Number(_) => integral(value).and_then(roman_team),
        _ => None,
    }
}

fn roman_team(n: i64) -> Option<String> {
    usize::try_from(n)
        .ok()
        .filter(|n| (1..=ROMAN_TEAMS.len()).contains(n))
        .map(|n| ROMAN_TEAMS[n - 1].to_string())
}

/// 就地归一化一条文档记录
///
/// 只改写 `header.uap` 和 `header.equipe`，其余字段保持不变；
/// 缺失的键保持缺失，无法识别的值写为 null。重复调用结果不变。
pub fn normalize(record: &mut Value) {
    let Some(Value::Object(header)) = record.get_mut("header") else {
        return;
    };

    if let Some(uap) = header.get_mut("uap") {
        *uap = to_json(normalize_uap(uap));
    }
    if let Some(equipe) = header.get_mut("equipe") {
        *equipe = to_json(normalize_equipe(equipe));
    }
}

/// 按值归一化，便于链式调用
pub fn normalized(mut record: Value) -> Value {
    normalize(&mut record);
    record
}

fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

fn to_json(value: Option<String>) -> Value {
    value.map(Value::String).unwrap_or(Value::Null)
}
