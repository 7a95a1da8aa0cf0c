// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 文档类型解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentTypeError {
    /// 不在支持列表中的文档类型
    #[error("Unsupported document type \"{0}\". Allowed values: Rebut, NPT, Kosu, Défauts")]
    UnsupportedDocumentType(String),
}

/// 工厂纸质表单类型
///
/// 四种固定表单：废品 (Rebut)、停机 (NPT)、生产率 (Kosu)、缺陷 (Défauts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Rebut,
    Npt,
    Kosu,
    Defauts,
}

/// 别名表：键为去重音、小写后的输入
const ALIASES: &[(&str, DocumentType)] = &[
    ("rebut", DocumentType::Rebut),
    ("npt", DocumentType::Npt),
    ("kosu", DocumentType::Kosu),
    ("defauts", DocumentType::Defauts),
];

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Rebut,
        DocumentType::Npt,
        DocumentType::Kosu,
        DocumentType::Defauts,
    ];

    /// 将用户输入解析为规范类型
    ///
    /// 输入先去除首尾空白、转小写并去掉重音，再查别名表，
    /// 因此 "défauts"、"Defauts"、"DEFAUTS" 都解析为 [`DocumentType::Defauts`]。
    ///
    /// # 错误
    ///
    /// 别名表之外的值返回 [`DocumentTypeError::UnsupportedDocumentType`]
    pub fn resolve(input: &str) -> Result<Self, DocumentTypeError> {
        let key = fold(input);
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, doc_type)| *doc_type)
            .ok_or_else(|| DocumentTypeError::UnsupportedDocumentType(input.trim().to_string()))
    }

    /// 规范名称，存储和响应中使用
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Rebut => "Rebut",
            DocumentType::Npt => "NPT",
            DocumentType::Kosu => "Kosu",
            DocumentType::Defauts => "Défauts",
        }
    }

    /// 文件名和工作表名使用的 ASCII 标识
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentType::Rebut => "rebut",
            DocumentType::Npt => "npt",
            DocumentType::Kosu => "kosu",
            DocumentType::Defauts => "defauts",
        }
    }
}

fn fold(input: &str) -> String {
    deunicode::deunicode(input.trim()).to_lowercase()
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DocumentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl Serialize for DocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DocumentType::resolve(&raw).map_err(serde::de::Error::custom)
    }
}
