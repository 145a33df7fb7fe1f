//! 配置文件解析模块
//!
//! 支持 TOML (主要) 和 JSON 格式，内容为扁平的 `KEY = value` 映射。

use std::collections::HashMap;

use contracts::ContractError;
use serde::Deserialize;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 标量配置值
///
/// 嵌套表和数组不被接受。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(i) => i.to_string(),
            // Debug 格式保留小数点或指数，不会被当作整数解析
            Self::Float(f) => format!("{f:?}"),
            Self::Flag(b) => b.to_string(),
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<HashMap<String, String>, ContractError> {
    let raw: HashMap<String, RawValue> =
        toml::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("TOML parse error: {e}"),
            source: Some(Box::new(e)),
        })?;
    Ok(flatten(raw))
}

/// 解析 JSON 格式配置
///
/// `null` 值视为未设置。
pub fn parse_json(content: &str) -> Result<HashMap<String, String>, ContractError> {
    let raw: HashMap<String, Option<RawValue>> =
        serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("JSON parse error: {e}"),
            source: Some(Box::new(e)),
        })?;
    Ok(flatten(
        raw.into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect(),
    ))
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<HashMap<String, String>, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

fn flatten(raw: HashMap<String, RawValue>) -> HashMap<String, String> {
    raw.into_iter().map(|(k, v)| (k, v.into_text())).collect()
}
