//! レジストリファイルの読み書き形式
//!
//! UTF-8のJSON配列（整形済み）。外部ツールで編集する場合もこの形を保つこと。

use crate::error::{Error, Result};
use crate::record::OutputFileRecord;

/// レジストリファイルの内容をパースする
///
/// 空文字列と `null` は空の一覧として扱う。
pub fn parse_records(text: &str) -> Result<Vec<OutputFileRecord>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(text)?;
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        other => Err(Error::Format(format!(
            "配列が必要です（実際: {}）",
            json_kind(&other)
        ))),
    }
}

/// 一覧を整形済みJSONにする
pub fn render_records(records: &[OutputFileRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
