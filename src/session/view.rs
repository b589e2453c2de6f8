//! 生成ファイル一覧の表示用モデル
//!
//! `sequential_id` は表示用の連番で、削除のたびに振り直す。
//! 行の操作には `key`（正規化パスのSHA-256）と `path` を使う。

use chrono::{DateTime, Local};
use invoice_ai_common::{file_name_of, normalize_path, OutputFileRecord};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFileRow {
    pub sequential_id: usize,
    pub key: String,
    pub path: String,
    pub display_name: String,
    pub timestamp_label: String,
}

/// 行ボタンの操作（描画側が返し、コントローラが実行する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Open(String),
    OpenFolder(String),
    Delete(String),
}

pub fn row_key(path: &str) -> String {
    let digest = Sha256::digest(normalize_path(path).as_bytes());
    hex::encode(digest)
}

pub fn build_row(path: &str, timestamp_label: String) -> GeneratedFileRow {
    let normalized = normalize_path(path);
    GeneratedFileRow {
        sequential_id: 0,
        key: row_key(&normalized),
        display_name: file_name_of(&normalized).to_string(),
        path: normalized,
        timestamp_label,
    }
}

pub fn rows_from_records(records: &[OutputFileRecord]) -> Vec<GeneratedFileRow> {
    let mut rows: Vec<GeneratedFileRow> = records
        .iter()
        .map(|r| build_row(&r.file_path, modified_label(Path::new(&r.file_path))))
        .collect();
    renumber(&mut rows);
    rows
}

/// 1始まりの連番を振り直す
pub fn renumber(rows: &mut [GeneratedFileRow]) {
    for (idx, row) in rows.iter_mut().enumerate() {
        row.sequential_id = idx + 1;
    }
}

/// ファイルの更新日時。読めなければ "-"
pub fn modified_label(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| timestamp_label(DateTime::<Local>::from(t)))
        .unwrap_or_else(|_| "-".to_string())
}

pub fn timestamp_label(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}
