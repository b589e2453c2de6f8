//! 生成ファイル履歴のレコード型
//!
//! レジストリファイル（`[{ "file_path": ..., "type": ... }]`）と
//! 1対1で対応する。

use serde::{Deserialize, Serialize};

use crate::path::{file_name_of, normalize_path};

/// 生成ファイルの種別（現状はExcelのみ）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    Excel,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Excel => "excel",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生成済みファイル1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFileRecord {
    pub file_path: String,
    #[serde(rename = "type", default)]
    pub kind: FileKind,
}

impl OutputFileRecord {
    /// パスを正規化してExcelレコードを作る
    pub fn excel(path: &str) -> Self {
        Self {
            file_path: normalize_path(path),
            kind: FileKind::Excel,
        }
    }

    /// 比較用の正規化済みパス
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.file_path)
    }

    /// 正規化パスが一致するか
    pub fn same_path(&self, normalized: &str) -> bool {
        self.normalized_path() == normalized
    }

    /// ファイル名部分が一致するか（削除時のゆるい照合用）
    pub fn same_file_name(&self, normalized: &str) -> bool {
        file_name_of(&self.normalized_path()) == file_name_of(normalized)
    }
}

/// ダイアログから受け取るファイル情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}
