//! パス文字列の正規化
//!
//! `\` と `/` を同一視して比較するためのヘルパー。
//! 実ファイルシステムには触れない。

/// 前後の空白を除き、区切り文字を `/` に揃える
pub fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}

/// 正規化済みパスの末尾セグメント
pub fn file_name_of(normalized: &str) -> &str {
    let trimmed = normalized.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}
