//! 出力Excelパスの生成
//!
//! `<テンプレート名>_<日時>_<連番><拡張子>` を出力フォルダに作る。
//! 連番はプロセス内で単調増加し、同名ファイルが既にあればさらに進める。

use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const DEFAULT_EXTENSION: &str = "xlsx";
const DEFAULT_BASE_NAME: &str = "output";

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_counter() -> u64 {
    RUN_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// テンプレートファイル名から出力先パスを作る
pub fn generate_output_path_from_excel(template: &Path, output_dir: &Path) -> PathBuf {
    let base_name = template
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());
    let extension = template
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

    loop {
        let candidate = output_dir.join(format!(
            "{}_{}_{}.{}",
            base_name,
            stamp,
            next_counter(),
            extension
        ));
        if !candidate.exists() {
            return candidate;
        }
    }
}
