//! Excelテンプレートの事前チェック
//!
//! 送信前にブックとして開けるかを確かめ、シート名を返す。

use crate::error::{DeskError, Result};
use crate::scanner::is_excel_path;
use calamine::{open_workbook_auto, Reader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub file_name: String,
    pub sheet_names: Vec<String>,
}

pub fn inspect_template(path: &Path) -> Result<TemplateSummary> {
    if !is_excel_path(path) {
        return Err(DeskError::Validation(format!(
            "Excelファイル（.xlsx/.xls）を選択してください: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(DeskError::Template(format!("ファイルがありません: {}", path.display())));
    }

    let workbook = open_workbook_auto(path)
        .map_err(|e| DeskError::Template(format!("{}: {}", path.display(), e)))?;
    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(DeskError::Template(format!("シートがありません: {}", path.display())));
    }

    Ok(TemplateSummary {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        sheet_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rejects_wrong_extension() {
        let err = inspect_template(Path::new("/t/data.csv")).unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = inspect_template(Path::new("/nonexistent/template.xlsx")).unwrap_err();
        assert!(matches!(err, DeskError::Template(_)));
    }

    #[test]
    fn test_garbage_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = inspect_template(&path).unwrap_err();
        assert!(matches!(err, DeskError::Template(_)));
    }
}
