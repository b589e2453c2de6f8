use crate::error::{DeskError, Result};
use invoice_ai_common::FileInfo;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 処理対象にできる画像の拡張子（小文字で比較）
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// テンプレートとして受け付ける拡張子
pub const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xls"];

fn extension_lower(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

pub fn is_image_path(path: &Path) -> bool {
    extension_lower(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_excel_path(path: &Path) -> bool {
    extension_lower(path)
        .map(|ext| EXCEL_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// フォルダ直下の画像を列挙する（再帰しない）
pub fn scan_folder(folder: &Path) -> Result<Vec<FileInfo>> {
    if !folder.is_dir() {
        return Err(DeskError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_image_path(path) {
            continue;
        }
        images.push(image_info(path));
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(images)
}

/// 画像拡張子のものだけ残す
pub fn validate_image_files(files: &[FileInfo]) -> Vec<FileInfo> {
    files
        .iter()
        .filter(|f| is_image_path(Path::new(&f.path)))
        .map(|f| FileInfo {
            name: f.name.clone(),
            path: f.path.clone(),
            kind: "image".to_string(),
        })
        .collect()
}

/// Excelテンプレートとして受け付けるか
pub fn validate_excel_file(file: Option<&FileInfo>) -> bool {
    file.map(|f| is_excel_path(Path::new(&f.path))).unwrap_or(false)
}

pub fn image_info(path: &Path) -> FileInfo {
    FileInfo {
        name: display_name(path),
        path: path.to_string_lossy().to_string(),
        kind: "image".to_string(),
    }
}

pub fn excel_info(path: &Path) -> FileInfo {
    FileInfo {
        name: display_name(path),
        path: path.to_string_lossy().to_string(),
        kind: "excel".to_string(),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 選択画像に共通する親フォルダ
pub fn common_parent(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut parents = paths.iter().filter_map(|p| p.parent());
    let mut common = parents.next()?.to_path_buf();
    for parent in parents {
        while !parent.starts_with(&common) {
            if !common.pop() {
                return None;
            }
        }
    }
    Some(common)
}
