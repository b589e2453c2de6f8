//! OS既定のアプリ／ファイルマネージャで開く

use crate::error::{DeskError, Result};
use std::path::Path;
use std::process::Command;
use tracing::info;

const LINUX_FILE_MANAGERS: &[&str] = &["nautilus", "dolphin", "thunar", "pcmanfm", "caja"];

/// 既定のアプリでファイルを開く
pub fn open_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(DeskError::Open(format!("ファイルがありません: {}", path.display())));
    }

    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/c", "start", ""]).arg(path);
        c
    } else if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(path);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };

    info!(path = %path.display(), "opening file");
    cmd.spawn()
        .map_err(|e| DeskError::Open(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// フォルダをファイルマネージャで開く
pub fn open_folder(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(DeskError::Open(format!("フォルダがありません: {}", path.display())));
    }

    let mut cmd = if cfg!(target_os = "windows") {
        Command::new("explorer")
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        let manager = LINUX_FILE_MANAGERS
            .iter()
            .find(|fm| which_on_path(fm))
            .ok_or_else(|| DeskError::Open("利用できるファイルマネージャがありません".into()))?;
        Command::new(manager)
    };
    cmd.arg(path);

    info!(path = %path.display(), "opening folder");
    cmd.spawn()
        .map_err(|e| DeskError::Open(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// ファイルを含むフォルダを開く
pub fn open_containing_folder(path: &Path) -> Result<()> {
    let folder = path
        .parent()
        .ok_or_else(|| DeskError::Open(format!("親フォルダがありません: {}", path.display())))?;
    open_folder(folder)
}

fn which_on_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

/// 人が読めるサイズ表記（1024単位、小数1桁）
pub fn human_file_size(size: u64) -> String {
    const UNIT: u64 = 1024;
    const UNITS: &[&str] = &["KB", "MB", "GB", "TB"];

    if size < UNIT {
        return format!("{} B", size);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = size / UNIT;
    while n >= UNIT && exp + 1 < UNITS.len() {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}", size as f64 / div as f64, UNITS[exp])
}

pub fn file_size_label(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    Ok(human_file_size(meta.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_human_file_size() {
        assert_eq!(human_file_size(0), "0 B");
        assert_eq!(human_file_size(1023), "1023 B");
        assert_eq!(human_file_size(1024), "1.0 KB");
        assert_eq!(human_file_size(1536), "1.5 KB");
        assert_eq!(human_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(human_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        assert_eq!(human_file_size(2048 * 1024 * 1024 * 1024 * 1024), "2048.0 TB");
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_file(Path::new("/nonexistent/report.xlsx")).unwrap_err();
        assert!(matches!(err, DeskError::Open(_)));
    }

    #[test]
    fn test_open_missing_folder() {
        let err = open_folder(Path::new("/nonexistent/folder")).unwrap_err();
        assert!(matches!(err, DeskError::Open(_)));
    }

    #[test]
    fn test_file_size_label() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.xlsx");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();
        assert_eq!(file_size_label(&path).unwrap(), "2.0 KB");
    }
}
