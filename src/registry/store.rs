//! 履歴ファイルの永続化
//!
//! 読み込みポリシー:
//! - ファイルがない → 空
//! - 読めない（権限など） → 一覧表示では警告を出して空、更新時は RegistryIo エラー
//! - JSONとして壊れている、UTF-8でない → RegistryParse エラー
//!
//! 更新系が読めないファイルを空とみなすと既存の履歴を上書きしてしまうため、
//! `load_for_update` は NotFound 以外の読み込み失敗をそのまま返す。
//!
//! 保存は一時ファイルに書いてからリネームするので、
//! 呼び出し側から中途半端な状態は見えない。

use crate::error::{DeskError, Result};
use invoice_ai_common::{parse_records, render_records, OutputFileRecord};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 全件を読み込む（表示用）
    pub fn load(&self) -> Result<Vec<OutputFileRecord>> {
        match self.read_content() {
            Ok(content) => self.parse(content),
            Err(DeskError::RegistryIo(message)) => {
                warn!(path = %self.path.display(), error = %message, "registry file unreadable, treating as empty");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// 書き戻す前提で全件を読み込む。読めなければエラー。
    pub fn load_for_update(&self) -> Result<Vec<OutputFileRecord>> {
        let content = self.read_content()?;
        self.parse(content)
    }

    /// ファイルがなければ None
    fn read_content(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "registry file absent, starting empty");
                Ok(None)
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => Err(DeskError::RegistryParse(
                format!("{}: {}", self.path.display(), err),
            )),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn parse(&self, content: Option<String>) -> Result<Vec<OutputFileRecord>> {
        let Some(content) = content else {
            return Ok(Vec::new());
        };
        let records = parse_records(&content)
            .map_err(|e| DeskError::RegistryParse(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), count = records.len(), "registry loaded");
        Ok(records)
    }

    /// 全件を書き戻す
    pub fn save(&self, records: &[OutputFileRecord]) -> Result<()> {
        let content = render_records(records)
            .map_err(|e| DeskError::RegistryIo(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, content).map_err(|e| self.io_error(e))?;
        if let Err(err) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(self.io_error(err));
        }

        debug!(path = %self.path.display(), count = records.len(), "registry saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file_path.json".to_string());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }

    fn io_error(&self, err: std::io::Error) -> DeskError {
        DeskError::RegistryIo(format!("{}: {}", self.path.display(), err))
    }
}
