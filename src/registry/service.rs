//! 履歴の追加・削除
//!
//! 不変条件:
//! - 新しいものが先頭
//! - 正規化パスの重複なし
//! - 件数は REGISTRY_CAPACITY 以下（超えたら末尾から捨てる）

use super::store::RegistryStore;
use crate::error::{DeskError, Result};
use invoice_ai_common::{normalize_path, OutputFileRecord};
use std::path::PathBuf;
use tracing::info;

/// 保持する最大件数
pub const REGISTRY_CAPACITY: usize = 50;

/// 追加結果（どちらも成功扱い）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// 削除時の照合方法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// 正規化パス一致、またはファイル名のみ一致
    #[default]
    Loose,
    /// 正規化パス一致のみ
    Exact,
}

impl MatchMode {
    fn matches(&self, record: &OutputFileRecord, target: &str) -> bool {
        match self {
            MatchMode::Loose => record.same_path(target) || record.same_file_name(target),
            MatchMode::Exact => record.same_path(target),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistryService {
    store: RegistryStore,
    capacity: usize,
}

impl RegistryService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_store(RegistryStore::new(path))
    }

    pub fn with_store(store: RegistryStore) -> Self {
        Self {
            store,
            capacity: REGISTRY_CAPACITY,
        }
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    /// 現在の一覧（新しい順）
    pub fn list(&self) -> Result<Vec<OutputFileRecord>> {
        self.store.load()
    }

    /// 先頭に追加する。既にあれば何もしない。
    pub fn add(&self, path: &str) -> Result<AddOutcome> {
        let normalized = normalize_path(path);
        if normalized.is_empty() {
            return Err(DeskError::Validation("追加するパスが空です".into()));
        }

        let mut records = self.store.load_for_update()?;
        if records.iter().any(|r| r.same_path(&normalized)) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        records.insert(0, OutputFileRecord::excel(&normalized));
        records.truncate(self.capacity);
        self.store.save(&records)?;

        info!(path = %normalized, total = records.len(), "registry entry added");
        Ok(AddOutcome::Added)
    }

    /// ゆるい照合で削除する（同名ファイルは別フォルダでも消える）
    pub fn remove(&self, path: &str) -> Result<usize> {
        self.remove_with(path, MatchMode::Loose)
    }

    /// 照合方法を指定して削除する。消した件数を返す。
    pub fn remove_with(&self, path: &str, mode: MatchMode) -> Result<usize> {
        let target = normalize_path(path);
        let records = self.store.load_for_update()?;
        let before = records.len();

        let kept: Vec<OutputFileRecord> = records
            .into_iter()
            .filter(|r| !mode.matches(r, &target))
            .collect();
        let removed = before - kept.len();

        if removed == 0 {
            return Err(DeskError::NotFound(target));
        }

        self.store.save(&kept)?;
        info!(path = %target, removed, ?mode, "registry entries removed");
        Ok(removed)
    }

    /// 削除した場合に対象となるレコード（確認表示用）
    pub fn matching(&self, path: &str, mode: MatchMode) -> Result<Vec<OutputFileRecord>> {
        let target = normalize_path(path);
        Ok(self
            .store
            .load()?
            .into_iter()
            .filter(|r| mode.matches(r, &target))
            .collect())
    }
}
