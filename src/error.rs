use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("入力エラー: {0}")]
    Validation(String),

    #[error("処理エンジンに接続できません: {0}")]
    UnreachableEngine(String),

    #[error("処理エンジンが処理を拒否しました: {0}")]
    EngineRejected(String),

    #[error("履歴ファイルの保存に失敗: {0}")]
    RegistryIo(String),

    #[error("履歴ファイルが不正: {0}")]
    RegistryParse(String),

    #[error("履歴に見つかりません: {0}")]
    NotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("テンプレートを読み込めません: {0}")]
    Template(String),

    #[error("開けません: {0}")]
    Open(String),

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] invoice_ai_common::Error),
}

impl DeskError {
    /// 処理結果に影響しない（警告扱いの）エラーか
    pub fn is_secondary(&self) -> bool {
        matches!(self, DeskError::RegistryIo(_) | DeskError::RegistryParse(_))
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
