use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 環境変数でエンジンURLを上書きする
pub const ENGINE_URL_ENV: &str = "INVOICE_ENGINE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 処理エンジンのベースURL
    pub engine_url: String,
    /// 生成ファイル履歴（JSON）の保存先
    pub registry_path: PathBuf,
    /// 生成Excelの出力先フォルダ
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_url: "http://localhost:8000".into(),
            registry_path: PathBuf::from("data").join("file_path.json"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        // 環境変数を優先
        if let Ok(url) = std::env::var(ENGINE_URL_ENV) {
            if !url.trim().is_empty() {
                config.engine_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DeskError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("invoice-ai-desk").join("config.json"))
    }

    pub fn set_engine_url(&mut self, url: String) -> Result<()> {
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DeskError::Config(format!("URLは http:// か https:// で始めてください: {url}")));
        }
        self.engine_url = url;
        self.save()
    }

    /// 出力フォルダを絶対パスで返す（エンジンは別プロセスのため）
    pub fn absolute_output_dir(&self) -> Result<PathBuf> {
        if self.output_dir.is_absolute() {
            Ok(self.output_dir.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.output_dir))
        }
    }
}
