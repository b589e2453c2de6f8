//! invoice-ai-desk
//!
//! 請求書画像フォルダとExcelテンプレートを外部の処理エンジンに渡し、
//! 生成されたExcelファイルの履歴を管理する。

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod opener;
pub mod output_path;
pub mod processing;
pub mod registry;
pub mod scanner;
pub mod session;
pub mod template;

pub use engine::{EngineApi, HttpEngine};
pub use error::{DeskError, Result};
pub use processing::{ProcessingClient, ProcessingOutcome, ProcessingStage, Submission};
pub use registry::{AddOutcome, MatchMode, RegistryService, RegistryStore};
pub use session::SessionController;
