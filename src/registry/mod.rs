//! 生成ファイル履歴（レジストリ）
//!
//! - store: ファイルへの読み書き（全件の読み込み・全件の書き戻し）
//! - service: 追加・削除・上限管理

pub mod service;
pub mod store;

pub use service::{AddOutcome, MatchMode, RegistryService, REGISTRY_CAPACITY};
pub use store::RegistryStore;
