//! 請求書処理エンジン（HTTP）とのやり取りに使う型
//!
//! - ProcessingRequest: `POST /process-invoices` のボディ
//! - ProcessingResult: 成功時のレスポンス
//! - ErrorDetail: 失敗時のレスポンス（`{"detail": "..."}`）

use serde::{Deserialize, Serialize};

/// 処理リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRequest {
    pub image_folder: String,
    pub excel_template_path: String,
    pub output_excel_path: String,
}

/// 顧客名のあいまい一致結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatch {
    pub original: String,
    pub matched: String,
    pub confidence: f64,
}

/// 処理結果
///
/// HTTPステータスとは別に `success` が論理的な成否を表す。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingResult {
    pub success: bool,
    pub message: String,
    pub total_processed: u32,
    pub successful_extractions: u32,
    pub failed_extractions: u32,
    pub excel_file_path: String,
    pub new_customers_added: Vec<String>,
    pub fuzzy_matches_found: Vec<FuzzyMatch>,
}

/// 失敗レスポンス
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: String,
}

/// `GET /health` のレスポンス（中身は参考情報）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}
