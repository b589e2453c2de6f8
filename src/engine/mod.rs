//! 請求書処理エンジンとの接続口
//!
//! エンジン本体（OCR・顧客照合・Excel生成）は別プロセス。
//! ここでは生存確認と処理依頼の2つだけを扱う。

mod http;

pub use http::HttpEngine;

use crate::error::Result;
use async_trait::async_trait;
use invoice_ai_common::{ProcessingRequest, ProcessingResult};

#[async_trait]
pub trait EngineApi: Send + Sync {
    /// 生存確認。2xxならOk。
    async fn health(&self) -> Result<()>;

    /// 処理依頼（1回きり、リトライなし）
    ///
    /// HTTPとして成功したボディをそのまま返す。
    /// `success` フラグの判定は呼び出し側で行う。
    async fn process_invoices(&self, request: &ProcessingRequest) -> Result<ProcessingResult>;
}
