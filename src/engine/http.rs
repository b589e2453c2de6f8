use super::EngineApi;
use crate::error::{DeskError, Result};
use async_trait::async_trait;
use invoice_ai_common::{ErrorDetail, HealthStatus, ProcessingRequest, ProcessingResult};
use reqwest::Client;
use tracing::{debug, info, warn};

const HEALTH_PATH: &str = "/health";
const PROCESS_PATH: &str = "/process-invoices";

/// HTTP経由のエンジン
///
/// タイムアウトはreqwestの既定値のまま（独自には設けない）。
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    base_url: String,
}

impl HttpEngine {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl EngineApi for HttpEngine {
    async fn health(&self) -> Result<()> {
        let url = self.url(HEALTH_PATH);
        debug!(%url, "health probe");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DeskError::UnreachableEngine(format!("{}: {}", self.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "health probe failed");
            return Err(DeskError::UnreachableEngine(format!(
                "{} がステータス {} を返しました",
                url, status
            )));
        }

        // ボディは参考情報。読めなくても生存とみなす
        let text = response.text().await.unwrap_or_default();
        let health: HealthStatus = serde_json::from_str(&text).unwrap_or_default();
        debug!(status = %health.status, message = %health.message, "engine alive");
        Ok(())
    }

    async fn process_invoices(&self, request: &ProcessingRequest) -> Result<ProcessingResult> {
        let url = self.url(PROCESS_PATH);
        info!(
            %url,
            image_folder = %request.image_folder,
            template = %request.excel_template_path,
            output = %request.output_excel_path,
            "submitting processing request"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| DeskError::UnreachableEngine(format!("{}: {}", self.base_url, e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            DeskError::EngineRejected(format!("応答の読み込みに失敗しました: {}", e))
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorDetail>(&text)
                .map(|d| d.detail)
                .unwrap_or_default();
            let message = if detail.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                detail
            };
            warn!(%status, %message, "engine rejected request");
            return Err(DeskError::EngineRejected(message));
        }

        let result: ProcessingResult = serde_json::from_str(&text).map_err(|e| {
            warn!(%status, error = %e, "engine response is not a processing result");
            DeskError::EngineRejected(format!("応答を解釈できません: {}", e))
        })?;
        debug!(success = result.success, output = %result.excel_file_path, "engine responded");
        Ok(result)
    }
}
