//! 処理リクエストのライフサイクル
//!
//! Idle → HealthCheck → Submitting → Completed / Failed
//!
//! - 入力不足なら通信せずに ValidationError
//! - 生存確認に失敗したら処理依頼は送らない
//! - 成功後の履歴追加の失敗は処理結果を覆さない（警告として返す）

use crate::engine::EngineApi;
use crate::error::{DeskError, Result};
use crate::output_path::generate_output_path_from_excel;
use crate::registry::{AddOutcome, RegistryService};
use crate::scanner::common_parent;
use invoice_ai_common::{ProcessingRequest, ProcessingResult};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Idle,
    HealthCheck,
    Submitting,
    Completed,
    Failed,
}

impl ProcessingStage {
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingStage::Idle => "待機中",
            ProcessingStage::HealthCheck => "エンジン確認中",
            ProcessingStage::Submitting => "処理中",
            ProcessingStage::Completed => "完了",
            ProcessingStage::Failed => "失敗",
        }
    }
}

/// 送信内容（選択中の画像とテンプレート）
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub images: Vec<PathBuf>,
    pub template: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub result: ProcessingResult,
    /// エンジンが返した実際の出力パス（送ったパスと異なることがある）
    pub output_path: String,
    /// 履歴への追加結果。失敗時は None で registry_warning に理由が入る
    pub registry: Option<AddOutcome>,
    pub registry_warning: Option<String>,
}

pub struct ProcessingClient<E> {
    engine: E,
    registry: RegistryService,
    output_dir: PathBuf,
}

impl<E: EngineApi> ProcessingClient<E> {
    pub fn new(engine: E, registry: RegistryService, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            registry,
            output_dir: output_dir.into(),
        }
    }

    pub async fn run(&self, submission: &Submission) -> Result<ProcessingOutcome> {
        self.run_with_progress(submission, |_| {}).await
    }

    pub async fn run_with_progress<F>(&self, submission: &Submission, mut on_stage: F) -> Result<ProcessingOutcome>
    where
        F: FnMut(ProcessingStage),
    {
        on_stage(ProcessingStage::Idle);
        let result = self.drive(submission, &mut on_stage).await;
        on_stage(if result.is_ok() {
            ProcessingStage::Completed
        } else {
            ProcessingStage::Failed
        });
        result
    }

    async fn drive<F>(&self, submission: &Submission, on_stage: &mut F) -> Result<ProcessingOutcome>
    where
        F: FnMut(ProcessingStage),
    {
        let (image_folder, template) = validate(submission)?;

        on_stage(ProcessingStage::HealthCheck);
        self.engine.health().await.map_err(|e| match e {
            DeskError::UnreachableEngine(_) => e,
            other => DeskError::UnreachableEngine(other.to_string()),
        })?;

        on_stage(ProcessingStage::Submitting);
        if let Err(err) = std::fs::create_dir_all(&self.output_dir) {
            warn!(dir = %self.output_dir.display(), error = %err, "could not create output dir");
        }
        let output_path = generate_output_path_from_excel(&template, &self.output_dir);
        let request = ProcessingRequest {
            image_folder: image_folder.to_string_lossy().to_string(),
            excel_template_path: template.to_string_lossy().to_string(),
            output_excel_path: output_path.to_string_lossy().to_string(),
        };

        let result = self.engine.process_invoices(&request).await?;
        if !result.success {
            let message = if result.message.trim().is_empty() {
                "エンジンが失敗を返しました".to_string()
            } else {
                result.message.clone()
            };
            return Err(DeskError::EngineRejected(message));
        }

        let output_path = if result.excel_file_path.trim().is_empty() {
            request.output_excel_path.clone()
        } else {
            result.excel_file_path.clone()
        };
        info!(output = %output_path, processed = result.total_processed, "processing completed");

        let (registry, registry_warning) = match self.registry.add(&output_path) {
            Ok(outcome) => (Some(outcome), None),
            Err(err) => {
                warn!(error = %err, "processing succeeded but history update failed");
                (None, Some(err.to_string()))
            }
        };

        Ok(ProcessingOutcome {
            result,
            output_path,
            registry,
            registry_warning,
        })
    }
}

fn validate(submission: &Submission) -> Result<(PathBuf, PathBuf)> {
    if submission.images.is_empty() {
        return Err(DeskError::Validation("画像フォルダを選択してください".into()));
    }
    let template = submission
        .template
        .clone()
        .ok_or_else(|| DeskError::Validation("Excelテンプレートを選択してください".into()))?;
    let image_folder = common_parent(&submission.images)
        .ok_or_else(|| DeskError::Validation("画像の親フォルダを特定できません".into()))?;
    Ok((image_folder, template))
}
