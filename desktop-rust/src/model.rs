use std::path::PathBuf;

use invoice_ai_common::FileInfo;
use invoice_ai_desk::error::Result;
use invoice_ai_desk::processing::{ProcessingOutcome, ProcessingStage};
use invoice_ai_desk::template::TemplateSummary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Upload,
    Generated,
}

pub enum UiMessage {
    Stage(ProcessingStage),
    Done(Result<ProcessingOutcome>),
}

/// フォルダ走査・テンプレート確認の結果
pub enum PickMessage {
    FolderScanned(Result<Vec<FileInfo>>),
    TemplateInspected {
        path: PathBuf,
        summary: Result<TemplateSummary>,
    },
}

pub struct ThumbData {
    pub path: String,
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}
