//! 画面の状態管理（アップロードフォームと生成ファイル一覧）
//!
//! 選択状態は永続化しない。生成ファイル一覧だけが履歴ファイルと同期する。

mod notice;
mod view;

pub use notice::{NoticeLevel, Notification, Notifications, DEFAULT_NOTICE_TTL};
pub use view::{build_row, renumber, row_key, rows_from_records, timestamp_label, GeneratedFileRow, RowAction};

use crate::engine::EngineApi;
use crate::error::{DeskError, Result};
use crate::opener;
use crate::processing::{ProcessingClient, ProcessingOutcome, Submission};
use crate::registry::{MatchMode, RegistryService};
use crate::scanner::{self, common_parent};
use chrono::Local;
use invoice_ai_common::{normalize_path, FileInfo};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SessionController {
    registry: RegistryService,
    selected_images: Vec<FileInfo>,
    image_folder: Option<PathBuf>,
    template: Option<FileInfo>,
    generated: Vec<GeneratedFileRow>,
    submitting: bool,
    notices: Notifications,
}

impl SessionController {
    pub fn new(registry: RegistryService) -> Self {
        Self {
            registry,
            selected_images: Vec::new(),
            image_folder: None,
            template: None,
            generated: Vec::new(),
            submitting: false,
            notices: Notifications::default(),
        }
    }

    pub fn registry(&self) -> &RegistryService {
        &self.registry
    }

    pub fn selected_images(&self) -> &[FileInfo] {
        &self.selected_images
    }

    pub fn image_folder(&self) -> Option<&Path> {
        self.image_folder.as_deref()
    }

    pub fn template(&self) -> Option<&FileInfo> {
        self.template.as_ref()
    }

    pub fn generated_files(&self) -> &[GeneratedFileRow] {
        &self.generated
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn notices(&self) -> &Notifications {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notifications {
        &mut self.notices
    }

    /// 送信ボタンを押せるか
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.selected_images.is_empty() && self.template.is_some()
    }

    /// フォルダを選んだとき。画像一覧を丸ごと置き換える。
    pub fn select_image_folder(&mut self, folder: &Path) -> Result<usize> {
        self.apply_folder_scan(scanner::scan_folder(folder))
    }

    /// 別スレッドで走査した結果を反映する
    ///
    /// 走査に失敗した場合も以前の選択は残さない。
    pub fn apply_folder_scan(&mut self, scanned: Result<Vec<FileInfo>>) -> Result<usize> {
        match scanned {
            Ok(files) => self.apply_images(scanner::validate_image_files(&files)),
            Err(err) => {
                self.clear_images();
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    /// 画像パスの一覧を選択として設定する
    ///
    /// 許可された拡張子のものだけ残す。残りが0件ならエラーで、選択は空になる。
    pub fn select_images(&mut self, paths: Vec<PathBuf>) -> Result<usize> {
        let files: Vec<FileInfo> = paths.iter().map(|p| scanner::image_info(p)).collect();
        self.apply_images(scanner::validate_image_files(&files))
    }

    fn apply_images(&mut self, valid: Vec<FileInfo>) -> Result<usize> {
        if valid.is_empty() {
            self.clear_images();
            let err = DeskError::Validation(
                "有効な画像（jpg/jpeg/png/gif）がありません。画像の選択を解除しました".into(),
            );
            self.notices.error(err.to_string());
            return Err(err);
        }

        let kept: Vec<PathBuf> = valid.iter().map(|f| PathBuf::from(&f.path)).collect();
        self.image_folder = common_parent(&kept);
        self.selected_images = valid;
        debug!(count = self.selected_images.len(), folder = ?self.image_folder, "images selected");
        self.notices
            .info(format!("{}枚の画像を選択しました", self.selected_images.len()));
        Ok(self.selected_images.len())
    }

    fn clear_images(&mut self) {
        self.selected_images.clear();
        self.image_folder = None;
    }

    /// テンプレートを選んだとき
    pub fn select_template(&mut self, path: &Path) -> Result<()> {
        let info = scanner::excel_info(path);
        if !scanner::validate_excel_file(Some(&info)) {
            let err = DeskError::Validation(format!(
                "Excelファイル（.xlsx/.xls）を選択してください: {}",
                path.display()
            ));
            self.notices.error(err.to_string());
            return Err(err);
        }
        self.notices.info(format!("テンプレート: {}", info.name));
        self.template = Some(info);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.clear_images();
        self.template = None;
    }

    /// 送信を開始する。入力不足や処理中ならエラー（通信しない）。
    pub fn begin_submission(&mut self) -> Result<Submission> {
        if self.submitting {
            return Err(DeskError::Validation("処理中です".into()));
        }
        let template = match &self.template {
            Some(t) if !self.selected_images.is_empty() => PathBuf::from(&t.path),
            _ => {
                let err = DeskError::Validation("画像フォルダとExcelテンプレートを選択してください".into());
                self.notices.error(err.to_string());
                return Err(err);
            }
        };

        self.submitting = true;
        Ok(Submission {
            images: self.selected_images.iter().map(|f| PathBuf::from(&f.path)).collect(),
            template: Some(template),
        })
    }

    /// 処理結果を反映する。成否にかかわらず操作可能な状態に戻す。
    pub fn finish_submission(&mut self, result: &Result<ProcessingOutcome>) {
        self.submitting = false;

        match result {
            Ok(outcome) => {
                self.prepend_generated(&outcome.output_path);
                self.notices.success(summary_message(outcome));
                if let Some(warning) = &outcome.registry_warning {
                    self.notices
                        .warning(format!("Excelは生成されましたが履歴に追加できませんでした: {warning}"));
                }
            }
            Err(err) => self.notices.error(err.to_string()),
        }
    }

    /// 送信から結果反映までをまとめて行う
    pub async fn submit<E: EngineApi>(&mut self, client: &ProcessingClient<E>) -> Result<ProcessingOutcome> {
        let submission = self.begin_submission()?;
        let result = client.run(&submission).await;
        self.finish_submission(&result);
        result
    }

    /// 同じパスの行は先頭へ移す（履歴追加の成否に関係なく重複させない）
    fn prepend_generated(&mut self, path: &str) {
        let key = row_key(path);
        self.generated.retain(|row| row.key != key);
        self.generated
            .insert(0, build_row(path, timestamp_label(Local::now())));
        renumber(&mut self.generated);
    }

    /// 履歴ファイルから一覧を作り直す
    pub fn load_generated_files(&mut self) -> Result<()> {
        match self.registry.list() {
            Ok(records) => {
                self.generated = rows_from_records(&records);
                Ok(())
            }
            Err(err) => {
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    /// 生成ファイルを履歴から削除する（ファイル自体は消さない）
    pub fn delete_generated(&mut self, path: &str) -> Result<usize> {
        self.delete_generated_with(path, MatchMode::Loose)
    }

    pub fn delete_generated_with(&mut self, path: &str, mode: MatchMode) -> Result<usize> {
        let removed = match self.registry.remove_with(path, mode) {
            Ok(removed) => removed,
            Err(err) => {
                self.notices.error(err.to_string());
                return Err(err);
            }
        };
        self.load_generated_files()?;
        self.notices
            .success(format!("履歴から削除しました: {}", normalize_path(path)));
        Ok(removed)
    }

    /// 行ボタンの操作を実行する
    pub fn apply(&mut self, action: RowAction) -> Result<()> {
        let result = match &action {
            RowAction::Open(path) => opener::open_file(Path::new(path)),
            RowAction::OpenFolder(path) => opener::open_containing_folder(Path::new(path)),
            RowAction::Delete(path) => return self.delete_generated(path).map(|_| ()),
        };
        if let Err(err) = &result {
            self.notices.error(err.to_string());
        }
        result
    }
}

fn summary_message(outcome: &ProcessingOutcome) -> String {
    let result = &outcome.result;
    let mut message = format!(
        "処理完了: {}件（成功 {} / 失敗 {}）",
        result.total_processed, result.successful_extractions, result.failed_extractions
    );
    if !result.new_customers_added.is_empty() {
        message.push_str(&format!("、新規顧客 {}件", result.new_customers_added.len()));
    }
    if !result.fuzzy_matches_found.is_empty() {
        message.push_str(&format!("、顧客名の補正 {}件", result.fuzzy_matches_found.len()));
    }
    message
}
