use std::path::PathBuf;
use std::sync::mpsc::Sender;

use image::ImageReader;
use invoice_ai_desk::error::DeskError;
use invoice_ai_desk::processing::Submission;
use invoice_ai_desk::registry::RegistryService;
use invoice_ai_desk::scanner::scan_folder;
use invoice_ai_desk::template::inspect_template;
use invoice_ai_desk::{HttpEngine, ProcessingClient};

use crate::model::{PickMessage, ThumbData, UiMessage};

/// 処理をワーカースレッドで実行し、段階と結果をチャネルで返す
pub fn spawn_processing(
    engine_url: String,
    registry: RegistryService,
    output_dir: PathBuf,
    submission: Submission,
    tx: Sender<UiMessage>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(err) => {
                let _ = tx.send(UiMessage::Done(Err(DeskError::Io(err))));
                return;
            }
        };

        let client = ProcessingClient::new(HttpEngine::new(engine_url), registry, output_dir);
        let result = runtime.block_on(client.run_with_progress(&submission, |stage| {
            let _ = tx.send(UiMessage::Stage(stage));
        }));
        let _ = tx.send(UiMessage::Done(result));
    });
}

/// 画像フォルダを走査する
pub fn spawn_folder_scan(folder: PathBuf, tx: Sender<PickMessage>) {
    std::thread::spawn(move || {
        let _ = tx.send(PickMessage::FolderScanned(scan_folder(&folder)));
    });
}

/// テンプレートのシート一覧を読む
pub fn spawn_template_inspect(path: PathBuf, tx: Sender<PickMessage>) {
    std::thread::spawn(move || {
        let summary = inspect_template(&path);
        let _ = tx.send(PickMessage::TemplateInspected { path, summary });
    });
}

/// 選択画像のサムネイルを読み込む（失敗時はサイズ0で返す）
pub fn spawn_thumbnail(path: String, tx: Sender<ThumbData>) {
    std::thread::spawn(move || {
        let image = ImageReader::open(&path)
            .ok()
            .and_then(|r| r.with_guessed_format().ok())
            .and_then(|r| r.decode().ok());
        let message = match image {
            Some(image) => {
                let thumb = image.thumbnail(160, 120);
                ThumbData {
                    path,
                    size: [thumb.width() as usize, thumb.height() as usize],
                    pixels: thumb.to_rgba8().into_raw(),
                }
            }
            None => ThumbData {
                path,
                size: [0, 0],
                pixels: Vec::new(),
            },
        };
        let _ = tx.send(message);
    });
}
