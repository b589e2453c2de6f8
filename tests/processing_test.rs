//! 処理ライフサイクルのテスト
//!
//! 通信の有無と順序を、呼び出し回数を数えるエンジンで検証

use async_trait::async_trait;
use invoice_ai_common::{ProcessingRequest, ProcessingResult};
use invoice_ai_desk::engine::EngineApi;
use invoice_ai_desk::error::{DeskError, Result};
use invoice_ai_desk::processing::{ProcessingClient, ProcessingStage, Submission};
use invoice_ai_desk::registry::{AddOutcome, RegistryService};
use invoice_ai_desk::session::{NoticeLevel, SessionController};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

#[derive(Clone)]
enum Reply {
    Result(ProcessingResult),
    Reject(String),
}

#[derive(Clone)]
struct ScriptedEngine {
    healthy: bool,
    reply: Reply,
    health_calls: Arc<AtomicUsize>,
    process_calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<ProcessingRequest>>>,
}

impl ScriptedEngine {
    fn new(healthy: bool, reply: Reply) -> Self {
        Self {
            healthy,
            reply,
            health_calls: Arc::new(AtomicUsize::new(0)),
            process_calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    fn succeeding(output: &str) -> Self {
        Self::new(
            true,
            Reply::Result(ProcessingResult {
                success: true,
                message: "Processing completed successfully".into(),
                total_processed: 2,
                successful_extractions: 2,
                excel_file_path: output.into(),
                ..Default::default()
            }),
        )
    }

    fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    fn process_calls(&self) -> usize {
        self.process_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineApi for ScriptedEngine {
    async fn health(&self) -> Result<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy {
            Ok(())
        } else {
            Err(DeskError::UnreachableEngine("connection refused".into()))
        }
    }

    async fn process_invoices(&self, request: &ProcessingRequest) -> Result<ProcessingResult> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.reply {
            Reply::Result(result) => Ok(result.clone()),
            Reply::Reject(detail) => Err(DeskError::EngineRejected(detail.clone())),
        }
    }
}

struct Fixture {
    dir: TempDir,
    registry: RegistryService,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        let registry = RegistryService::new(dir.path().join("data").join("file_path.json"));
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images").join("inv1.jpg"), b"img").unwrap();
        std::fs::write(dir.path().join("images").join("inv2.png"), b"img").unwrap();
        std::fs::write(dir.path().join("template.xlsx"), b"xlsx").unwrap();
        Self { dir, registry }
    }

    fn images_dir(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    fn template(&self) -> PathBuf {
        self.dir.path().join("template.xlsx")
    }

    fn client(&self, engine: ScriptedEngine) -> ProcessingClient<ScriptedEngine> {
        ProcessingClient::new(engine, self.registry.clone(), self.dir.path().join("output"))
    }

    fn ready_controller(&self) -> SessionController {
        let mut controller = SessionController::new(self.registry.clone());
        controller.select_image_folder(&self.images_dir()).unwrap();
        controller.select_template(&self.template()).unwrap();
        controller
    }
}

/// 画像未選択なら通信しない
#[tokio::test]
async fn test_no_images_no_network() {
    let fx = Fixture::new();
    let engine = ScriptedEngine::succeeding("/out/a.xlsx");
    let client = fx.client(engine.clone());

    let mut controller = SessionController::new(fx.registry.clone());
    controller.select_template(&fx.template()).unwrap();
    assert!(!controller.can_submit());

    let err = controller.submit(&client).await.unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)));
    assert_eq!(engine.health_calls(), 0);
    assert_eq!(engine.process_calls(), 0);
    assert!(!controller.is_submitting());
}

/// クライアント単体でも入力不足は通信前に弾く
#[tokio::test]
async fn test_client_validation_before_health() {
    let fx = Fixture::new();
    let engine = ScriptedEngine::succeeding("/out/a.xlsx");
    let client = fx.client(engine.clone());

    let err = client.run(&Submission::default()).await.unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)));
    assert_eq!(engine.health_calls(), 0);
}

/// 生存確認に失敗したら処理依頼は送らない
#[tokio::test]
async fn test_failed_health_skips_submission() {
    let fx = Fixture::new();
    let engine = ScriptedEngine::new(false, Reply::Reject("unused".into()));
    let client = fx.client(engine.clone());
    let mut controller = fx.ready_controller();

    let err = controller.submit(&client).await.unwrap_err();
    assert!(matches!(err, DeskError::UnreachableEngine(_)));
    assert_eq!(engine.health_calls(), 1);
    assert_eq!(engine.process_calls(), 0);

    // 選択はそのまま、再送可能
    assert!(controller.can_submit());
    assert_eq!(controller.selected_images().len(), 2);
    assert!(controller.notices().has_level(NoticeLevel::Error));
}

/// 段階の遷移
#[tokio::test]
async fn test_stage_sequence() {
    let fx = Fixture::new();
    let client = fx.client(ScriptedEngine::succeeding("/out/a.xlsx"));
    let submission = Submission {
        images: vec![fx.images_dir().join("inv1.jpg")],
        template: Some(fx.template()),
    };

    let mut stages = Vec::new();
    client
        .run_with_progress(&submission, |s| stages.push(s))
        .await
        .unwrap();
    assert_eq!(
        stages,
        vec![
            ProcessingStage::Idle,
            ProcessingStage::HealthCheck,
            ProcessingStage::Submitting,
            ProcessingStage::Completed,
        ]
    );
}

/// 送信内容とエンジンが返したパスの採用
#[tokio::test]
async fn test_success_records_engine_path() {
    let fx = Fixture::new();
    let engine = ScriptedEngine::succeeding(r"C:\engine\out\template_final.xlsx");
    let client = fx.client(engine.clone());
    let mut controller = fx.ready_controller();

    let outcome = controller.submit(&client).await.unwrap();
    assert_eq!(outcome.registry, Some(AddOutcome::Added));
    assert!(outcome.registry_warning.is_none());

    let request = engine.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(PathBuf::from(&request.image_folder), fx.images_dir());
    assert_eq!(PathBuf::from(&request.excel_template_path), fx.template());
    let sent = PathBuf::from(&request.output_excel_path);
    let sent_name = sent.file_name().unwrap().to_string_lossy().to_string();
    assert!(sent_name.starts_with("template_"));
    assert!(sent_name.ends_with(".xlsx"));

    let records = fx.registry.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_path, "C:/engine/out/template_final.xlsx");

    let rows = controller.generated_files();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sequential_id, 1);
    assert_eq!(rows[0].display_name, "template_final.xlsx");
    assert!(controller.notices().has_level(NoticeLevel::Success));
    assert!(!controller.is_submitting());
}

/// エンジンがパスを返さなければ送ったパスを使う
#[tokio::test]
async fn test_success_without_path_uses_generated() {
    let fx = Fixture::new();
    let engine = ScriptedEngine::succeeding("");
    let client = fx.client(engine.clone());
    let mut controller = fx.ready_controller();

    let outcome = controller.submit(&client).await.unwrap();
    let request = engine.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(outcome.output_path, request.output_excel_path);
}

/// 論理的失敗（success=false）はHTTP成功でもEngineRejected
#[tokio::test]
async fn test_logical_failure_is_rejected() {
    let fx = Fixture::new();
    let engine = ScriptedEngine::new(
        true,
        Reply::Result(ProcessingResult {
            success: false,
            message: "No valid invoices could be processed".into(),
            ..Default::default()
        }),
    );
    let client = fx.client(engine.clone());
    let mut controller = fx.ready_controller();

    let err = controller.submit(&client).await.unwrap_err();
    match err {
        DeskError::EngineRejected(message) => assert!(message.contains("No valid invoices")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(fx.registry.list().unwrap().is_empty());
    assert!(controller.generated_files().is_empty());
    assert!(controller.can_submit());
}

/// エンジンの拒否（HTTPエラー）
#[tokio::test]
async fn test_engine_rejection() {
    let fx = Fixture::new();
    let engine = ScriptedEngine::new(true, Reply::Reject("Image folder not found".into()));
    let client = fx.client(engine.clone());
    let mut controller = fx.ready_controller();

    let err = controller.submit(&client).await.unwrap_err();
    assert!(matches!(err, DeskError::EngineRejected(_)));
    assert_eq!(engine.process_calls(), 1);
}

/// 履歴への追加に失敗しても処理は成功、警告が別に出る
#[tokio::test]
async fn test_registry_failure_is_secondary_warning() {
    let fx = Fixture::new();
    let blocker = fx.dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not a folder").unwrap();
    let broken_registry = RegistryService::new(blocker.join("file_path.json"));

    let engine = ScriptedEngine::succeeding("/out/a.xlsx");
    let client = ProcessingClient::new(engine, broken_registry.clone(), fx.dir.path().join("output"));

    let mut controller = SessionController::new(broken_registry);
    controller.select_image_folder(&fx.images_dir()).unwrap();
    controller.select_template(&fx.template()).unwrap();

    let outcome = controller.submit(&client).await.unwrap();
    assert!(outcome.result.success);
    assert!(outcome.registry.is_none());
    assert!(outcome.registry_warning.is_some());

    assert!(controller.notices().has_level(NoticeLevel::Success));
    assert!(controller.notices().has_level(NoticeLevel::Warning));
    assert_eq!(controller.generated_files().len(), 1);
}

/// 同じ出力パスが再度返っても一覧は重複しない
#[tokio::test]
async fn test_repeated_output_not_duplicated() {
    let fx = Fixture::new();
    let client = fx.client(ScriptedEngine::succeeding("/out/same.xlsx"));
    let mut controller = fx.ready_controller();

    controller.submit(&client).await.unwrap();
    let second = controller.submit(&client).await.unwrap();

    assert_eq!(second.registry, Some(AddOutcome::AlreadyPresent));
    assert_eq!(controller.generated_files().len(), 1);
    assert_eq!(fx.registry.list().unwrap().len(), 1);
}

/// 履歴に追加できなかった場合も同じ出力パスの行は1つ
#[tokio::test]
async fn test_repeated_output_not_duplicated_without_registry() {
    let fx = Fixture::new();
    let blocker = fx.dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not a folder").unwrap();
    let broken_registry = RegistryService::new(blocker.join("file_path.json"));

    let engine = ScriptedEngine::succeeding("/out/same.xlsx");
    let client = ProcessingClient::new(engine, broken_registry.clone(), fx.dir.path().join("output"));
    let mut controller = SessionController::new(broken_registry);
    controller.select_image_folder(&fx.images_dir()).unwrap();
    controller.select_template(&fx.template()).unwrap();

    let first = controller.submit(&client).await.unwrap();
    let second = controller.submit(&client).await.unwrap();

    assert!(first.registry.is_none());
    assert!(second.registry.is_none());
    assert_eq!(controller.generated_files().len(), 1);
    assert_eq!(controller.generated_files()[0].sequential_id, 1);
}

/// 処理中は二重送信できない
#[test]
fn test_begin_submission_guards_reentry() {
    let fx = Fixture::new();
    let mut controller = fx.ready_controller();

    controller.begin_submission().unwrap();
    assert!(controller.is_submitting());
    assert!(!controller.can_submit());
    assert!(matches!(controller.begin_submission(), Err(DeskError::Validation(_))));

    controller.finish_submission(&Err(DeskError::UnreachableEngine("down".into())));
    assert!(controller.can_submit());
}
