use clap::Parser;
use indicatif::ProgressBar;
use invoice_ai_desk::{cli, config, error, logging, opener, registry, session};
use invoice_ai_desk::template::inspect_template;
use invoice_ai_desk::{HttpEngine, ProcessingClient, EngineApi};
use cli::{Cli, Commands, HistoryAction};
use config::Config;
use error::{DeskError, Result};
use registry::{AddOutcome, MatchMode, RegistryService};
use session::{NoticeLevel, SessionController};
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::load()?;
    let registry_path = cli.registry.clone().unwrap_or_else(|| config.registry_path.clone());
    let registry = RegistryService::new(registry_path);

    match cli.command {
        Commands::Process { folder, template, output_dir, open } => {
            println!("🧾 invoice-desk - 請求書処理\n");

            let mut controller = SessionController::new(registry.clone());
            controller.select_image_folder(&folder)?;
            controller.select_template(&template)?;
            println!("✔ 画像 {}枚 / テンプレート {}", controller.selected_images().len(), template.display());

            let summary = inspect_template(&template)?;
            println!("✔ シート: {}\n", summary.sheet_names.join(", "));

            let output_dir = match output_dir {
                Some(dir) => dir,
                None => config.absolute_output_dir()?,
            };
            let client = ProcessingClient::new(HttpEngine::new(&config.engine_url), registry, output_dir);

            let submission = controller.begin_submission()?;
            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(120));
            let result = client
                .run_with_progress(&submission, |stage| spinner.set_message(stage.label()))
                .await;
            spinner.finish_and_clear();
            controller.finish_submission(&result);
            print_notices(&mut controller);

            let outcome = result?;
            println!("✔ 出力: {}", outcome.output_path);
            for m in &outcome.result.fuzzy_matches_found {
                println!("  {} → {} ({:.0}%)", m.original, m.matched, m.confidence * 100.0);
            }
            if open {
                opener::open_file(Path::new(&outcome.output_path))?;
            }
            println!("\n✅ 完了");
        }

        Commands::History { action } => match action {
            HistoryAction::List => {
                let mut controller = SessionController::new(registry);
                controller.load_generated_files()?;
                let rows = controller.generated_files();
                if rows.is_empty() {
                    println!("履歴はありません");
                }
                for row in rows {
                    println!("{:>3}. {}  {}  {}", row.sequential_id, row.timestamp_label, row.display_name, row.path);
                }
            }
            HistoryAction::Add { path } => match registry.add(&path)? {
                AddOutcome::Added => println!("✔ 追加しました: {}", path),
                AddOutcome::AlreadyPresent => println!("✔ 既に登録済みです: {}", path),
            },
            HistoryAction::Remove { path, exact, yes } => {
                let mode = if exact { MatchMode::Exact } else { MatchMode::Loose };
                let targets = registry.matching(&path, mode)?;
                if targets.len() > 1 && !yes {
                    println!("以下の{}件が削除されます:", targets.len());
                    for record in &targets {
                        println!("  {}", record.file_path);
                    }
                    let confirmed = dialoguer::Confirm::new()
                        .with_prompt("削除しますか？")
                        .default(false)
                        .interact()
                        .map_err(|e| DeskError::Prompt(e.to_string()))?;
                    if !confirmed {
                        println!("中止しました");
                        return Ok(());
                    }
                }
                let removed = registry.remove_with(&path, mode)?;
                println!("✔ {}件削除しました", removed);
            }
        },

        Commands::Health => {
            let engine = HttpEngine::new(&config.engine_url);
            engine.health().await?;
            println!("✔ 処理エンジン稼働中: {}", engine.base_url());
        }

        Commands::Open { path, folder } => {
            if folder {
                opener::open_containing_folder(&path)?;
            } else {
                opener::open_file(&path)?;
                if let Ok(size) = opener::file_size_label(&path) {
                    println!("✔ {} ({})", path.display(), size);
                }
            }
        }

        Commands::Template { path } => {
            let summary = inspect_template(&path)?;
            println!("{}:", summary.file_name);
            for name in &summary.sheet_names {
                println!("  - {}", name);
            }
        }

        Commands::Config { set_engine_url, show } => {
            let mut config = config;

            if let Some(url) = set_engine_url {
                config.set_engine_url(url)?;
                println!("✔ エンジンURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  エンジンURL: {}", config.engine_url);
                println!("  履歴ファイル: {}", config.registry_path.display());
                println!("  出力フォルダ: {}", config.output_dir.display());
            }
        }
    }

    Ok(())
}

fn print_notices(controller: &mut SessionController) {
    for notice in controller.notices_mut().drain() {
        let mark = match notice.level {
            NoticeLevel::Info => "-",
            NoticeLevel::Success => "✔",
            NoticeLevel::Warning => "⚠",
            NoticeLevel::Error => "✖",
        };
        println!("{} {}", mark, notice.message);
    }
}
