use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "invoice-desk")]
#[command(about = "請求書画像とExcelテンプレートを処理エンジンに送り、生成ファイルを管理する", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 履歴ファイル（省略時は設定値）
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像フォルダとテンプレートを処理エンジンに送る
    Process {
        /// 請求書画像のフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// Excelテンプレート（.xlsx/.xls）
        #[arg(short, long)]
        template: PathBuf,

        /// 出力フォルダ（省略時は設定値）
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// 生成後にファイルを開く
        #[arg(long)]
        open: bool,
    },

    /// 生成ファイル履歴
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// 処理エンジンの生存確認
    Health,

    /// ファイル（またはそのフォルダ）を開く
    Open {
        #[arg(required = true)]
        path: PathBuf,

        /// 含まれるフォルダを開く
        #[arg(long)]
        folder: bool,
    },

    /// テンプレートのシート一覧を表示
    Template {
        #[arg(required = true)]
        path: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// エンジンのURLを設定
        #[arg(long)]
        set_engine_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// 一覧（新しい順）
    List,

    /// 手動で追加
    Add {
        #[arg(required = true)]
        path: String,
    },

    /// 履歴から削除（ファイル自体は消さない）
    Remove {
        #[arg(required = true)]
        path: String,

        /// フルパス一致のみ（ファイル名だけの一致では消さない）
        #[arg(long)]
        exact: bool,

        /// 複数件一致しても確認しない
        #[arg(short, long)]
        yes: bool,
    },
}
