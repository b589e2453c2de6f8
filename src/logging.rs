//! tracingの初期化
//!
//! 画面向けの進捗表示はprintln!、こちらは診断用ログ。

use tracing_subscriber::EnvFilter;

/// ログレベルを指定する環境変数
pub const LOG_ENV: &str = "INVOICE_DESK_LOG";

pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    // テストなどで二重初期化されても落とさない
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
