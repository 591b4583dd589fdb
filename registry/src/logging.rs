//! ロギング初期化
//!
//! `PROVER_REGISTRY_LOG_LEVEL`（未設定なら`RUST_LOG`）でフィルタを決め、標準出力へ出す。
//! `PROVER_REGISTRY_LOG_DIR`が設定されていれば日次ローテーションのファイルにも書き出す。

use crate::config::get_env_with_fallback;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "prover-registry.log";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人間向け
    Pretty,
    /// JSON Lines
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match get_env_with_fallback("PROVER_REGISTRY_LOG_FORMAT", "LOG_FORMAT")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

fn build_filter(level: Option<String>) -> EnvFilter {
    level
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// ロギングを初期化する
///
/// 返り値のガードはファイル出力のフラッシュに必要なので、プロセス終了まで保持すること。
pub fn init() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let filter = build_filter(get_env_with_fallback("PROVER_REGISTRY_LOG_LEVEL", "RUST_LOG"));
    let format = LogFormat::from_env();

    let stdout_layer = match format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Pretty => fmt::layer().with_target(false).boxed(),
    };

    let (file_layer, guard) = match std::env::var("PROVER_REGISTRY_LOG_DIR") {
        Ok(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
