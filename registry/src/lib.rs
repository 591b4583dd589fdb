//! Prover Registry Server
//!
//! プロバーエンドポイントを登録し、ネットワークごとに有効なプロバー一覧を
//! キャッシュ経由で配信するサーバー

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// キャッシュストア（メモリ / SQLite）
pub mod cache;

/// CLIインターフェース
pub mod cli;

/// 環境変数からの設定読み込み
pub mod config;

/// データベースアクセス
pub mod db;

/// 名前空間ごとのロック
pub mod locks;

/// ロギング初期化
pub mod logging;

/// プロバーの`/status`プローブ
pub mod probe;

/// 有効プロバーの提供と登録
pub mod provers;

/// キャッシュのフルリフレッシュ
pub mod refresh;

/// サーバー起動とシャットダウン
pub mod server;

/// 協調シャットダウン
pub mod shutdown;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// プロバーサービス
    pub provers: provers::ProverService,
    /// 静的ファイルの配信ディレクトリ
    pub public_dir: std::path::PathBuf,
    /// シャットダウン制御
    pub shutdown: shutdown::ShutdownController,
}
