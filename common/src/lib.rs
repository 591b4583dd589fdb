//! Prover Registry Common
//!
//! レジストリサーバーと周辺ツールで共有する型定義

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// 通信プロトコル定義
pub mod protocol;

/// 共通型定義
pub mod types;
