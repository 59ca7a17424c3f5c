//! SafeBite 共通ライブラリ
//!
//! `safebite` コマンドが使う、UI に依存しない機能を提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（Newtype）
pub mod domain;

/// config.json の読み込み
pub mod config;

/// LLMドライバーとプロバイダ
pub mod llm;

/// ポート（Outbound trait）
pub mod ports;

/// 標準アダプター（Std*）とテスト用実装
pub mod adapter;
