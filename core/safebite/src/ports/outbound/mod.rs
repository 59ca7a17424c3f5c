//! Outbound ポート: アプリが外界（結果ストア・画像読み込み）を使うための trait
//!
//! FS・時刻・ID・KV ストア・LLM・ログのポートは common::ports::outbound にある。

pub mod image_loader;
pub mod result_repository;

pub use image_loader::{ImageLoader, ImagePayload};
pub use result_repository::{ResultRepository, SaveReport, SaveStage};
