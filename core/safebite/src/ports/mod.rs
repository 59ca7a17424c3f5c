//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI）がアプリを呼び出すインターフェース
//! - outbound: アプリが外界（結果ストア・画像読み込み）を使うための trait

pub mod inbound;
pub mod outbound;
