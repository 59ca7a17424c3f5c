//! safebite コマンドの enum（Command Pattern）
//!
//! サブコマンドごとの分岐を enum で明示する。

use crate::domain::{Category, HistoryFilter, PreferencesUpdate};
use common::domain::RecordId;
use std::path::PathBuf;

/// safebite の実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum SafebiteCommand {
    /// ヘルプ表示
    Help,
    /// 画像を解析して保存し、レポートを表示
    Scan {
        image: PathBuf,
        category: Category,
        notes: Option<String>,
    },
    /// 症状・特徴のテキスト記述を解析して保存し、レポートを表示
    Describe {
        description: String,
        category: Category,
    },
    /// 保存済みレコードの一覧（新しい順）
    History { filter: HistoryFilter },
    Show { id: RecordId },
    Delete { id: RecordId },
    /// 設定の表示（update が空）または更新
    Settings { update: PreferencesUpdate },
    Categories,
}

impl SafebiteCommand {
    /// ログ用のコマンド名
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Scan { .. } => "scan",
            Self::Describe { .. } => "describe",
            Self::History { .. } => "history",
            Self::Show { .. } => "show",
            Self::Delete { .. } => "delete",
            Self::Settings { .. } => "settings",
            Self::Categories => "categories",
        }
    }
}
