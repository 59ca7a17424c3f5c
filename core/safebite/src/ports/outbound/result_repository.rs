//! 解析結果ストアの Outbound ポート
//!
//! 保存・削除はどれも「全件読み込み → 変更 → 全件書き込み」。ロックは無い。
//! 保存失敗は呼び出し元へエラーとして返さず、SaveReport の stage で表す。

use crate::domain::{AnalysisRecord, UserPreferences};

/// save がどの段階で終わったか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStage {
    /// 同じ ID が既にある（何も書かない）
    AlreadyPresent,
    /// 全件そのまま書けた
    Full,
    /// 新しい 20 件に切り詰めて書けた
    Truncated,
    /// 新しいレコードの画像を外して書けた
    WithoutImage,
    /// どの段階でも書けなかった（ログのみ）
    Dropped,
}

impl SaveStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyPresent => "already_present",
            Self::Full => "full",
            Self::Truncated => "truncated",
            Self::WithoutImage => "without_image",
            Self::Dropped => "dropped",
        }
    }
}

/// save の結果
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub stage: SaveStage,
    /// 保存後に永続化されている一覧（新しい順）
    pub records: Vec<AnalysisRecord>,
}

/// 解析結果と設定のストア
pub trait ResultRepository: Send + Sync {
    /// 新しい順。読めない・壊れている場合は空
    fn list_all(&self) -> Vec<AnalysisRecord>;

    fn get(&self, id: &str) -> Option<AnalysisRecord>;

    /// 先頭に追加して全件を書く。同じ ID があれば何もしない
    fn save(&self, record: AnalysisRecord) -> SaveReport;

    /// 削除後の一覧を返す。無い ID なら書き込まずにそのまま返す
    fn delete(&self, id: &str) -> Vec<AnalysisRecord>;

    /// 未保存・読めない場合はデフォルト
    fn get_preferences(&self) -> UserPreferences;

    /// 丸ごと書く。失敗はログのみ
    fn save_preferences(&self, prefs: &UserPreferences);
}
