//! キー・バリューストア Outbound ポート
//!
//! 同期・永続・容量上限ありの単純なストア。複数キーにまたがるトランザクションは無い。

use crate::error::Error;

/// キー・バリューストア抽象（Outbound ポート）
///
/// 実装は `common::adapter::FileKvStore`（ディレクトリ配下に 1 キー 1 ファイル）や
/// `common::adapter::MemoryKvStore`（テスト用）など。
pub trait KeyValueStore: Send + Sync {
    /// 値を読む。キーが無ければ Ok(None)。
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// 値を丸ごと書き換える。容量上限を超える場合は Error::QuotaExceeded を返し、既存の値は変えない。
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// キーを削除する。無いキーは何もしない。
    fn remove(&self, key: &str) -> Result<(), Error>;
}
