//! プロセス内メモリの KeyValueStore 実装（テスト用）
//!
//! FileKvStore と同じく全キー合計バイト数の quota を持つ。
//! 読み書きの失敗を再現するための `fail_reads` / `fail_writes` も持つ。

use crate::error::Error;
use crate::ports::outbound::KeyValueStore;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<u64>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    rejected_writes: AtomicUsize,
}

impl MemoryKvStore {
    /// 容量無制限
    pub fn new() -> Self {
        Self::default()
    }

    /// 全キー合計 quota_bytes までのストア
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// true にすると以後の get が I/O エラーになる
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// true にすると以後の set が I/O エラーになる（quota とは別扱い）
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// quota で拒否された set の回数
    pub fn rejected_writes(&self) -> usize {
        self.rejected_writes.load(Ordering::SeqCst)
    }

    /// 保存済みの生の値（テストでの検証用）
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().ok().and_then(|v| v.get(key).cloned())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::io_msg(format!("read of '{}' failed", key)));
        }
        let values = self
            .values
            .lock()
            .map_err(|_| Error::system("kv store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::io_msg(format!("write of '{}' failed", key)));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::system("kv store poisoned"))?;
        if let Some(quota) = self.quota_bytes {
            let others: u64 = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len() as u64)
                .sum();
            let needed = others + value.len() as u64;
            if needed > quota {
                self.rejected_writes.fetch_add(1, Ordering::SeqCst);
                return Err(Error::quota_exceeded(format!(
                    "storage quota exceeded writing '{}': {} > {} bytes",
                    key, needed, quota
                )));
            }
        }
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.values
            .lock()
            .map_err(|_| Error::system("kv store poisoned"))?
            .remove(key);
        Ok(())
    }
}
