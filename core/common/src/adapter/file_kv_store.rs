//! ディレクトリ配下に 1 キー 1 ファイル（<key>.json）で保存する KeyValueStore 実装
//!
//! 全キー合計のバイト数に上限（quota）を持ち、超える書き込みは Error::QuotaExceeded で拒否する。
//! 書き込みは一時ファイル → rename で置き換える。

use crate::error::Error;
use crate::ports::outbound::{FileSystem, KeyValueStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 既定の容量上限（5 MiB）
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

const VALUE_EXT: &str = "json";

/// ファイルベースの KeyValueStore
pub struct FileKvStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    quota_bytes: u64,
}

impl FileKvStore {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl AsRef<Path>, quota_bytes: u64) -> Self {
        Self {
            fs,
            dir: dir.as_ref().to_path_buf(),
            quota_bytes,
        }
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, Error> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, VALUE_EXT)))
    }

    /// key 以外の値ファイルの合計サイズ
    fn used_bytes_excluding(&self, path: &Path) -> Result<u64, Error> {
        if !self.fs.exists(&self.dir) {
            return Ok(0);
        }
        let mut total = 0;
        for entry in self.fs.read_dir(&self.dir)? {
            if entry.as_path() == path {
                continue;
            }
            if entry.extension().and_then(|e| e.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            total += self.fs.metadata(&entry).map(|m| m.len()).unwrap_or(0);
        }
        Ok(total)
    }
}

/// キーはファイル名に使うため英数字と `_` `-` のみ許可する
fn validate_key(key: &str) -> Result<(), Error> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!("invalid storage key: {:?}", key)))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.value_path(key)?;
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        self.fs.read_to_string(&path).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.value_path(key)?;
        let needed = self.used_bytes_excluding(&path)? + value.len() as u64;
        if needed > self.quota_bytes {
            return Err(Error::quota_exceeded(format!(
                "storage quota exceeded writing '{}': {} > {} bytes",
                key, needed, self.quota_bytes
            )));
        }
        self.fs.create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{}.tmp", key));
        self.fs.write(&tmp, value)?;
        self.fs.rename(&tmp, &path)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let path = self.value_path(key)?;
        if self.fs.exists(&path) {
            self.fs.remove_file(&path)?;
        }
        Ok(())
    }
}
