//! KeyValueStore 上の ResultRepository 実装
//!
//! 一覧は `safebite_history`、設定は `safebite_settings` に JSON で丸ごと置く（バージョン管理なし）。
//! 容量超過時の保存は次の順に段階を落とす:
//! Full → Truncated（新しい 20 件）→ WithoutImage（新レコードの画像を外す）→ Dropped（ログのみ）

use crate::domain::{AnalysisRecord, UserPreferences};
use crate::ports::outbound::{ResultRepository, SaveReport, SaveStage};
use common::error::Error;
use common::ports::outbound::{KeyValueStore, Log, LogLevel, LogRecord};
use std::sync::Arc;

pub const HISTORY_KEY: &str = "safebite_history";
pub const SETTINGS_KEY: &str = "safebite_settings";

/// 切り詰め段階で残す件数
pub const TRUNCATE_TO: usize = 20;

pub struct KvResultStore {
    kv: Arc<dyn KeyValueStore>,
    log: Arc<dyn Log>,
}

impl KvResultStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, log: Arc<dyn Log>) -> Self {
        Self { kv, log }
    }

    fn read_history(&self) -> Result<Vec<AnalysisRecord>, Error> {
        match self.kv.get(HISTORY_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::json(format!("Failed to decode {}: {}", HISTORY_KEY, e))),
        }
    }

    fn write_history(&self, records: &[AnalysisRecord]) -> Result<(), Error> {
        let raw = serde_json::to_string(records)
            .map_err(|e| Error::json(format!("Failed to encode {}: {}", HISTORY_KEY, e)))?;
        self.kv.set(HISTORY_KEY, &raw)
    }

    fn warn(&self, record: LogRecord) {
        let _ = self.log.log(&record.layer("adapter").kind("storage"));
    }
}

/// 書き込みが拒否されたときの次の段階。None なら諦める
fn next_stage(stage: SaveStage, err: &Error, candidate: &[AnalysisRecord]) -> Option<SaveStage> {
    if !matches!(err, Error::QuotaExceeded(_)) {
        return None;
    }
    let can_strip_image = candidate.first().map_or(false, |r| r.has_image());
    match stage {
        SaveStage::Full if candidate.len() > TRUNCATE_TO => Some(SaveStage::Truncated),
        SaveStage::Full | SaveStage::Truncated if can_strip_image => Some(SaveStage::WithoutImage),
        _ => None,
    }
}

impl ResultRepository for KvResultStore {
    fn list_all(&self) -> Vec<AnalysisRecord> {
        match self.read_history() {
            Ok(records) => records,
            Err(e) => {
                self.warn(
                    LogRecord::new(LogLevel::Warn, "failed to load history")
                        .field("error", e.to_string()),
                );
                Vec::new()
            }
        }
    }

    fn get(&self, id: &str) -> Option<AnalysisRecord> {
        self.list_all().into_iter().find(|r| r.id.as_str() == id)
    }

    fn save(&self, record: AnalysisRecord) -> SaveReport {
        let history = self.list_all();
        if history.iter().any(|r| r.id == record.id) {
            return SaveReport {
                stage: SaveStage::AlreadyPresent,
                records: history,
            };
        }

        let mut candidate = Vec::with_capacity(history.len() + 1);
        candidate.push(record);
        candidate.extend(history);

        let mut stage = SaveStage::Full;
        loop {
            let err = match self.write_history(&candidate) {
                Ok(()) => {
                    if stage != SaveStage::Full {
                        self.warn(
                            LogRecord::new(LogLevel::Warn, "history saved in degraded form")
                                .field("stage", stage.as_str())
                                .field("records", candidate.len()),
                        );
                    }
                    return SaveReport {
                        stage,
                        records: candidate,
                    };
                }
                Err(e) => e,
            };

            match next_stage(stage, &err, &candidate) {
                Some(next) => {
                    self.warn(
                        LogRecord::new(LogLevel::Warn, "history write rejected")
                            .field("stage", stage.as_str())
                            .field("next", next.as_str())
                            .field("error", err.to_string()),
                    );
                    candidate.truncate(TRUNCATE_TO);
                    if next == SaveStage::WithoutImage {
                        if let Some(first) = candidate.first_mut() {
                            *first = first.without_image();
                        }
                    }
                    stage = next;
                }
                None => {
                    self.warn(
                        LogRecord::new(LogLevel::Error, "failed to save result")
                            .field("stage", stage.as_str())
                            .field("id", candidate.first().map(|r| r.id.to_string()).unwrap_or_default())
                            .field("error", err.to_string()),
                    );
                    return SaveReport {
                        stage: SaveStage::Dropped,
                        records: self.list_all(),
                    };
                }
            }
        }
    }

    fn delete(&self, id: &str) -> Vec<AnalysisRecord> {
        let history = self.list_all();
        if !history.iter().any(|r| r.id.as_str() == id) {
            return history;
        }
        let updated: Vec<AnalysisRecord> = history
            .into_iter()
            .filter(|r| r.id.as_str() != id)
            .collect();
        match self.write_history(&updated) {
            Ok(()) => updated,
            Err(e) => {
                self.warn(
                    LogRecord::new(LogLevel::Error, "failed to delete result")
                        .field("id", id)
                        .field("error", e.to_string()),
                );
                self.list_all()
            }
        }
    }

    fn get_preferences(&self) -> UserPreferences {
        let raw = match self.kv.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return UserPreferences::default(),
            Err(e) => {
                self.warn(
                    LogRecord::new(LogLevel::Warn, "failed to load settings")
                        .field("error", e.to_string()),
                );
                return UserPreferences::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            self.warn(
                LogRecord::new(LogLevel::Warn, "stored settings are unreadable; using defaults")
                    .field("error", e.to_string()),
            );
            UserPreferences::default()
        })
    }

    fn save_preferences(&self, prefs: &UserPreferences) {
        let result = serde_json::to_string(prefs)
            .map_err(|e| Error::json(e.to_string()))
            .and_then(|raw| self.kv.set(SETTINGS_KEY, &raw));
        if let Err(e) = result {
            self.warn(
                LogRecord::new(LogLevel::Error, "failed to save settings")
                    .field("error", e.to_string()),
            );
        }
    }
}
