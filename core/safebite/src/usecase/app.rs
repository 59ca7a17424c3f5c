//! アプリケーション UseCase: 解析 → 保存、および履歴・設定の操作
//!
//! 表示は行わない（cli::render が担当）。

use crate::domain::{AnalysisRecord, Category, HistoryFilter, PreferencesUpdate, UserPreferences};
use crate::ports::outbound::{ImageLoader, ResultRepository, SaveStage};
use crate::usecase::analysis::AnalysisClient;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::path::Path;
use std::sync::Arc;

/// scan / describe の結果
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    /// 解析直後のレコード（保存時に画像が外されても、こちらには残る）
    pub record: AnalysisRecord,
    pub stage: SaveStage,
}

/// delete の結果
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub removed: bool,
    pub remaining: Vec<AnalysisRecord>,
}

pub struct SafebiteUseCase {
    analysis: AnalysisClient,
    store: Arc<dyn ResultRepository>,
    images: Arc<dyn ImageLoader>,
    log: Arc<dyn Log>,
}

impl SafebiteUseCase {
    pub fn new(
        analysis: AnalysisClient,
        store: Arc<dyn ResultRepository>,
        images: Arc<dyn ImageLoader>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            analysis,
            store,
            images,
            log,
        }
    }

    /// 画像を読み込んで解析し、保存する
    pub fn scan(
        &self,
        image: &Path,
        category: Category,
        notes: Option<&str>,
    ) -> Result<AnalysisOutcome, Error> {
        let payload = self.images.load(image)?;
        let record = self.analysis.submit_image(&payload, category, notes)?;
        Ok(self.persist(record))
    }

    /// テキスト記述を解析し、保存する
    pub fn describe(&self, description: &str, category: Category) -> Result<AnalysisOutcome, Error> {
        let record = self.analysis.submit_text(description, category)?;
        Ok(self.persist(record))
    }

    fn persist(&self, record: AnalysisRecord) -> AnalysisOutcome {
        let report = self.store.save(record.clone());
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "result saved")
                .layer("usecase")
                .kind("storage")
                .field("id", record.id.to_string())
                .field("stage", report.stage.as_str())
                .field("records", report.records.len()),
        );
        AnalysisOutcome {
            record,
            stage: report.stage,
        }
    }

    pub fn history(&self, filter: &HistoryFilter) -> Vec<AnalysisRecord> {
        self.store
            .list_all()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect()
    }

    pub fn show(&self, id: &str) -> Option<AnalysisRecord> {
        self.store.get(id)
    }

    /// id が無ければ removed = false。あったのに消せなかった（書き込み失敗）場合は Error::Io
    pub fn delete(&self, id: &str) -> Result<DeleteOutcome, Error> {
        let existed = self.store.get(id).is_some();
        let remaining = self.store.delete(id);
        if existed && remaining.iter().any(|r| r.id.as_str() == id) {
            return Err(Error::io_msg(format!(
                "could not delete '{}': the result is still saved",
                id
            )));
        }
        Ok(DeleteOutcome {
            removed: existed,
            remaining,
        })
    }

    /// update が空なら現在の設定を返す。そうでなければ当てた結果を丸ごと保存して返す
    pub fn settings(&self, update: &PreferencesUpdate) -> UserPreferences {
        let current = self.store.get_preferences();
        if update.is_empty() {
            return current;
        }
        let next = update.apply(current);
        self.store.save_preferences(&next);
        next
    }
}
