mod analysis_tests;

use crate::domain::{AnalysisRecord, Verdict};
use chrono::{TimeZone, Utc};
use common::domain::RecordId;

/// ID だけを変えた同じ大きさのレコード（quota の計算を簡単にするため）
pub(crate) fn sample_record(id: &str) -> AnalysisRecord {
    AnalysisRecord {
        id: RecordId::new(id),
        created_at: Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
        sample_label: "Raw Cow Milk".to_string(),
        category: "Liquid Essentials".to_string(),
        image_ref: None,
        verdict: Verdict::Safe,
        confidence: 90,
        findings: vec![],
        short_term_effects: "None, safe for consumption.".to_string(),
        long_term_risks: "None".to_string(),
        summary: Some("No signs of adulteration".to_string()),
        source_refs: vec![],
    }
}
