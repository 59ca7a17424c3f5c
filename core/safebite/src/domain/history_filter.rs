//! 履歴一覧の絞り込み条件

use crate::domain::{AnalysisRecord, Verdict};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    /// サンプル名（大文字小文字無視）・ID・表示日付のいずれかに含まれる
    pub search: Option<String>,
    pub status: Option<Verdict>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &AnalysisRecord) -> bool {
        let matches_search = match self.search.as_deref() {
            None | Some("") => true,
            Some(term) => {
                record
                    .sample_label
                    .to_lowercase()
                    .contains(&term.to_lowercase())
                    || record.id.contains(term)
                    || record.display_date().contains(term)
            }
        };
        let matches_status = self.status.map_or(true, |s| record.verdict == s);
        matches_search && matches_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::domain::RecordId;

    fn record(id: &str, label: &str, verdict: Verdict) -> AnalysisRecord {
        AnalysisRecord {
            id: RecordId::new(id),
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap(),
            sample_label: label.to_string(),
            category: "Fresh Produce".to_string(),
            image_ref: None,
            verdict,
            confidence: 50,
            findings: vec![],
            short_term_effects: "None".to_string(),
            long_term_risks: "None".to_string(),
            summary: None,
            source_refs: vec![],
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let f = HistoryFilter::default();
        assert!(f.matches(&record("a", "Apple", Verdict::Safe)));
        let f = HistoryFilter {
            search: Some(String::new()),
            status: None,
        };
        assert!(f.matches(&record("a", "Apple", Verdict::Safe)));
    }

    #[test]
    fn test_search_by_name_id_and_date() {
        let r = record("Zk91abcd", "Chili Powder", Verdict::Adulterated);
        let by = |s: &str| HistoryFilter {
            search: Some(s.to_string()),
            status: None,
        };
        assert!(by("chili").matches(&r));
        assert!(by("Zk91").matches(&r));
        // ID は大文字小文字を区別する
        assert!(!by("zk91").matches(&r));
        assert!(by("2026-01-15").matches(&r));
        assert!(!by("turmeric").matches(&r));
    }

    #[test]
    fn test_status_filter_combined_with_search() {
        let records = vec![
            record("a", "Milk", Verdict::Safe),
            record("b", "Milk powder", Verdict::Adulterated),
            record("c", "Oil", Verdict::Adulterated),
        ];
        let f = HistoryFilter {
            search: Some("milk".to_string()),
            status: Some(Verdict::Adulterated),
        };
        let hits: Vec<&AnalysisRecord> = records.iter().filter(|r| f.matches(r)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "b");
    }
}
