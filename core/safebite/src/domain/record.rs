//! 解析レコード（1 回の解析結果。作成後は変更されず、削除のみ）

use chrono::{DateTime, Utc};
use common::domain::RecordId;
use serde::{Deserialize, Deserializer, Serialize};

/// 判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Adulterated,
    Inconclusive,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Safe, Verdict::Adulterated, Verdict::Inconclusive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Adulterated => "Adulterated",
            Self::Inconclusive => "Inconclusive",
        }
    }

    /// 完全一致でのみ解釈する（モデル出力の検証用）
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 検出された（または疑われる）混入物
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "isToxic")]
    pub is_hazardous: bool,
    /// 0..=100
    #[serde(rename = "matchPercentage")]
    pub match_strength: u8,
    pub description: String,
}

/// 解析レコード
///
/// 永続化時のキー名は保存済みデータとの互換のため camelCase（`sampleName` / `status` など）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: RecordId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "sampleName")]
    pub sample_label: String,
    /// 呼び出し元が渡したカテゴリ表示名をそのまま保持する
    pub category: String,
    /// `data:<mime>;base64,...`。テキスト解析や画像を外した保存では None
    #[serde(
        rename = "imageUrl",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_ref: Option<String>,
    #[serde(rename = "status")]
    pub verdict: Verdict,
    /// 0..=100
    #[serde(rename = "confidenceScore")]
    pub confidence: u8,
    #[serde(rename = "adulterants", default)]
    pub findings: Vec<Finding>,
    #[serde(rename = "shortTermEffects")]
    pub short_term_effects: String,
    #[serde(rename = "longTermRisks")]
    pub long_term_risks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// グラウンディングで引用された URI（重複なし・出現順）
    #[serde(rename = "sourceLinks", default)]
    pub source_refs: Vec<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<String> = Option::deserialize(deserializer)?;
    Ok(v.filter(|s| !s.is_empty()))
}

impl AnalysisRecord {
    pub fn has_image(&self) -> bool {
        self.image_ref.is_some()
    }

    /// 画像参照だけを外したコピー（容量超過時の退避保存用）
    pub fn without_image(&self) -> Self {
        Self {
            image_ref: None,
            ..self.clone()
        }
    }

    /// 一覧表示・検索に使う日付文字列（UTC）
    pub fn display_date(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record() -> AnalysisRecord {
        AnalysisRecord {
            id: RecordId::new("0Abc1234"),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            sample_label: "Raw Cow Milk".to_string(),
            category: "Liquid Essentials".to_string(),
            image_ref: Some("data:image/png;base64,AAAA".to_string()),
            verdict: Verdict::Adulterated,
            confidence: 78,
            findings: vec![Finding {
                name: "Urea".to_string(),
                kind: "Chemical".to_string(),
                is_hazardous: true,
                match_strength: 64,
                description: "Added to raise apparent protein".to_string(),
            }],
            short_term_effects: "Nausea".to_string(),
            long_term_risks: "Kidney damage".to_string(),
            summary: Some("Likely urea".to_string()),
            source_refs: vec!["https://a.example".to_string()],
        }
    }

    #[test]
    fn test_verdict_parse_is_exact() {
        assert_eq!(Verdict::parse("Safe"), Some(Verdict::Safe));
        assert_eq!(Verdict::parse("Adulterated"), Some(Verdict::Adulterated));
        assert_eq!(Verdict::parse("Inconclusive"), Some(Verdict::Inconclusive));
        assert_eq!(Verdict::parse("safe"), None);
        assert_eq!(Verdict::parse("Unknown"), None);
    }

    #[test]
    fn test_record_serializes_with_persisted_keys() {
        let v = serde_json::to_value(record()).unwrap();
        assert_eq!(v["id"], "0Abc1234");
        assert_eq!(v["createdAt"], "2026-03-01T09:30:00Z");
        assert_eq!(v["sampleName"], "Raw Cow Milk");
        assert_eq!(v["imageUrl"], "data:image/png;base64,AAAA");
        assert_eq!(v["status"], "Adulterated");
        assert_eq!(v["confidenceScore"], 78);
        assert_eq!(v["adulterants"][0]["type"], "Chemical");
        assert_eq!(v["adulterants"][0]["isToxic"], true);
        assert_eq!(v["adulterants"][0]["matchPercentage"], 64);
        assert_eq!(v["sourceLinks"][0], "https://a.example");
    }

    #[test]
    fn test_record_without_image_omits_key() {
        let r = record().without_image();
        assert!(!r.has_image());
        let v = serde_json::to_value(&r).unwrap();
        assert!(v.get("imageUrl").is_none());
        assert_eq!(r.sample_label, "Raw Cow Milk");
    }

    #[test]
    fn test_record_deserialize_empty_image_and_missing_optionals() {
        let v = json!({
            "id": "x1",
            "createdAt": "2026-03-01T09:30:00Z",
            "sampleName": "Honey",
            "category": "Liquid Essentials",
            "imageUrl": "",
            "status": "Safe",
            "confidenceScore": 95,
            "shortTermEffects": "None, safe for consumption.",
            "longTermRisks": "None"
        });
        let r: AnalysisRecord = serde_json::from_value(v).unwrap();
        assert_eq!(r.image_ref, None);
        assert!(r.findings.is_empty());
        assert!(r.source_refs.is_empty());
        assert_eq!(r.summary, None);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(record().display_date(), "2026-03-01 09:30");
    }
}
