//! 端末向けのテキスト表示

use crate::domain::{AnalysisRecord, Category, UserPreferences};
use crate::ports::outbound::SaveStage;

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}

/// 1 件分のレポート
pub fn render_report(record: &AnalysisRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  [{}]\n", record.sample_label, record.verdict));
    out.push_str(&format!("  id:          {}\n", record.id));
    out.push_str(&format!("  date:        {}\n", record.display_date()));
    out.push_str(&format!("  category:    {}\n", record.category));
    out.push_str(&format!("  confidence:  {}%\n", record.confidence));
    if record.has_image() {
        out.push_str("  image:       attached\n");
    }
    if let Some(summary) = &record.summary {
        out.push_str(&format!("\nSummary\n  {}\n", summary));
    }

    out.push_str("\nDetected adulterants\n");
    if record.findings.is_empty() {
        out.push_str("  none\n");
    }
    for f in &record.findings {
        let hazard = if f.is_hazardous { "toxic" } else { "non-toxic" };
        out.push_str(&format!(
            "  - {} ({}, {}, match {}%)\n    {}\n",
            f.name, f.kind, hazard, f.match_strength, f.description
        ));
    }

    out.push_str(&format!("\nShort-term effects\n  {}\n", record.short_term_effects));
    out.push_str(&format!("\nLong-term risks\n  {}\n", record.long_term_risks));

    if !record.source_refs.is_empty() {
        out.push_str("\nSources\n");
        for uri in &record.source_refs {
            out.push_str(&format!("  {}\n", uri));
        }
    }
    out
}

/// 保存段階の注記（Full / AlreadyPresent は無し）
pub fn render_save_note(stage: SaveStage) -> Option<&'static str> {
    match stage {
        SaveStage::Full | SaveStage::AlreadyPresent => None,
        SaveStage::Truncated => Some("storage is full: history was trimmed to the 20 most recent results"),
        SaveStage::WithoutImage => Some("storage is full: the result was saved without its image"),
        SaveStage::Dropped => Some("storage is full: the result could not be saved"),
    }
}

/// 履歴一覧の 1 行
pub fn render_history_row(record: &AnalysisRecord) -> String {
    format!(
        "{}  {}  {:<12}  {:>3}%  {}",
        record.id,
        record.display_date(),
        record.verdict.as_str(),
        record.confidence,
        record.sample_label
    )
}

pub fn render_preferences(prefs: &UserPreferences) -> String {
    format!(
        "sensitivity:        {}\nartificial-colors:  {}\ntexture:            {}\nfreshness:          {}\n",
        prefs.sensitivity,
        on_off(prefs.detect_artificial_colors),
        on_off(prefs.analyze_texture),
        on_off(prefs.freshness_index)
    )
}

pub fn render_categories() -> String {
    Category::ALL
        .iter()
        .map(|c| format!("{:<9} {:<18} {}\n", c.id(), c.display_name(), c.covers()))
        .collect()
}
