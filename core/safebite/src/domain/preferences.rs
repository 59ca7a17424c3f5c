//! ユーザー設定（丸ごと読み書きする。部分マージはしない）
//!
//! 解析リクエストには使わない（表示と保存のみ）。

use common::error::Error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// 1..=100
    pub sensitivity: u8,
    pub detect_artificial_colors: bool,
    pub analyze_texture: bool,
    pub freshness_index: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            sensitivity: 85,
            detect_artificial_colors: true,
            analyze_texture: true,
            freshness_index: false,
        }
    }
}

impl UserPreferences {
    pub fn validate_sensitivity(value: u32) -> Result<u8, Error> {
        if (1..=100).contains(&value) {
            Ok(value as u8)
        } else {
            Err(Error::invalid_argument(format!(
                "sensitivity must be between 1 and 100 (got {})",
                value
            )))
        }
    }
}

/// settings コマンドで指定された変更（None は現状維持）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencesUpdate {
    pub sensitivity: Option<u8>,
    pub detect_artificial_colors: Option<bool>,
    pub analyze_texture: Option<bool>,
    pub freshness_index: Option<bool>,
}

impl PreferencesUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 現在の設定に変更を当てた、新しい設定オブジェクト全体
    pub fn apply(&self, current: UserPreferences) -> UserPreferences {
        UserPreferences {
            sensitivity: self.sensitivity.unwrap_or(current.sensitivity),
            detect_artificial_colors: self
                .detect_artificial_colors
                .unwrap_or(current.detect_artificial_colors),
            analyze_texture: self.analyze_texture.unwrap_or(current.analyze_texture),
            freshness_index: self.freshness_index.unwrap_or(current.freshness_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_serialize_exactly() {
        let v = serde_json::to_value(UserPreferences::default()).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "sensitivity": 85,
                "detectArtificialColors": true,
                "analyzeTexture": true,
                "freshnessIndex": false
            })
        );
    }

    #[test]
    fn test_validate_sensitivity() {
        assert_eq!(UserPreferences::validate_sensitivity(1).unwrap(), 1);
        assert_eq!(UserPreferences::validate_sensitivity(100).unwrap(), 100);
        assert!(UserPreferences::validate_sensitivity(0).unwrap_err().is_usage());
        assert!(UserPreferences::validate_sensitivity(101).unwrap_err().is_usage());
    }

    #[test]
    fn test_update_apply() {
        let update = PreferencesUpdate {
            sensitivity: Some(40),
            freshness_index: Some(true),
            ..PreferencesUpdate::default()
        };
        assert!(!update.is_empty());
        let next = update.apply(UserPreferences::default());
        assert_eq!(next.sensitivity, 40);
        assert!(next.detect_artificial_colors);
        assert!(next.analyze_texture);
        assert!(next.freshness_index);
        assert!(PreferencesUpdate::default().is_empty());
    }

    #[test]
    fn test_partial_object_is_rejected() {
        let r: Result<UserPreferences, _> = serde_json::from_str(r#"{"sensitivity": 50}"#);
        assert!(r.is_err());
    }
}
