//! config.json 用の設定型
//!
//! `<home>/config.json` からモデル名・API のベース URL・API キーを読む環境変数名・温度・
//! ストレージ容量を解決する。ファイルが無ければすべてデフォルト。

use crate::adapter::file_kv_store::DEFAULT_QUOTA_BYTES;
use crate::domain::HomeDir;
use crate::error::Error;
use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::ports::outbound::FileSystem;
use serde::Deserialize;

/// API キーを読む環境変数名のデフォルト
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// 生成時の温度のデフォルト
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// 解決済みの設定
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model: String,
    pub base_url: String,
    /// API キーを読む環境変数名（キーそのものは設定ファイルに置かない）
    pub api_key_env: String,
    pub temperature: f32,
    /// キー・バリューストア全体の容量上限（バイト）
    pub storage_quota_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

/// serde 用の内部構造（すべて省略可能）
#[derive(Debug, Default, Deserialize)]
struct ConfigRaw {
    #[serde(alias = "default_model")]
    model: Option<String>,
    base_url: Option<String>,
    api_key_env: Option<String>,
    temperature: Option<f32>,
    #[serde(alias = "quota")]
    storage_quota_bytes: Option<u64>,
}

impl Config {
    /// JSON 文字列からパース（ファイル読みは load_config で行う）
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let raw: ConfigRaw = serde_json::from_str(json)?;
        let defaults = Config::default();
        Ok(Config {
            model: non_empty(raw.model).unwrap_or(defaults.model),
            base_url: non_empty(raw.base_url).unwrap_or(defaults.base_url),
            api_key_env: non_empty(raw.api_key_env).unwrap_or(defaults.api_key_env),
            temperature: raw.temperature.unwrap_or(defaults.temperature),
            storage_quota_bytes: raw
                .storage_quota_bytes
                .unwrap_or(defaults.storage_quota_bytes),
        })
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `<home>/config.json` を読む
///
/// ファイルが無ければデフォルト。読めるが壊れていれば Error::Json（パスを含む）。
pub fn load_config(fs: &dyn FileSystem, home: &HomeDir) -> Result<Config, Error> {
    let path = home.config_file();
    if !fs.exists(&path) {
        return Ok(Config::default());
    }
    let content = fs.read_to_string(&path)?;
    Config::parse(&content)
        .map_err(|e| Error::json(format!("Failed to parse {}: {}", path.display(), e)))
}
