//! モデル応答テキストから JSON オブジェクトを取り出す
//!
//! 「JSON だけを出力せよ」と指示しても、モデルは前置き・後書きやコードフェンスを付けることがある。
//! 次の順に候補を試し、JSON オブジェクトとして解析できた最初の候補を採用する:
//! 1. 最初のコードフェンス（```json 任意）の中身
//! 2. 最初の `{` から最後の `}` まで
//! 3. フェンス記号を除いて trim したテキスト
//!
//! 文字列値の中の `{` `}` は考慮しない（既知の制限）。

use crate::error::Error;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fence_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").ok())
        .as_ref()
}

fn fenced_inner(text: &str) -> Option<String> {
    fence_regex()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|inner| inner.as_str().trim().to_string())
}

fn brace_span(text: &str) -> Option<String> {
    let first_open = text.find('{')?;
    let last_close = text.rfind('}')?;
    (last_close > first_open).then(|| text[first_open..=last_close].to_string())
}

fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// 候補を試す順に並べる（存在しない段は飛ばす）
fn candidates(text: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(3);
    out.extend(fenced_inner(text));
    out.extend(brace_span(text));
    out.push(strip_fences(text));
    out
}

/// 最初に試す候補の部分文字列（解析はしない）
pub fn extract_json_text(text: &str) -> String {
    candidates(text).into_iter().next().unwrap_or_default()
}

/// 応答テキストから JSON オブジェクトを取り出して解析する
///
/// どの候補もオブジェクトとして解析できなければ Error::MalformedResponse（最後の候補の理由を載せる）。
pub fn extract_json_object(text: &str) -> Result<Value, Error> {
    let mut last_err = Error::malformed("AI response was not valid JSON");
    for candidate in candidates(text) {
        match serde_json::from_str::<Value>(&candidate) {
            Ok(value) if value.is_object() => return Ok(value),
            Ok(_) => last_err = Error::malformed("AI response was not a JSON object"),
            Err(e) => last_err = Error::malformed(format!("AI response was not valid JSON: {}", e)),
        }
    }
    Err(last_err)
}
