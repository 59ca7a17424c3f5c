//! Stubプロバイダの実装
//!
//! 実際のAPIは呼び出さず、あらかじめ積んだ generateContent 形式のレスポンスを順に返します。
//! ペイロード生成と応答解析は Gemini と同じ処理を使うため、テストで送信内容も検証できます。

use crate::error::Error;
use crate::llm::gemini::{build_payload, parse_generate_content};
use crate::llm::provider::{GenerateRequest, LlmProvider, LlmResponse};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Stubプロバイダ
#[derive(Debug, Default)]
pub struct StubProvider {
    responses: Mutex<VecDeque<Result<String, Error>>>,
    requests: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生のレスポンスボディを積む
    pub fn with_raw(self, body: impl Into<String>) -> Self {
        self.push(Ok(body.into()));
        self
    }

    /// 本文テキストだけのレスポンスを積む
    pub fn with_text(self, text: &str) -> Self {
        self.with_text_and_sources(text, &[])
    }

    /// 本文テキスト + グラウンディング URI のレスポンスを積む
    pub fn with_text_and_sources(self, text: &str, uris: &[&str]) -> Self {
        let chunks: Vec<Value> = uris
            .iter()
            .map(|u| json!({ "web": { "uri": u, "title": u } }))
            .collect();
        let body = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "groundingMetadata": { "groundingChunks": chunks }
            }]
        });
        self.with_raw(body.to_string())
    }

    /// HTTP 層のエラーを積む
    pub fn with_error(self, err: Error) -> Self {
        self.push(Err(err));
        self
    }

    fn push(&self, item: Result<String, Error>) {
        if let Ok(mut q) = self.responses.lock() {
            q.push_back(item);
        }
    }

    /// make_http_request が呼ばれた回数
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// 受け取ったリクエストボディ（JSON として解析済み）
    pub fn requests(&self) -> Vec<Value> {
        self.requests
            .lock()
            .map(|r| {
                r.iter()
                    .filter_map(|s| serde_json::from_str(s).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl LlmProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    fn make_request_payload(&self, request: &GenerateRequest) -> Result<Value, Error> {
        build_payload(request)
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        self.requests
            .lock()
            .map_err(|_| Error::system("stub poisoned"))?
            .push(request_json.to_string());
        self.responses
            .lock()
            .map_err(|_| Error::system("stub poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(Error::http("stub provider has no queued response")))
    }

    fn parse_response(&self, response_json: &str) -> Result<LlmResponse, Error> {
        parse_generate_content(response_json)
    }
}
