//! LLMドライバーの実装
//!
//! プロバイダに依存しない共通処理（ペイロード生成 → HTTP → 応答解析）を提供します。

use crate::error::Error;
use crate::llm::provider::{GenerateRequest, LlmProvider};
use std::sync::Arc;

/// 1 回の生成結果（本文は必ず空でない）
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub grounding_uris: Vec<String>,
}

/// LLMドライバー
#[derive(Clone)]
pub struct LlmDriver {
    provider: Arc<dyn LlmProvider>,
}

impl LlmDriver {
    /// 新しいドライバーを作成
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// リクエストを 1 回だけ送信して応答を得る（リトライしない）
    ///
    /// # Returns
    /// * `Ok(Generation)` - 応答テキストとグラウンディング URI
    /// * `Err(Error::Http)` - 通信・サービス側のエラー（そのまま返す）
    /// * `Err(Error::NoResponse)` - 応答にテキストが無い
    pub fn generate(&self, request: &GenerateRequest) -> Result<Generation, Error> {
        let payload = self.provider.make_request_payload(request)?;

        let request_json = serde_json::to_string(&payload)
            .map_err(|e| Error::system(format!("Failed to serialize request: {}", e)))?;

        let response_json = self.provider.make_http_request(&request_json)?;

        let response = self.provider.parse_response(&response_json)?;
        let text = response
            .text
            .ok_or_else(|| Error::no_response("No response from AI"))?;

        Ok(Generation {
            text,
            grounding_uris: response.grounding_uris,
        })
    }

    /// プロバイダを取得
    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::Part;
    use crate::llm::stub::StubProvider;

    fn request() -> GenerateRequest {
        GenerateRequest {
            parts: vec![Part::text("test")],
            ..GenerateRequest::default()
        }
    }

    #[test]
    fn test_generate_returns_text_and_sources() {
        let stub = Arc::new(
            StubProvider::new()
                .with_text_and_sources("Hello, world!", &["https://x.example"]),
        );
        let driver = LlmDriver::new(stub.clone());
        let gen = driver.generate(&request()).unwrap();
        assert_eq!(gen.text, "Hello, world!");
        assert_eq!(gen.grounding_uris, vec!["https://x.example".to_string()]);
        assert_eq!(stub.call_count(), 1);
        assert_eq!(driver.provider().name(), "stub");
    }

    #[test]
    fn test_generate_no_text_is_no_response() {
        let stub = Arc::new(StubProvider::new().with_raw(r#"{"candidates":[]}"#));
        let driver = LlmDriver::new(stub);
        let err = driver.generate(&request()).unwrap_err();
        assert_eq!(err, Error::no_response("No response from AI"));
    }

    #[test]
    fn test_generate_http_error_passes_through_unchanged() {
        let stub = Arc::new(StubProvider::new().with_error(Error::http("HTTP request failed: timeout")));
        let driver = LlmDriver::new(stub.clone());
        let err = driver.generate(&request()).unwrap_err();
        assert_eq!(err, Error::http("HTTP request failed: timeout"));
        assert_eq!(stub.call_count(), 1);
    }

    #[test]
    fn test_generate_payload_error_skips_http() {
        let stub = Arc::new(StubProvider::new().with_text("unused"));
        let driver = LlmDriver::new(stub.clone());
        let err = driver.generate(&GenerateRequest::default()).unwrap_err();
        assert!(err.is_usage());
        assert_eq!(stub.call_count(), 0);
    }
}
