//! Geminiプロバイダの実装（generateContent + Google検索グラウンディング）

use crate::config::Config;
use crate::error::Error;
use crate::llm::provider::{GenerateRequest, LlmProvider, LlmResponse, Part};
use crate::ports::outbound::EnvResolver;
use serde_json::{json, Value};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Geminiプロバイダ
pub struct GeminiProvider {
    model: String,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    /// 新しいGeminiプロバイダを作成
    ///
    /// # Arguments
    /// * `model` - モデル名（デフォルト: DEFAULT_MODEL）
    /// * `api_key` - API キー。None / 空なら Error::NotConfigured
    /// * `base_url` - API のベース URL（デフォルト: DEFAULT_BASE_URL）
    pub fn new(
        model: Option<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, Error> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::not_configured("Gemini API key is not configured"))?;
        Ok(Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// 設定と環境変数から作成する。API キーは `config.api_key_env` が指す環境変数から読む。
    pub fn from_config(config: &Config, env: &dyn EnvResolver) -> Result<Self, Error> {
        let api_key = env.var(&config.api_key_env);
        if api_key.is_none() {
            return Err(Error::not_configured(format!(
                "{} environment variable is not set",
                config.api_key_env
            )));
        }
        Self::new(
            Some(config.model.clone()),
            api_key,
            Some(config.base_url.clone()),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn make_request_payload(&self, request: &GenerateRequest) -> Result<Value, Error> {
        build_payload(request)
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        let client = reqwest::blocking::Client::new();
        let response = client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .body(request_json.to_string())
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            // エラーレスポンスを解析してメッセージを抽出
            let error_msg = serde_json::from_str::<Value>(&response_text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
                .unwrap_or_else(|| format!("HTTP {}: {}", status, response_text));
            return Err(Error::http(format!("Gemini API error: {}", error_msg)));
        }

        Ok(response_text)
    }

    fn parse_response(&self, response_json: &str) -> Result<LlmResponse, Error> {
        parse_generate_content(response_json)
    }
}

/// GenerateRequest を generateContent のリクエストボディにする
pub(crate) fn build_payload(request: &GenerateRequest) -> Result<Value, Error> {
    let mut payload = json!({});

    if let Some(system) = &request.system_instruction {
        payload["systemInstruction"] = json!({
            "parts": [{"text": system}]
        });
    }

    if request.parts.is_empty() {
        return Err(Error::invalid_argument("request has no content parts"));
    }
    let parts: Vec<Value> = request
        .parts
        .iter()
        .map(|p| match p {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineData { mime_type, data } => json!({
                "inlineData": { "mimeType": mime_type, "data": data }
            }),
        })
        .collect();
    payload["contents"] = json!([{ "role": "user", "parts": parts }]);

    if request.grounding {
        payload["tools"] = json!([{ "googleSearch": {} }]);
    }

    if let Some(t) = request.temperature {
        payload["generationConfig"] = json!({ "temperature": t });
    }

    Ok(payload)
}

/// generateContent のレスポンスボディからテキストとグラウンディング URI を取り出す
pub(crate) fn parse_generate_content(response_json: &str) -> Result<LlmResponse, Error> {
    let v: Value = serde_json::from_str(response_json)
        .map_err(|e| Error::http(format!("Failed to parse response JSON: {}", e)))?;

    if let Some(error) = v.get("error") {
        let error_msg = error["message"].as_str().unwrap_or("Unknown error");
        return Err(Error::http(format!("Gemini API error: {}", error_msg)));
    }

    let candidate = &v["candidates"][0];
    if candidate.is_null() {
        if let Some(reason) = v["promptFeedback"]["blockReason"].as_str() {
            return Err(Error::no_response(format!(
                "No response from AI (prompt blocked: {})",
                reason
            )));
        }
    }

    // 思考パート（thought: true）を除いたテキストを連結
    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter(|part| !part["thought"].as_bool().unwrap_or(false))
                .filter_map(|part| part["text"].as_str())
                .collect()
        })
        .unwrap_or_default();
    let text = if text.trim().is_empty() { None } else { Some(text) };

    let mut grounding_uris: Vec<String> = Vec::new();
    if let Some(chunks) = candidate["groundingMetadata"]["groundingChunks"].as_array() {
        for uri in chunks.iter().filter_map(|c| c["web"]["uri"].as_str()) {
            if !grounding_uris.iter().any(|u| u == uri) {
                grounding_uris.push(uri.to_string());
            }
        }
    }

    Ok(LlmResponse {
        text,
        grounding_uris,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(None, Some("test-key".to_string()), None).unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        assert!(matches!(
            GeminiProvider::new(None, None, None),
            Err(Error::NotConfigured(_))
        ));
        assert!(matches!(
            GeminiProvider::new(None, Some("  ".to_string()), None),
            Err(Error::NotConfigured(_))
        ));
    }

    #[test]
    fn test_defaults_and_endpoint() {
        let p = provider();
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.model(), DEFAULT_MODEL);
        assert_eq!(
            p.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let p = GeminiProvider::new(
            Some("gemini-x".to_string()),
            Some("k".to_string()),
            Some("http://localhost:9999/v1/".to_string()),
        )
        .unwrap();
        assert_eq!(p.endpoint(), "http://localhost:9999/v1/models/gemini-x:generateContent");
    }

    #[test]
    fn test_make_request_payload_with_image_grounding_and_temperature() {
        let request = GenerateRequest {
            system_instruction: Some("You are a food safety expert".to_string()),
            parts: vec![
                Part::text("Analyse this"),
                Part::inline_data("image/jpeg", "QUJD"),
            ],
            grounding: true,
            temperature: Some(0.3),
        };
        let payload = provider().make_request_payload(&request).unwrap();

        assert_eq!(
            payload["systemInstruction"]["parts"][0]["text"],
            "You are a food safety expert"
        );
        let contents = payload["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        let parts = contents[0]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["text"], "Analyse this");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "QUJD");
        assert!(payload["tools"][0]["googleSearch"].is_object());
        let t = payload["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((t - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_make_request_payload_minimal() {
        let request = GenerateRequest {
            parts: vec![Part::text("Hello")],
            ..GenerateRequest::default()
        };
        let payload = provider().make_request_payload(&request).unwrap();
        assert!(payload.get("systemInstruction").is_none());
        assert!(payload.get("tools").is_none());
        assert!(payload.get("generationConfig").is_none());
    }

    #[test]
    fn test_make_request_payload_without_parts_is_error() {
        let err = provider()
            .make_request_payload(&GenerateRequest::default())
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_parse_response_text_and_grounding() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "```json\n{\"a\":"},
                    {"text": "1}\n```"}
                ]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://a.example", "title": "A"}},
                    {"web": {"uri": "https://b.example"}},
                    {"web": {"uri": "https://a.example"}},
                    {"retrievedContext": {}}
                ]}
            }]
        }"#;
        let resp = provider().parse_response(body).unwrap();
        assert_eq!(resp.text.as_deref(), Some("```json\n{\"a\":1}\n```"));
        assert_eq!(
            resp.grounding_uris,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_parse_response_without_text() {
        let resp = provider()
            .parse_response(r#"{"candidates":[{"content":{"parts":[]}}]}"#)
            .unwrap();
        assert_eq!(resp.text, None);
        assert!(resp.grounding_uris.is_empty());

        let resp = provider()
            .parse_response(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
            .unwrap();
        assert_eq!(resp.text, None);
    }

    #[test]
    fn test_parse_response_error_object() {
        let err = provider()
            .parse_response(r#"{"error":{"code":429,"message":"Resource exhausted"}}"#)
            .unwrap_err();
        assert_eq!(err, Error::http("Gemini API error: Resource exhausted"));
    }

    #[test]
    fn test_parse_response_blocked_prompt() {
        let err = provider()
            .parse_response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::NoResponse(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_response_not_json() {
        let err = provider().parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
