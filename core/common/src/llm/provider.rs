//! LLMプロバイダのトレイト定義

use crate::error::Error;
use serde_json::Value;

/// リクエストの content part（Gemini の parts に対応）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// base64 済みのインラインデータ（画像など）
    InlineData { mime_type: String, data: String },
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// 1 回分の生成リクエスト（単発・履歴なし）
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// システム指示（出力スキーマや振る舞いのルール）
    pub system_instruction: Option<String>,
    /// user ターンの parts
    pub parts: Vec<Part>,
    /// Web 検索によるグラウンディングを有効にするか
    pub grounding: bool,
    pub temperature: Option<f32>,
}

/// プロバイダのレスポンスから取り出した内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    /// 本文テキスト（無い、または空なら None）
    pub text: Option<String>,
    /// グラウンディングで引用された URI（重複なし・出現順）
    pub grounding_uris: Vec<String>,
}

/// LLMプロバイダのトレイト
///
/// 各プロバイダ（Gemini、テスト用 Stub など）はこのトレイトを実装する必要があります。
pub trait LlmProvider: Send + Sync {
    /// プロバイダ名を返す
    fn name(&self) -> &str;

    /// 使用するモデル名
    fn model(&self) -> &str;

    /// リクエストペイロードを生成
    fn make_request_payload(&self, request: &GenerateRequest) -> Result<Value, Error>;

    /// HTTPリクエストを実行してレスポンスを取得
    ///
    /// # Returns
    /// * `Ok(String)` - レスポンスJSON文字列
    /// * `Err(Error)` - 通信・サービス側のエラー（Error::Http）
    fn make_http_request(&self, request_json: &str) -> Result<String, Error>;

    /// レスポンスからテキストとグラウンディング情報を抽出
    fn parse_response(&self, response_json: &str) -> Result<LlmResponse, Error>;
}
