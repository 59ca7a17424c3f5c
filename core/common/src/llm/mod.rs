//! LLMドライバーとプロバイダの実装
//!
//! プロバイダ（Gemini、テスト用 Stub）の差を LlmProvider で吸収し、
//! 応答テキストからの JSON 取り出しを json_extract で提供します。

pub mod driver;
pub mod gemini;
pub mod json_extract;
pub mod provider;
pub mod stub;

pub use driver::{Generation, LlmDriver};
pub use gemini::GeminiProvider;
pub use json_extract::{extract_json_object, extract_json_text};
pub use provider::{GenerateRequest, LlmProvider, LlmResponse, Part};
pub use stub::StubProvider;
