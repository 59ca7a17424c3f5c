//! 解析クライアント: 画像またはテキスト記述をモデルへ送り、検証済みの AnalysisRecord にする
//!
//! 1 回の送信につき HTTP は 1 回だけ（リトライなし）。結果の保存はしない（呼び出し元が ResultRepository へ渡す）。
//! モデル出力は項目ごとに検証して写す。id / createdAt / imageUrl / category / sourceLinks はローカルで決める。

use crate::domain::{AnalysisRecord, Category, Finding, Verdict};
use crate::ports::outbound::ImagePayload;
use crate::usecase::prompt::{image_prompt, text_prompt, SYSTEM_INSTRUCTION};
use chrono::{DateTime, TimeZone, Utc};
use common::config::DEFAULT_TEMPERATURE;
use common::error::Error;
use common::llm::{extract_json_object, GenerateRequest, Generation, LlmDriver, Part};
use common::ports::outbound::{Clock, IdGenerator, Log, LogLevel, LogRecord};
use serde::Deserialize;
use std::sync::Arc;

/// モデルが sampleName を返さなかったときの表示名
pub const TEXT_PLACEHOLDER: &str = "Text Analysis";
pub const IMAGE_PLACEHOLDER: &str = "Image Analysis";

/// モデルが返す JSON（検証前）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelVerdict {
    #[serde(default)]
    sample_name: Option<String>,
    status: String,
    confidence_score: f64,
    #[serde(default)]
    adulterants: Option<Vec<ModelFinding>>,
    short_term_effects: String,
    long_term_risks: String,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelFinding {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    is_toxic: bool,
    match_percentage: f64,
    description: String,
}

/// ローカルで決める項目
struct LocalFields {
    id: common::domain::RecordId,
    created_at: DateTime<Utc>,
    category: String,
    image_ref: Option<String>,
    source_refs: Vec<String>,
    placeholder: &'static str,
}

/// 0..=100 の整数へ（小数は四捨五入、範囲外は不正）
fn percentage(value: f64, field: &str) -> Result<u8, Error> {
    let rounded = value.round();
    if !rounded.is_finite() || !(0.0..=100.0).contains(&rounded) {
        return Err(Error::malformed(format!(
            "AI response has an out-of-range {}: {}",
            field, value
        )));
    }
    Ok(rounded as u8)
}

fn required_text(value: String, field: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(Error::malformed(format!("AI response has an empty {}", field)));
    }
    Ok(value)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ModelVerdict {
    fn into_record(self, local: LocalFields) -> Result<AnalysisRecord, Error> {
        let verdict = Verdict::parse(&self.status).ok_or_else(|| {
            Error::malformed(format!("AI response has an unknown status: {:?}", self.status))
        })?;
        let confidence = percentage(self.confidence_score, "confidenceScore")?;
        let findings = self
            .adulterants
            .unwrap_or_default()
            .into_iter()
            .map(|f| {
                Ok(Finding {
                    name: f.name,
                    kind: f.kind,
                    is_hazardous: f.is_toxic,
                    match_strength: percentage(f.match_percentage, "matchPercentage")?,
                    description: f.description,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(AnalysisRecord {
            id: local.id,
            created_at: local.created_at,
            sample_label: non_blank(self.sample_name)
                .unwrap_or_else(|| local.placeholder.to_string()),
            category: local.category,
            image_ref: local.image_ref,
            verdict,
            confidence,
            findings,
            short_term_effects: required_text(self.short_term_effects, "shortTermEffects")?,
            long_term_risks: required_text(self.long_term_risks, "longTermRisks")?,
            summary: non_blank(self.summary),
            source_refs: local.source_refs,
        })
    }
}

/// 応答テキストを検証済みの ModelVerdict にする
fn parse_verdict(text: &str) -> Result<ModelVerdict, Error> {
    let value = extract_json_object(text)
        .map_err(|_| Error::malformed("AI response was not valid JSON. Please try again."))?;
    serde_json::from_value(value)
        .map_err(|e| Error::malformed(format!("AI response does not match the expected schema: {}", e)))
}

fn failure_kind(err: &Error) -> &'static str {
    match err {
        Error::NotConfigured(_) => "not_configured",
        Error::Http(_) => "http",
        Error::NoResponse(_) => "no_response",
        Error::MalformedResponse(_) => "malformed_response",
        Error::InvalidArgument(_) => "invalid_argument",
        _ => "other",
    }
}

/// 解析クライアント
///
/// API キーが無い場合も作成でき、送信時に Error::NotConfigured を返す。
pub struct AnalysisClient {
    driver: Result<LlmDriver, Error>,
    temperature: f32,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGenerator>,
    log: Arc<dyn Log>,
}

impl AnalysisClient {
    pub fn new(
        driver: Result<LlmDriver, Error>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGenerator>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            driver,
            temperature: DEFAULT_TEMPERATURE,
            clock,
            id_gen,
            log,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// 画像を解析する
    ///
    /// # Arguments
    /// * `image` - base64 済みの画像
    /// * `category` - 表示名がプロンプトとレコードに使われる
    /// * `notes` - 利用者の補足（任意）
    pub fn submit_image(
        &self,
        image: &ImagePayload,
        category: Category,
        notes: Option<&str>,
    ) -> Result<AnalysisRecord, Error> {
        let request = self.request(vec![
            Part::text(image_prompt(category.display_name(), notes)),
            Part::inline_data(image.mime_type.clone(), image.data.clone()),
        ]);
        self.submit(
            request,
            category,
            Some(image.data_url()),
            IMAGE_PLACEHOLDER,
        )
    }

    /// 症状・特徴のテキスト記述を解析する
    pub fn submit_text(
        &self,
        description: &str,
        category: Category,
    ) -> Result<AnalysisRecord, Error> {
        if description.trim().is_empty() {
            return Err(Error::invalid_argument("Input missing: description is empty"));
        }
        let request = self.request(vec![Part::text(text_prompt(
            category.display_name(),
            description,
        ))]);
        self.submit(request, category, None, TEXT_PLACEHOLDER)
    }

    fn request(&self, parts: Vec<Part>) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Some(SYSTEM_INSTRUCTION.to_string()),
            parts,
            grounding: true,
            temperature: Some(self.temperature),
        }
    }

    fn submit(
        &self,
        request: GenerateRequest,
        category: Category,
        image_ref: Option<String>,
        placeholder: &'static str,
    ) -> Result<AnalysisRecord, Error> {
        let has_image = image_ref.is_some();
        let result = self.generate(&request, category, has_image).and_then(|generation| {
            let verdict = parse_verdict(&generation.text)?;
            let local = LocalFields {
                id: self.id_gen.next_id(),
                created_at: self.now()?,
                category: category.display_name().to_string(),
                image_ref,
                source_refs: generation.grounding_uris,
                placeholder,
            };
            verdict.into_record(local)
        });

        match &result {
            Ok(record) => self.log(
                LogRecord::new(LogLevel::Info, "analysis completed")
                    .field("id", record.id.to_string())
                    .field("status", record.verdict.as_str())
                    .field("confidence", record.confidence)
                    .field("findings", record.findings.len())
                    .field("sources", record.source_refs.len()),
            ),
            Err(e) => self.log(
                LogRecord::new(LogLevel::Warn, "analysis failed")
                    .field("failure", failure_kind(e))
                    .field("error", e.to_string())
                    .field("has_image", has_image),
            ),
        }
        result
    }

    fn generate(
        &self,
        request: &GenerateRequest,
        category: Category,
        has_image: bool,
    ) -> Result<Generation, Error> {
        let driver = self.driver.as_ref().map_err(Clone::clone)?;
        self.log(
            LogRecord::new(LogLevel::Info, "analysis request")
                .field("provider", driver.provider().name())
                .field("model", driver.provider().model())
                .field("category", category.id())
                .field("has_image", has_image),
        );
        driver.generate(request)
    }

    fn now(&self) -> Result<DateTime<Utc>, Error> {
        let ms = i64::try_from(self.clock.now_ms())
            .map_err(|_| Error::system("clock is out of range"))?;
        Utc.timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| Error::system("clock is out of range"))
    }

    fn log(&self, record: LogRecord) {
        let _ = self.log.log(&record.layer("usecase").kind("analysis"));
    }
}
