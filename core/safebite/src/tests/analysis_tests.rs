use crate::adapter::{KvResultStore, StdImageLoader};
use crate::domain::{Category, Verdict};
use crate::ports::outbound::{ImagePayload, ResultRepository, SaveStage};
use crate::usecase::analysis::{IMAGE_PLACEHOLDER, TEXT_PLACEHOLDER};
use crate::usecase::{AnalysisClient, SafebiteUseCase};
use common::adapter::{FixedClock, MemoryKvStore, MemoryLog, StdFileSystem, StdIdGenerator};
use common::error::Error;
use common::llm::{LlmDriver, StubProvider};
use common::ports::outbound::{Clock, Log};
use std::sync::Arc;
use tempfile::tempdir;

/// 2026-02-01T12:00:00Z
const NOW_MS: u64 = 1_769_947_200_000;

const ADULTERATED_MILK: &str = r#"Here is my analysis:
```json
{
  "sampleName": "Packaged Toned Milk",
  "status": "Adulterated",
  "confidenceScore": 78,
  "adulterants": [
    {
      "name": "Formalin",
      "type": "Preservative",
      "isToxic": true,
      "matchPercentage": 71,
      "description": "Formaldehyde solution used to stop spoilage"
    }
  ],
  "shortTermEffects": "Abdominal pain, vomiting, diarrhoea",
  "longTermRisks": "Liver and kidney damage; probable carcinogen",
  "summary": "Milk that does not spoil at room temperature suggests a preservative."
}
```
Stay safe!"#;

struct Fixture {
    stub: Arc<StubProvider>,
    kv: Arc<MemoryKvStore>,
    log: Arc<MemoryLog>,
    store: Arc<KvResultStore>,
    use_case: SafebiteUseCase,
}

fn client(driver: Result<LlmDriver, Error>, log: Arc<dyn Log>) -> AnalysisClient {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(NOW_MS));
    let id_gen = Arc::new(StdIdGenerator::new(Arc::clone(&clock)));
    AnalysisClient::new(driver, clock, id_gen, log)
}

fn fixture_with_driver(stub: StubProvider, configured: bool) -> Fixture {
    let stub = Arc::new(stub);
    let log = Arc::new(MemoryLog::new());
    let driver = if configured {
        Ok(LlmDriver::new(stub.clone()))
    } else {
        Err(Error::not_configured("GEMINI_API_KEY environment variable is not set"))
    };
    let kv = Arc::new(MemoryKvStore::new());
    let store = Arc::new(KvResultStore::new(kv.clone(), log.clone()));
    let use_case = SafebiteUseCase::new(
        client(driver, log.clone()),
        store.clone(),
        Arc::new(StdImageLoader::new(Arc::new(StdFileSystem))),
        log.clone(),
    );
    Fixture {
        stub,
        kv,
        log,
        store,
        use_case,
    }
}

fn fixture(stub: StubProvider) -> Fixture {
    fixture_with_driver(stub, true)
}

#[test]
fn test_describe_adulterated_milk_end_to_end() {
    let f = fixture(StubProvider::new().with_text(ADULTERATED_MILK));
    let category: Category = "Liquid Essentials".parse().unwrap();

    let outcome = f
        .use_case
        .describe("milk that doesn't spoil after a week outside the fridge", category)
        .unwrap();
    assert_eq!(outcome.stage, SaveStage::Full);

    let saved = f.store.list_all();
    assert_eq!(saved.len(), 1);
    let record = &saved[0];
    assert_eq!(record, &outcome.record);
    assert_eq!(record.verdict, Verdict::Adulterated);
    assert_eq!(record.confidence, 78);
    assert_eq!(record.image_ref, None);
    assert_eq!(record.category, "Liquid Essentials");
    assert_eq!(record.sample_label, "Packaged Toned Milk");
    assert_eq!(record.findings.len(), 1);
    assert_eq!(record.findings[0].name, "Formalin");
    assert!(record.findings[0].is_hazardous);
    assert_eq!(record.created_at.to_rfc3339(), "2026-02-01T12:00:00+00:00");
    assert_eq!(f.store.get(record.id.as_str()).as_ref(), Some(record));
}

#[test]
fn test_describe_sends_grounded_text_request() {
    let f = fixture(StubProvider::new().with_text(ADULTERATED_MILK));
    f.use_case
        .describe("honey that never crystallises", Category::Liquid)
        .unwrap();

    let requests = f.stub.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert!(req["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("SafeBite AI"));
    let parts = req["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 1);
    let prompt = parts[0]["text"].as_str().unwrap();
    assert!(prompt.contains("Liquid Essentials food item: \"honey that never crystallises\""));
    assert!(req["tools"][0]["googleSearch"].is_object());
    let t = req["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((t - 0.3).abs() < 1e-6);
}

#[test]
fn test_describe_prose_response_is_malformed_and_not_saved() {
    let f = fixture(
        StubProvider::new().with_text("I'm sorry, I cannot determine anything from that description."),
    );
    let err = f
        .use_case
        .describe("milk that doesn't spoil after a week outside the fridge", Category::Liquid)
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)));
    assert_eq!(err.exit_code(), 65);
    assert!(f.store.list_all().is_empty());
    assert_eq!(f.kv.raw("safebite_history"), None);
    assert!(f.log.messages().iter().any(|m| m == "analysis failed"));
}

#[test]
fn test_empty_model_response_is_no_response() {
    let f = fixture(StubProvider::new().with_raw(r#"{"candidates":[{"content":{"parts":[]}}]}"#));
    let err = f.use_case.describe("odd smell", Category::Produce).unwrap_err();
    assert!(matches!(err, Error::NoResponse(_)));
    assert!(f.store.list_all().is_empty());
}

#[test]
fn test_http_error_passes_through_without_retry() {
    let f = fixture(
        StubProvider::new()
            .with_error(Error::http("Gemini API error: Resource exhausted"))
            .with_text(ADULTERATED_MILK),
    );
    let err = f.use_case.describe("odd smell", Category::Produce).unwrap_err();
    assert_eq!(err, Error::http("Gemini API error: Resource exhausted"));
    assert_eq!(f.stub.call_count(), 1);
    assert!(f.store.list_all().is_empty());
}

#[test]
fn test_not_configured_fails_before_network() {
    let f = fixture_with_driver(StubProvider::new().with_text(ADULTERATED_MILK), false);
    let err = f.use_case.describe("odd smell", Category::Produce).unwrap_err();
    assert!(matches!(err, Error::NotConfigured(_)));
    assert_eq!(err.exit_code(), 78);
    assert_eq!(f.stub.call_count(), 0);
    assert!(f.store.list_all().is_empty());
}

#[test]
fn test_blank_description_is_rejected_before_network() {
    let f = fixture(StubProvider::new().with_text(ADULTERATED_MILK));
    let err = f.use_case.describe("   ", Category::Produce).unwrap_err();
    assert!(err.is_usage());
    assert_eq!(f.stub.call_count(), 0);
}

#[test]
fn test_text_placeholder_when_sample_name_missing() {
    let body = r#"{"status":"Inconclusive","confidenceScore":55,"adulterants":[],
        "shortTermEffects":"Possible mild nausea","longTermRisks":"Unclear"}"#;
    let f = fixture(StubProvider::new().with_text(body));
    let outcome = f.use_case.describe("bitter aftertaste", Category::Pantry).unwrap();
    assert_eq!(outcome.record.sample_label, TEXT_PLACEHOLDER);
    assert_eq!(outcome.record.category, "Spices & Pantry");
}

#[test]
fn test_scan_image_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chili.PNG");
    std::fs::write(&path, b"ABC").unwrap();

    let body = r#"{"status":"Adulterated","confidenceScore":83.2,
        "adulterants":[{"name":"Sudan I","type":"Dye","isToxic":true,"matchPercentage":66,"description":"Banned dye"}],
        "shortTermEffects":"Allergic reactions","longTermRisks":"Carcinogenic"}"#;
    let f = fixture(StubProvider::new().with_text_and_sources(
        body,
        &["https://a.example/1", "https://b.example/2", "https://a.example/1"],
    ));

    let outcome = f
        .use_case
        .scan(&path, Category::Pantry, Some("unnaturally bright red"))
        .unwrap();
    let record = &outcome.record;
    assert_eq!(record.sample_label, IMAGE_PLACEHOLDER);
    assert_eq!(record.confidence, 83);
    assert_eq!(record.image_ref.as_deref(), Some("data:image/png;base64,QUJD"));
    assert_eq!(
        record.source_refs,
        vec!["https://a.example/1".to_string(), "https://b.example/2".to_string()]
    );
    assert_eq!(f.store.list_all()[0].image_ref, record.image_ref);

    let req = &f.stub.requests()[0];
    let parts = req["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert!(parts[0]["text"]
        .as_str()
        .unwrap()
        .contains("User notes: \"unnaturally bright red\""));
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
    assert_eq!(parts[1]["inlineData"]["data"], "QUJD");
}

#[test]
fn test_scan_unsupported_file_is_rejected_before_network() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"hello").unwrap();
    let f = fixture(StubProvider::new().with_text(ADULTERATED_MILK));
    let err = f.use_case.scan(&path, Category::Liquid, None).unwrap_err();
    assert!(err.is_usage());
    assert_eq!(f.stub.call_count(), 0);
}

#[test]
fn test_submit_image_directly() {
    let stub = Arc::new(StubProvider::new().with_text(ADULTERATED_MILK));
    let c = client(Ok(LlmDriver::new(stub.clone())), Arc::new(MemoryLog::new()));
    let image = ImagePayload::new("image/webp", "UklGRg==");
    let record = c.submit_image(&image, Category::Packaged, None).unwrap();
    assert_eq!(record.category, "Packaged Goods");
    assert_eq!(record.image_ref.as_deref(), Some("data:image/webp;base64,UklGRg=="));
    let prompt = stub.requests()[0]["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("User notes: \"None\""));
}

#[test]
fn test_consecutive_submissions_get_distinct_ids() {
    let f = fixture(
        StubProvider::new()
            .with_text(ADULTERATED_MILK)
            .with_text(ADULTERATED_MILK),
    );
    let a = f.use_case.describe("first", Category::Liquid).unwrap();
    let b = f.use_case.describe("second", Category::Liquid).unwrap();
    assert_ne!(a.record.id, b.record.id);
    let all = f.store.list_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, b.record.id);
}

#[test]
fn test_delete_write_failure_is_not_reported_as_unknown_id() {
    let f = fixture(StubProvider::new().with_text(ADULTERATED_MILK));
    let saved = f.use_case.describe("odd smell", Category::Liquid).unwrap().record;

    f.kv.set_fail_writes(true);
    let err = f.use_case.delete(saved.id.as_str()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(err.exit_code(), 74);
    assert_eq!(f.store.get(saved.id.as_str()).as_ref(), Some(&saved));

    let missing = f.use_case.delete("nope").unwrap();
    assert!(!missing.removed);
    assert_eq!(missing.remaining.len(), 1);

    f.kv.set_fail_writes(false);
    let done = f.use_case.delete(saved.id.as_str()).unwrap();
    assert!(done.removed);
    assert!(done.remaining.is_empty());
}
