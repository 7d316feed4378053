use std::sync::Arc;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::keywords::{matched_phrases, EMERGENCY_PATTERNS, MEDICAL_PATTERNS, NON_MEDICAL_PATTERNS};
use crate::config::LlmSettings;
use crate::models::enums::{ClassificationSource, Intent};
use crate::models::{ClassificationResult, PatientContext};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Cannot connect to LLM at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("LLM returned error (status {status}): {body}")]
    LlmStatus { status: u16, body: String },

    #[error("Failed to parse LLM response: {0}")]
    ResponseParsing(String),

    #[error("Unknown intent category: {0}")]
    UnknownCategory(String),
}

/// Maps free text to an intent.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        patient: &PatientContext,
    ) -> Result<ClassificationResult, ClassifierError>;
}

// ── Keyword ─────────────────────────────────────────────────

/// Phrase-table classifier. Never fails; unknown text defaults to MEDICAL.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn classify_text(&self, text: &str) -> ClassificationResult {
        let emergency = matched_phrases(&EMERGENCY_PATTERNS, text);
        if !emergency.is_empty() {
            return ClassificationResult::new(Intent::Emergency, 0.99, ClassificationSource::Keyword)
                .with_keywords(emergency);
        }

        let medical = matched_phrases(&MEDICAL_PATTERNS, text);
        if !medical.is_empty() {
            return ClassificationResult::new(Intent::Medical, 0.85, ClassificationSource::Keyword)
                .with_keywords(medical);
        }

        let non_medical = matched_phrases(&NON_MEDICAL_PATTERNS, text);
        if !non_medical.is_empty() {
            return ClassificationResult::new(
                Intent::NonMedical,
                0.90,
                ClassificationSource::Keyword,
            )
            .with_keywords(non_medical);
        }

        // Unrecognized requests go to staff.
        ClassificationResult::new(Intent::Medical, 0.60, ClassificationSource::Keyword)
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(
        &self,
        text: &str,
        _patient: &PatientContext,
    ) -> Result<ClassificationResult, ClassifierError> {
        Ok(self.classify_text(text))
    }
}

// ── LLM ─────────────────────────────────────────────────────

const CLASSIFY_SYSTEM_PROMPT: &str = "You classify hospital patient requests. \
Answer with JSON only: {\"category\": \"NON_MEDICAL\" | \"MEDICAL\" | \"EMERGENCY\", \"confidence\": 0.0-1.0}. \
EMERGENCY: life-threatening symptoms. MEDICAL: health-related requests that need staff. \
NON_MEDICAL: comfort, information, or environment requests.";

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    format: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct LlmClassification {
    category: String,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Classifier backed by an Ollama-compatible model server.
pub struct LlmClassifier {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl LlmClassifier {
    pub fn new(settings: &LlmSettings) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            client,
            timeout_secs: settings.timeout_secs,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, ClassifierError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system: CLASSIFY_SYSTEM_PROMPT,
            format: "json",
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ClassifierError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ClassifierError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ClassifierError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::LlmStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::ResponseParsing(e.to_string()))?;
        Ok(parsed.response)
    }
}

/// Parse the model's `{category, confidence}` answer. Tolerates prose around
/// the JSON object.
pub(crate) fn parse_llm_classification(raw: &str) -> Result<ClassificationResult, ClassifierError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &raw[s..=e],
        _ => return Err(ClassifierError::ResponseParsing("no JSON object in response".into())),
    };

    let parsed: LlmClassification =
        serde_json::from_str(json).map_err(|e| ClassifierError::ResponseParsing(e.to_string()))?;
    let category = parsed.category.trim().to_uppercase();
    let intent = Intent::from_str(&category)
        .map_err(|_| ClassifierError::UnknownCategory(parsed.category.clone()))?;

    Ok(ClassificationResult::new(
        intent,
        parsed.confidence.unwrap_or(0.75),
        ClassificationSource::Llm,
    ))
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(
        &self,
        text: &str,
        _patient: &PatientContext,
    ) -> Result<ClassificationResult, ClassifierError> {
        let prompt = format!("Patient request: \"{text}\"");
        let raw = self.generate(&prompt).await?;
        parse_llm_classification(&raw)
    }
}

// ── Hybrid ──────────────────────────────────────────────────

/// Keyword screen first, optional model second.
///
/// A keyword EMERGENCY returns without consulting the model. Otherwise an
/// EMERGENCY from either side wins, and when the keyword table recognised the
/// request the more severe intent is kept. A model failure falls back to the
/// keyword result.
pub struct HybridClassifier {
    keywords: KeywordClassifier,
    llm: Option<Arc<dyn IntentClassifier>>,
}

impl HybridClassifier {
    pub fn keyword_only() -> Self {
        Self {
            keywords: KeywordClassifier,
            llm: None,
        }
    }

    pub fn with_llm(llm: Arc<dyn IntentClassifier>) -> Self {
        Self {
            keywords: KeywordClassifier,
            llm: Some(llm),
        }
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }
}

#[async_trait]
impl IntentClassifier for HybridClassifier {
    async fn classify(
        &self,
        text: &str,
        patient: &PatientContext,
    ) -> Result<ClassificationResult, ClassifierError> {
        let keyword = self.keywords.classify_text(text);
        if keyword.intent == Intent::Emergency {
            return Ok(keyword);
        }

        let Some(llm) = &self.llm else {
            return Ok(keyword);
        };

        match llm.classify(text, patient).await {
            Ok(model) => {
                if model.intent == Intent::Emergency || keyword.matched_keywords.is_empty() {
                    return Ok(model);
                }
                if keyword.intent > model.intent {
                    Ok(keyword)
                } else {
                    Ok(model)
                }
            }
            Err(e) => {
                tracing::warn!(
                    patient_id = %patient.id,
                    error = %e,
                    "LLM classification failed, using keyword result"
                );
                Ok(keyword)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> PatientContext {
        PatientContext {
            id: "P001".into(),
            medications: vec![],
            allergies: vec![],
            assigned_nurse_id: "NURSE_001".into(),
            assigned_physician_id: "DR_001".into(),
        }
    }

    /// Scripted model answer.
    struct FixedLlm(Result<Intent, ()>);

    #[async_trait]
    impl IntentClassifier for FixedLlm {
        async fn classify(
            &self,
            _text: &str,
            _patient: &PatientContext,
        ) -> Result<ClassificationResult, ClassifierError> {
            match self.0 {
                Ok(intent) => Ok(ClassificationResult::new(intent, 0.8, ClassificationSource::Llm)),
                Err(()) => Err(ClassifierError::Connection("http://localhost:11434".into())),
            }
        }
    }

    // ── Keyword ────────────────────────────────────────────────

    #[test]
    fn emergency_phrases_win() {
        let r = KeywordClassifier.classify_text("I have chest pain and need water");
        assert_eq!(r.intent, Intent::Emergency);
        assert_eq!(r.confidence, 0.99);
        assert_eq!(r.matched_keywords, vec!["chest pain"]);
    }

    #[test]
    fn medical_keywords_beat_comfort_keywords() {
        let r = KeywordClassifier.classify_text("my head hurts, can I have some water");
        assert_eq!(r.intent, Intent::Medical);
        assert_eq!(r.confidence, 0.85);
    }

    #[test]
    fn comfort_requests_are_non_medical() {
        let r = KeywordClassifier.classify_text("Can you turn on the TV?");
        assert_eq!(r.intent, Intent::NonMedical);
        assert_eq!(r.confidence, 0.90);
        assert_eq!(r.source, ClassificationSource::Keyword);
    }

    #[test]
    fn unknown_text_defaults_to_medical() {
        let r = KeywordClassifier.classify_text("xyzzy");
        assert_eq!(r.intent, Intent::Medical);
        assert_eq!(r.confidence, 0.60);
        assert!(r.matched_keywords.is_empty());
    }

    // ── LLM parsing ────────────────────────────────────────────

    #[test]
    fn parses_plain_json_answer() {
        let r = parse_llm_classification(r#"{"category": "NON_MEDICAL", "confidence": 0.93}"#).unwrap();
        assert_eq!(r.intent, Intent::NonMedical);
        assert_eq!(r.source, ClassificationSource::Llm);
        assert!((r.confidence - 0.93).abs() < 1e-6);
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let r = parse_llm_classification("Sure: {\"category\": \"emergency\"} done").unwrap();
        assert_eq!(r.intent, Intent::Emergency);
    }

    #[test]
    fn rejects_unknown_category() {
        let err = parse_llm_classification(r#"{"category": "URGENT"}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::UnknownCategory(_)));
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_llm_classification("I think it is medical"),
            Err(ClassifierError::ResponseParsing(_))
        ));
    }

    // ── Hybrid ─────────────────────────────────────────────────

    #[tokio::test]
    async fn keyword_emergency_skips_model() {
        let hybrid = HybridClassifier::with_llm(Arc::new(FixedLlm(Ok(Intent::NonMedical))));
        let r = hybrid.classify("he is choking", &patient()).await.unwrap();
        assert_eq!(r.intent, Intent::Emergency);
        assert_eq!(r.source, ClassificationSource::Keyword);
    }

    #[tokio::test]
    async fn model_emergency_wins() {
        let hybrid = HybridClassifier::with_llm(Arc::new(FixedLlm(Ok(Intent::Emergency))));
        let r = hybrid.classify("I feel strange in my arm", &patient()).await.unwrap();
        assert_eq!(r.intent, Intent::Emergency);
        assert_eq!(r.source, ClassificationSource::Llm);
    }

    #[tokio::test]
    async fn recognised_medical_is_not_downgraded() {
        let hybrid = HybridClassifier::with_llm(Arc::new(FixedLlm(Ok(Intent::NonMedical))));
        let r = hybrid.classify("my medication is late", &patient()).await.unwrap();
        assert_eq!(r.intent, Intent::Medical);
    }

    #[tokio::test]
    async fn model_decides_unrecognised_text() {
        let hybrid = HybridClassifier::with_llm(Arc::new(FixedLlm(Ok(Intent::NonMedical))));
        let r = hybrid.classify("could you read me the news", &patient()).await.unwrap();
        assert_eq!(r.intent, Intent::NonMedical);
        assert_eq!(r.source, ClassificationSource::Llm);
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_keywords() {
        let hybrid = HybridClassifier::with_llm(Arc::new(FixedLlm(Err(()))));
        let r = hybrid.classify("turn off the lights", &patient()).await.unwrap();
        assert_eq!(r.intent, Intent::NonMedical);
        assert_eq!(r.source, ClassificationSource::Keyword);
    }

    #[tokio::test]
    async fn keyword_only_never_calls_out() {
        let hybrid = HybridClassifier::keyword_only();
        assert!(!hybrid.has_llm());
        let r = hybrid.classify("turn off the lights", &patient()).await.unwrap();
        assert_eq!(r.intent, Intent::NonMedical);
    }
}
