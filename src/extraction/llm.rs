use crate::config::LlmConfig;
use crate::error::{extraction_service_error, CalResult};
use crate::models::{categories, CandidateEvent};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Instruction block prepended to the syllabus text.
///
/// This block is authoritative: it fixes the output field names, the
/// allowed categories, and the extraction rules.
const INSTRUCTION_PROMPT: &str = r#"You are a syllabus analyzer. Extract every calendar event (assignments, exams, quizzes, projects, readings, deadlines) from the course syllabus text below.

Respond with a JSON array ONLY. No prose, no explanations, no markdown fences: the response must start with `[` and end with `]`.

Each element of the array must be an object with exactly these fields:
  "title": short name of the event
  "description": one-sentence description, or null if the text gives none
  "eventType": one of "assignment", "exam", "quiz", "project", "reading", "deadline"
  "dueDate": the calendar date in YYYY-MM-DD format
  "dueTime": the time of day in 24-hour HH:MM format, or null if the text gives none
  "confidenceScore": a number between 0.0 and 1.0
  "sourceText": the exact text snippet the event was extracted from

Rules:
- Only extract events with an explicit, resolvable calendar date. Exclude relative or vague references like "the second Tuesday" or "Week 3" unless the text anchors them to a real date.
- confidenceScore must reflect genuine certainty. Ambiguous matches get low scores; do not omit them unless no date can be resolved at all.

Syllabus text:
"#;

/// Request body for the generateContent call
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

/// Response shape: candidates -> content -> parts -> text
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Raw event element as returned by the model, before coercion
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtractedEvent {
    title: Option<String>,
    description: Option<String>,
    event_type: Option<String>,
    due_date: Option<String>,
    due_time: Option<String>,
    confidence_score: Option<f64>,
    source_text: Option<String>,
}

/// Extract candidate events by asking the language-model service.
///
/// Sends one request with the instruction prompt and the full syllabus
/// text, with a bounded timeout; an unresponsive upstream must not hang
/// the pipeline indefinitely.
pub async fn extract_with_llm(text: &str, config: &LlmConfig) -> CalResult<Vec<CandidateEvent>> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| extraction_service_error("No API key configured"))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| extraction_service_error(&format!("Failed to build HTTP client: {}", e)))?;

    let url_str = format!(
        "{}/models/{}:generateContent",
        config.endpoint.trim_end_matches('/'),
        config.model
    );
    let url = Url::parse_with_params(&url_str, &[("key", api_key)])
        .map_err(|e| extraction_service_error(&format!("Failed to build request URL: {}", e)))?;

    let body = GenerateRequest {
        contents: vec![RequestContent {
            parts: vec![RequestPart {
                text: format!("{}{}", INSTRUCTION_PROMPT, text),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: config.generation.temperature,
            top_k: config.generation.top_k,
            top_p: config.generation.top_p,
            max_output_tokens: config.generation.max_output_tokens,
        },
    };

    debug!("Sending extraction request to {}", config.model);

    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .map_err(|e| extraction_service_error(&format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response.text().await.unwrap_or_default();
        return Err(extraction_service_error(&format!(
            "Service returned error: Status {}, Body: {}",
            status, error_body
        )));
    }

    let response: GenerateResponse = response
        .json()
        .await
        .map_err(|e| extraction_service_error(&format!("Failed to parse response: {}", e)))?;

    let response_text = response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.as_str())
        .ok_or_else(|| extraction_service_error("Response contained no candidate text"))?;

    info!("Received response from language model");

    let raw_events = parse_json_from_response(response_text)?;
    Ok(raw_events.into_iter().map(coerce_event).collect())
}

/// Find and parse the first JSON array literal in the model response.
///
/// The model is told to respond with bare JSON, but responses sometimes
/// arrive wrapped in prose; the substring between the first `[` and the
/// last `]` is parsed instead of the whole text.
fn parse_json_from_response(response: &str) -> CalResult<Vec<RawExtractedEvent>> {
    if let (Some(start_idx), Some(end_idx)) = (response.find('['), response.rfind(']')) {
        if start_idx < end_idx {
            let json_str = &response[start_idx..=end_idx];
            return from_str::<Vec<RawExtractedEvent>>(json_str).map_err(|e| {
                extraction_service_error(&format!("Failed to parse extracted JSON array: {}", e))
            });
        }
    }
    Err(extraction_service_error(
        "No JSON array found in model response",
    ))
}

/// Coerce a raw element into a candidate event, defaulting missing fields.
///
/// dueDate and dueTime pass through unmodified; a missing dueDate is
/// accepted here and rejected later by validation.
fn coerce_event(raw: RawExtractedEvent) -> CandidateEvent {
    CandidateEvent {
        title: raw.title.unwrap_or_else(|| "Unknown Event".to_string()),
        description: raw.description,
        event_type: raw
            .event_type
            .unwrap_or_else(|| categories::DEADLINE.to_string()),
        due_date: raw.due_date,
        due_time: raw.due_time,
        confidence_score: raw.confidence_score.unwrap_or(0.5),
        source_text: raw.source_text.unwrap_or_default(),
    }
}
