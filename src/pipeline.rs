use crate::config::LlmConfig;
use crate::dedupe::dedupe_events;
use crate::document::extract_document_text;
use crate::error::CalResult;
use crate::extraction::extract_events;
use crate::models::{Ownership, StoredCalendarEvent};
use crate::store::EventStore;
use crate::validate::validate_events;
use tracing::info;

/// Result of one syllabus processing run
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Number of events written to the store
    pub saved_count: usize,
    /// The stored events
    pub events: Vec<StoredCalendarEvent>,
}

impl ExtractionOutcome {
    fn empty() -> Self {
        Self {
            saved_count: 0,
            events: Vec::new(),
        }
    }
}

/// Run the full extraction pipeline for one uploaded syllabus.
///
/// Acquisition, extraction, validation, deduplication and the batch
/// write run in sequence; presentation reads the store independently.
/// An unsupported document type or an unreadable document fails before
/// any extraction runs. An empty result after both extraction paths is
/// "no events found", not an error; only storage failures surface once
/// extraction has produced events.
pub async fn process_syllabus<S: EventStore>(
    store: &S,
    llm: &LlmConfig,
    bytes: &[u8],
    content_type: &str,
    ownership: &Ownership,
    extraction_method: &str,
) -> CalResult<ExtractionOutcome> {
    let text = extract_document_text(bytes, content_type)?;

    if text.is_empty() {
        // No embedded text layer; nothing to extract
        info!("Document produced no text, saving no events");
        return Ok(ExtractionOutcome::empty());
    }

    let candidates = extract_events(&text, llm).await;
    let validated = validate_events(candidates);
    let deduped = dedupe_events(validated);

    if deduped.is_empty() {
        info!("No events found in document");
        return Ok(ExtractionOutcome::empty());
    }

    let stored: Vec<StoredCalendarEvent> = deduped
        .into_iter()
        .map(|candidate| StoredCalendarEvent::from_candidate(candidate, ownership, extraction_method))
        .collect();

    let events = store.insert_events(&stored).await?;

    info!(
        "Extracted and saved {} event(s) for class {}",
        events.len(),
        ownership.class_id
    );

    Ok(ExtractionOutcome {
        saved_count: events.len(),
        events,
    })
}
