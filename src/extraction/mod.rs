mod fallback;
mod llm;

pub use self::fallback::extract_with_patterns;
pub use self::llm::extract_with_llm;

use crate::config::LlmConfig;
use crate::models::CandidateEvent;
use tracing::{info, warn};

/// Extract candidate events from raw document text.
///
/// The primary path sends the text to the language-model service. Any
/// failure there (network, non-success status, missing credential,
/// malformed response) falls over to the regex battery. This function
/// never fails: an empty list means "no events found".
pub async fn extract_events(text: &str, config: &LlmConfig) -> Vec<CandidateEvent> {
    match llm::extract_with_llm(text, config).await {
        Ok(events) => {
            info!("Language model extracted {} candidate event(s)", events.len());
            events
        }
        Err(e) => {
            warn!("Language-model extraction failed ({}), using pattern fallback", e);
            let events = fallback::extract_with_patterns(text);
            info!("Pattern fallback extracted {} candidate event(s)", events.len());
            events
        }
    }
}
