use crate::models::CandidateEvent;
use std::collections::HashSet;
use tracing::debug;

/// Collapse candidates that share a normalized (title, date) key.
///
/// Key = lowercased title + "-" + exact due-date string. The first
/// occurrence in input order wins; later events with an identical key are
/// dropped regardless of differing description, time, or confidence.
/// Exact-match policy only: trailing punctuation, paraphrased titles, and
/// other near-duplicates are not merged.
pub fn dedupe_events(events: Vec<CandidateEvent>) -> Vec<CandidateEvent> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| {
            let key = format!(
                "{}-{}",
                event.title.to_lowercase(),
                event.due_date.as_deref().unwrap_or("")
            );
            if seen.insert(key) {
                true
            } else {
                debug!("Dropping duplicate candidate '{}'", event.title);
                false
            }
        })
        .collect()
}
