use crate::models::{categories, CandidateEvent};
use chrono::NaiveDate;
use tracing::debug;

/// Filter out malformed candidate events.
///
/// Pure stable filter: surviving elements are unchanged and keep their
/// input order. An event is rejected when its title is empty, its due
/// date is missing or not a real calendar date, its category is outside
/// the allow-list, or its confidence score is out of range.
///
/// The allow-list intentionally excludes "reading" even though the
/// extraction prompt permits it; candidates in that category are
/// filtered here.
pub fn validate_events(events: Vec<CandidateEvent>) -> Vec<CandidateEvent> {
    events
        .into_iter()
        .filter(|event| match check_event(event) {
            Ok(()) => true,
            Err(reason) => {
                debug!("Rejecting candidate '{}': {}", event.title, reason);
                false
            }
        })
        .collect()
}

/// Validation predicate for a single candidate
fn check_event(event: &CandidateEvent) -> Result<(), &'static str> {
    if event.title.trim().is_empty() {
        return Err("missing title");
    }

    let due_date = event.due_date.as_deref().ok_or("missing due date")?;
    if NaiveDate::parse_from_str(due_date, "%Y-%m-%d").is_err() {
        return Err("due date is not a valid calendar date");
    }

    if !categories::ACCEPTED.contains(&event.event_type.as_str()) {
        return Err("category outside the accepted set");
    }

    if !(0.0..=1.0).contains(&event.confidence_score) {
        return Err("confidence score out of range");
    }

    Ok(())
}
