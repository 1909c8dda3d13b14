use crate::models::{categories, CandidateEvent};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// Confidence assigned to every pattern-derived event
const FALLBACK_CONFIDENCE: f64 = 0.7;

lazy_static! {
    /// keyword, title segment, "September 15, 2024"
    static ref MONTH_DAY_YEAR: Regex = Regex::new(
        r"(?i)\b(final\s+exam|midterm|assignment|exam|quiz|project|deadline|due)\b[:\s]*([^\n]{0,100}?)[\s:,\-]*\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})"
    ).expect("Failed to compile month-day-year pattern");

    /// keyword, title segment, "09/15/2024"
    static ref NUMERIC_DATE: Regex = Regex::new(
        r"(?i)\b(final\s+exam|midterm|assignment|exam|quiz|project|deadline|due)\b[:\s]*([^\n]{0,100}?)[\s:,\-]*\b(\d{1,2})/(\d{1,2})/(\d{4})"
    ).expect("Failed to compile numeric-date pattern");

    /// keyword, title segment, "Sep 15" with no year
    static ref ABBREV_MONTH_DAY: Regex = Regex::new(
        r"(?i)\b(final\s+exam|midterm|assignment|exam|quiz|project|deadline|due)\b[:\s]*([^\n]{0,100}?)[\s:,\-]*\b(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b"
    ).expect("Failed to compile abbreviated-month pattern");
}

/// Extract candidate events with the fixed regex battery.
///
/// Best effort only: the battery may produce zero, duplicate, or
/// overlapping matches when several patterns hit the same text span.
/// Exact (title, date) repeats are collapsed downstream by deduplication;
/// overlapping-but-differently-worded matches are not.
pub fn extract_with_patterns(text: &str) -> Vec<CandidateEvent> {
    let mut events = Vec::new();

    for caps in MONTH_DAY_YEAR.captures_iter(text) {
        let month = month_number(&caps[3]);
        let day = caps[4].parse::<u32>().ok();
        let year = caps[5].parse::<i32>().ok();
        push_match(&mut events, &caps, month, day, year);
    }

    for caps in NUMERIC_DATE.captures_iter(text) {
        let month = caps[3].parse::<u32>().ok();
        let day = caps[4].parse::<u32>().ok();
        let year = caps[5].parse::<i32>().ok();
        push_match(&mut events, &caps, month, day, year);
    }

    for caps in ABBREV_MONTH_DAY.captures_iter(text) {
        let month = month_number(&caps[3]);
        let day = caps[4].parse::<u32>().ok();
        // No year in this form, so the date never resolves
        push_match(&mut events, &caps, month, day, None);
    }

    events
}

/// Append one event for a pattern match, or drop it silently when the
/// date does not resolve to a real calendar day.
fn push_match(
    events: &mut Vec<CandidateEvent>,
    caps: &regex::Captures<'_>,
    month: Option<u32>,
    day: Option<u32>,
    year: Option<i32>,
) {
    let full_match = caps.get(0).map(|m| m.as_str()).unwrap_or("");

    let date = match resolve_date(month, day, year) {
        Some(date) => date,
        None => {
            debug!("Discarding pattern match without a resolvable date: {}", full_match);
            return;
        }
    };

    let keyword = &caps[1];
    let title = build_title(keyword, &caps[2]);

    events.push(CandidateEvent {
        title,
        description: None,
        event_type: category_for_keyword(keyword).to_string(),
        due_date: Some(date.format("%Y-%m-%d").to_string()),
        due_time: None,
        confidence_score: FALLBACK_CONFIDENCE,
        source_text: full_match.to_string(),
    });
}

/// Resolve numeric parts into a calendar date; None when the year is
/// missing or the parts do not form a real day
fn resolve_date(month: Option<u32>, day: Option<u32>, year: Option<i32>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year?, month?, day?)
}

/// Map a month name or abbreviation to its number
fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let number = match &lower[..3.min(lower.len())] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}

/// Derive the event category from the matched keyword.
///
/// Precedence: exam/final/midterm, then quiz, then project, then
/// assignment; everything else (deadline, due) is a deadline.
fn category_for_keyword(keyword: &str) -> &'static str {
    let lower = keyword.to_lowercase();
    if lower.contains("exam") || lower.contains("final") || lower.contains("midterm") {
        categories::EXAM
    } else if lower.contains("quiz") {
        categories::QUIZ
    } else if lower.contains("project") {
        categories::PROJECT
    } else if lower.contains("assignment") {
        categories::ASSIGNMENT
    } else {
        categories::DEADLINE
    }
}

/// Combine the keyword and the free-text segment into an event title
fn build_title(keyword: &str, segment: &str) -> String {
    let combined = format!("{} {}", keyword, segment);
    combined
        .trim()
        .trim_matches(|c: char| c.is_whitespace() || ":;,.-".contains(c))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_month_day_year_assignment() {
        let events = extract_with_patterns("Assignment due: September 15, 2024");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "assignment");
        assert_eq!(events[0].due_date.as_deref(), Some("2024-09-15"));
        assert_eq!(events[0].confidence_score, 0.7);
        assert!(events[0].due_time.is_none());
    }

    #[test]
    fn extracts_numeric_date() {
        let events = extract_with_patterns("Quiz 2 on 10/03/2024 covers chapters 4-6.");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "quiz");
        assert_eq!(events[0].due_date.as_deref(), Some("2024-10-03"));
    }

    #[test]
    fn abbreviated_month_without_year_is_discarded() {
        let events = extract_with_patterns("Project proposal due Sep 20");
        assert!(events.is_empty());
    }

    #[test]
    fn impossible_date_is_discarded() {
        let events = extract_with_patterns("Exam on 13/45/2024 in the main hall");
        assert!(events.is_empty());
    }

    #[test]
    fn final_exam_and_midterm_categorize_as_exam() {
        let events = extract_with_patterns(
            "Midterm: October 1, 2024\nFinal exam December 12, 2024",
        );
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.event_type == "exam"));
    }

    #[test]
    fn due_keyword_defaults_to_deadline() {
        let events = extract_with_patterns("Peer reviews due November 5, 2024");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "deadline");
    }

    #[test]
    fn title_combines_keyword_and_segment() {
        let events = extract_with_patterns("Assignment due: September 15, 2024");
        assert_eq!(events[0].title, "Assignment due");

        let events = extract_with_patterns("Midterm: October 1, 2024");
        assert_eq!(events[0].title, "Midterm");
    }

    #[test]
    fn source_text_carries_the_full_match() {
        let events = extract_with_patterns("Assignment due: September 15, 2024");
        assert!(events[0].source_text.contains("September 15, 2024"));
    }

    #[test]
    fn text_without_dates_yields_nothing() {
        let events = extract_with_patterns("Office hours are by appointment only.");
        assert!(events.is_empty());
    }
}
