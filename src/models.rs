use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event categories.
///
/// `categories::ACCEPTED` is the validator's allow-list; the storage layer
/// additionally admits `OTHER` and `GOOGLE_CALENDAR` for events that did not
/// come out of syllabus extraction.
pub mod categories {
    pub const ASSIGNMENT: &str = "assignment";
    pub const EXAM: &str = "exam";
    pub const QUIZ: &str = "quiz";
    pub const PROJECT: &str = "project";
    pub const READING: &str = "reading";
    pub const DEADLINE: &str = "deadline";
    pub const OTHER: &str = "other";
    pub const GOOGLE_CALENDAR: &str = "google_calendar";

    /// Categories accepted by the extraction-time validator
    pub const ACCEPTED: [&str; 5] = [ASSIGNMENT, EXAM, QUIZ, PROJECT, DEADLINE];
}

/// Provenance tags recording how a stored event was created
pub mod provenance {
    pub const LLM: &str = "llm";
    pub const UPLOAD_WORKFLOW: &str = "upload_workflow";
    pub const GOOGLE_CALENDAR_SYNC: &str = "google_calendar_sync";
    pub const GOOGLE_CALENDAR_IMPORT: &str = "google_calendar_import";
    pub const MANUAL: &str = "manual";
}

/// A candidate event produced by extraction, before validation.
///
/// Field names over the model wire are fixed camelCase; the instruction
/// prompt names them verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvent {
    /// Event title
    pub title: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Category string; validated later against the allow-list
    pub event_type: String,
    /// Due date (YYYY-MM-DD); optional only until validation
    pub due_date: Option<String>,
    /// Due time (HH:MM) if one was stated
    pub due_time: Option<String>,
    /// Extraction confidence in [0.0, 1.0]
    pub confidence_score: f64,
    /// Text snippet that justified the extraction
    pub source_text: String,
}

/// Ownership context for a stored event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ownership {
    /// Owning class id
    pub class_id: String,
    /// Owning user id
    pub user_id: String,
    /// Source syllabus id, if the event came from an upload
    pub syllabus_id: Option<String>,
}

/// A persisted calendar event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCalendarEvent {
    /// Event id
    pub id: String,
    /// Owning class id
    pub class_id: String,
    /// Owning user id
    pub user_id: String,
    /// Source syllabus id, if any
    pub syllabus_id: Option<String>,
    /// Event title
    pub title: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Category string
    pub event_type: String,
    /// Due date (YYYY-MM-DD)
    pub due_date: String,
    /// Due time (HH:MM) if one was stated
    pub due_time: Option<String>,
    /// Extraction confidence, if the event came out of extraction
    pub confidence_score: Option<f64>,
    /// Text snippet that justified the extraction
    pub source_text: Option<String>,
    /// How the event was created (see [`provenance`])
    pub extraction_method: String,
    /// Whether the event has been exported to an external calendar
    pub is_exported: bool,
    /// When the event was last exported
    pub exported_at: Option<DateTime<Utc>>,
    /// iCalendar UID assigned at export time
    pub ics_uid: Option<String>,
    /// When the event was created
    pub created_at: DateTime<Utc>,
}

impl StoredCalendarEvent {
    /// Build a stored event from a validated candidate and its ownership context.
    ///
    /// Export bookkeeping starts cleared; export operations mutate it later.
    pub fn from_candidate(
        candidate: CandidateEvent,
        ownership: &Ownership,
        extraction_method: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            class_id: ownership.class_id.clone(),
            user_id: ownership.user_id.clone(),
            syllabus_id: ownership.syllabus_id.clone(),
            title: candidate.title,
            description: candidate.description,
            event_type: candidate.event_type,
            // Validation guarantees the date is present by this point
            due_date: candidate.due_date.unwrap_or_default(),
            due_time: candidate.due_time,
            confidence_score: Some(candidate.confidence_score),
            source_text: Some(candidate.source_text),
            extraction_method: extraction_method.to_string(),
            is_exported: false,
            exported_at: None,
            ics_uid: None,
            created_at: Utc::now(),
        }
    }
}

/// An academic class owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Class id
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Display name, e.g. "CS 3110"
    pub name: String,
    /// Academic term, e.g. "Fall 2024"
    pub term: Option<String>,
    /// When the class was created
    pub created_at: DateTime<Utc>,
}

impl ClassRecord {
    /// Create a new class record with a fresh id
    pub fn new(user_id: &str, name: &str, term: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            term,
            created_at: Utc::now(),
        }
    }
}

/// An uploaded syllabus associated with a class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyllabusRecord {
    /// Syllabus id
    pub id: String,
    /// Owning class id
    pub class_id: String,
    /// Original file name of the upload
    pub file_name: String,
    /// When the syllabus was uploaded
    pub uploaded_at: DateTime<Utc>,
}

impl SyllabusRecord {
    /// Create a new syllabus record with a fresh id
    pub fn new(class_id: &str, file_name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            class_id: class_id.to_string(),
            file_name: file_name.to_string(),
            uploaded_at: Utc::now(),
        }
    }
}
