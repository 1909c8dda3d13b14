mod redis;

pub use self::redis::RedisStore;

use crate::error::{storage_error, CalResult};
use crate::models::{ClassRecord, StoredCalendarEvent, SyllabusRecord};
use async_trait::async_trait;
use std::collections::HashMap;

/// Filter for event queries.
///
/// A filter must name at least a class or a user; results are ordered by
/// due date, then due time.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Restrict to a class
    pub class_id: Option<String>,
    /// Restrict to a user
    pub user_id: Option<String>,
    /// Inclusive lower bound on due date (YYYY-MM-DD)
    pub from_date: Option<String>,
    /// Inclusive upper bound on due date (YYYY-MM-DD)
    pub to_date: Option<String>,
}

impl EventFilter {
    /// Filter for all events of a class
    pub fn for_class(class_id: &str) -> Self {
        Self {
            class_id: Some(class_id.to_string()),
            ..Default::default()
        }
    }

    /// Filter for all events of a user
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    /// Restrict the filter to a due-date range
    pub fn between(mut self, from_date: &str, to_date: &str) -> Self {
        self.from_date = Some(from_date.to_string());
        self.to_date = Some(to_date.to_string());
        self
    }

    fn matches(&self, event: &StoredCalendarEvent) -> bool {
        if let Some(class_id) = &self.class_id {
            if &event.class_id != class_id {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if &event.user_id != user_id {
                return false;
            }
        }
        if let Some(from_date) = &self.from_date {
            if &event.due_date < from_date {
                return false;
            }
        }
        if let Some(to_date) = &self.to_date {
            if &event.due_date > to_date {
                return false;
            }
        }
        true
    }
}

/// Sort events by due date, then due time
fn sort_by_due(events: &mut [StoredCalendarEvent]) {
    events.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.due_time.cmp(&b.due_time))
    });
}

/// Storage trait for classes, syllabi and calendar events.
///
/// `insert_events` must be all-or-nothing: a partial failure is a total
/// failure of the batch, never silently dropped rows.
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Insert a batch of events; returns the inserted rows
    async fn insert_events(
        &self,
        events: &[StoredCalendarEvent],
    ) -> CalResult<Vec<StoredCalendarEvent>>;

    /// Write back existing events (export/sync bookkeeping updates)
    async fn update_events(&self, events: &[StoredCalendarEvent]) -> CalResult<()>;

    /// List events matching a filter, ordered by due date then due time
    async fn list_events(&self, filter: &EventFilter) -> CalResult<Vec<StoredCalendarEvent>>;

    /// Create a class
    async fn create_class(&self, class: &ClassRecord) -> CalResult<()>;

    /// Get a class by id
    async fn get_class(&self, class_id: &str) -> CalResult<Option<ClassRecord>>;

    /// List all classes of a user
    async fn list_classes(&self, user_id: &str) -> CalResult<Vec<ClassRecord>>;

    /// Delete a class along with its syllabi and events
    async fn delete_class(&self, class_id: &str) -> CalResult<()>;

    /// Record an uploaded syllabus
    async fn create_syllabus(&self, syllabus: &SyllabusRecord) -> CalResult<()>;

    /// List syllabi uploaded for a class
    async fn list_syllabi(&self, class_id: &str) -> CalResult<Vec<SyllabusRecord>>;
}

/// In-memory implementation of the store (for testing)
#[derive(Debug, Default)]
pub struct InMemoryStore {
    classes: tokio::sync::RwLock<HashMap<String, ClassRecord>>,
    syllabi: tokio::sync::RwLock<HashMap<String, SyllabusRecord>>,
    events: tokio::sync::RwLock<HashMap<String, StoredCalendarEvent>>,
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn insert_events(
        &self,
        events: &[StoredCalendarEvent],
    ) -> CalResult<Vec<StoredCalendarEvent>> {
        let mut map = self.events.write().await;
        for event in events {
            map.insert(event.id.clone(), event.clone());
        }
        Ok(events.to_vec())
    }

    async fn update_events(&self, events: &[StoredCalendarEvent]) -> CalResult<()> {
        let mut map = self.events.write().await;
        for event in events {
            if !map.contains_key(&event.id) {
                return Err(storage_error(&format!("Unknown event id: {}", event.id)));
            }
            map.insert(event.id.clone(), event.clone());
        }
        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter) -> CalResult<Vec<StoredCalendarEvent>> {
        if filter.class_id.is_none() && filter.user_id.is_none() {
            return Err(storage_error("Event filter must name a class or a user"));
        }
        let map = self.events.read().await;
        let mut events: Vec<StoredCalendarEvent> = map
            .values()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        sort_by_due(&mut events);
        Ok(events)
    }

    async fn create_class(&self, class: &ClassRecord) -> CalResult<()> {
        let mut map = self.classes.write().await;
        map.insert(class.id.clone(), class.clone());
        Ok(())
    }

    async fn get_class(&self, class_id: &str) -> CalResult<Option<ClassRecord>> {
        let map = self.classes.read().await;
        Ok(map.get(class_id).cloned())
    }

    async fn list_classes(&self, user_id: &str) -> CalResult<Vec<ClassRecord>> {
        let map = self.classes.read().await;
        let mut classes: Vec<ClassRecord> = map
            .values()
            .filter(|class| class.user_id == user_id)
            .cloned()
            .collect();
        classes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(classes)
    }

    async fn delete_class(&self, class_id: &str) -> CalResult<()> {
        self.classes.write().await.remove(class_id);
        self.syllabi
            .write()
            .await
            .retain(|_, syllabus| syllabus.class_id != class_id);
        self.events
            .write()
            .await
            .retain(|_, event| event.class_id != class_id);
        Ok(())
    }

    async fn create_syllabus(&self, syllabus: &SyllabusRecord) -> CalResult<()> {
        let mut map = self.syllabi.write().await;
        map.insert(syllabus.id.clone(), syllabus.clone());
        Ok(())
    }

    async fn list_syllabi(&self, class_id: &str) -> CalResult<Vec<SyllabusRecord>> {
        let map = self.syllabi.read().await;
        let mut syllabi: Vec<SyllabusRecord> = map
            .values()
            .filter(|syllabus| syllabus.class_id == class_id)
            .cloned()
            .collect();
        syllabi.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
        Ok(syllabi)
    }
}
