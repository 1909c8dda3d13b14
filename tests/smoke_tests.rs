use coursecal::config::{Config, GenerationParams, LlmConfig};
use coursecal::models::{provenance, CandidateEvent, ClassRecord, Ownership, StoredCalendarEvent, SyllabusRecord};
use coursecal::store::{EventFilter, EventStore, InMemoryStore};

fn test_config() -> Config {
    Config {
        llm: LlmConfig {
            endpoint: "http://localhost:0".to_string(),
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: 5,
            generation: GenerationParams::default(),
        },
        redis_url: "redis://127.0.0.1:6379".to_string(),
    }
}

fn stored_event(title: &str, due_date: &str, class_id: &str, user_id: &str) -> StoredCalendarEvent {
    let candidate = CandidateEvent {
        title: title.to_string(),
        description: None,
        event_type: "assignment".to_string(),
        due_date: Some(due_date.to_string()),
        due_time: None,
        confidence_score: 0.9,
        source_text: String::new(),
    };
    let ownership = Ownership {
        class_id: class_id.to_string(),
        user_id: user_id.to_string(),
        syllabus_id: None,
    };
    StoredCalendarEvent::from_candidate(candidate, &ownership, provenance::UPLOAD_WORKFLOW)
}

/// Smoke test to verify the config shape and generation defaults
#[tokio::test]
async fn test_config_defaults() {
    let config = test_config();

    assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
    assert!(config.llm.api_key.is_none());
    // Low-temperature defaults bias toward deterministic extraction
    assert!(config.llm.generation.temperature <= 0.2);
    assert!(config.llm.generation.max_output_tokens > 0);
}

/// Class CRUD round-trip through the in-memory store
#[tokio::test]
async fn test_class_crud() {
    let store = InMemoryStore::default();

    let class = ClassRecord::new("user-1", "CS 3110", Some("Fall 2024".to_string()));
    store.create_class(&class).await.unwrap();

    let fetched = store.get_class(&class.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "CS 3110");
    assert_eq!(fetched.term.as_deref(), Some("Fall 2024"));

    let listed = store.list_classes("user-1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(store.list_classes("someone-else").await.unwrap().is_empty());

    store.delete_class(&class.id).await.unwrap();
    assert!(store.get_class(&class.id).await.unwrap().is_none());
}

/// Deleting a class removes its syllabi and events too
#[tokio::test]
async fn test_delete_class_cascades() {
    let store = InMemoryStore::default();

    let class = ClassRecord::new("user-1", "Algorithms", None);
    store.create_class(&class).await.unwrap();

    let syllabus = SyllabusRecord::new(&class.id, "syllabus.pdf");
    store.create_syllabus(&syllabus).await.unwrap();

    let events = vec![stored_event("PS1", "2024-09-15", &class.id, "user-1")];
    store.insert_events(&events).await.unwrap();

    store.delete_class(&class.id).await.unwrap();

    assert!(store.list_syllabi(&class.id).await.unwrap().is_empty());
    let remaining = store
        .list_events(&EventFilter::for_class(&class.id))
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

/// Event listing is ordered and honors the date-range filter
#[tokio::test]
async fn test_event_listing_order_and_range() {
    let store = InMemoryStore::default();

    let events = vec![
        stored_event("Late", "2024-12-01", "class-1", "user-1"),
        stored_event("Early", "2024-09-01", "class-1", "user-1"),
        stored_event("Middle", "2024-10-15", "class-1", "user-1"),
        stored_event("Other class", "2024-10-15", "class-2", "user-1"),
    ];
    store.insert_events(&events).await.unwrap();

    let listed = store
        .list_events(&EventFilter::for_class("class-1"))
        .await
        .unwrap();
    let titles: Vec<&str> = listed.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Early", "Middle", "Late"]);

    let ranged = store
        .list_events(&EventFilter::for_class("class-1").between("2024-09-15", "2024-11-01"))
        .await
        .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].title, "Middle");

    // The user filter spans both classes
    let by_user = store
        .list_events(&EventFilter::for_user("user-1"))
        .await
        .unwrap();
    assert_eq!(by_user.len(), 4);

    // A filter naming neither a class nor a user is an error
    assert!(store.list_events(&EventFilter::default()).await.is_err());
}

/// Updating an unknown event is a storage error
#[tokio::test]
async fn test_update_requires_existing_event() {
    let store = InMemoryStore::default();
    let event = stored_event("PS1", "2024-09-15", "class-1", "user-1");
    assert!(store.update_events(&[event]).await.is_err());
}
