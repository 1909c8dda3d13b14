use super::{sort_by_due, EventFilter, EventStore};
use crate::error::{storage_error, CalResult};
use crate::models::{ClassRecord, StoredCalendarEvent, SyllabusRecord};
use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tracing::{info, warn};

/// Redis key layout
mod keys {
    pub const CLASS_PREFIX: &str = "class:";
    pub const USER_CLASSES_PREFIX: &str = "classes:user:";
    pub const EVENT_PREFIX: &str = "event:";
    pub const CLASS_EVENTS_PREFIX: &str = "events:class:";
    pub const USER_EVENTS_PREFIX: &str = "events:user:";
    pub const SYLLABUS_PREFIX: &str = "syllabus:";
    pub const CLASS_SYLLABI_PREFIX: &str = "syllabi:class:";
}

/// Redis-backed store implementation
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    /// Create a new store for the given Redis URL
    pub fn new(redis_url: &str) -> CalResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = RedisClient::open(redis_url)
            .map_err(|e| storage_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get a Redis connection from the client
    async fn get_connection(&self) -> CalResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| storage_error(&format!("Failed to connect to Redis: {}", e)))
    }

    /// Fetch and deserialize the events behind a list of ids.
    ///
    /// Ids whose value is gone are skipped with a warning; they can be
    /// left behind by an interrupted delete.
    async fn fetch_events(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        ids: Vec<String>,
    ) -> CalResult<Vec<StoredCalendarEvent>> {
        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            let key = format!("{}{}", keys::EVENT_PREFIX, id);
            let data: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| storage_error(&format!("Redis GET error: {}", e)))?;
            match data {
                Some(json) => {
                    let event: StoredCalendarEvent = serde_json::from_str(&json)
                        .map_err(|e| storage_error(&format!("JSON parse error: {}", e)))?;
                    events.push(event);
                }
                None => warn!("Event {} is indexed but has no record", id),
            }
        }
        Ok(events)
    }
}

#[async_trait]
impl EventStore for RedisStore {
    async fn insert_events(
        &self,
        events: &[StoredCalendarEvent],
    ) -> CalResult<Vec<StoredCalendarEvent>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        // Serialize everything up front so a bad row fails the whole
        // batch before anything is written
        let mut serialized = Vec::with_capacity(events.len());
        for event in events {
            let json = serde_json::to_string(event)
                .map_err(|e| storage_error(&format!("JSON serialization error: {}", e)))?;
            serialized.push(json);
        }

        let mut conn = self.get_connection().await?;

        // Single atomic pipeline: either every row lands or none do
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (event, json) in events.iter().zip(serialized.iter()) {
            pipe.set(format!("{}{}", keys::EVENT_PREFIX, event.id), json)
                .ignore();
            pipe.sadd(
                format!("{}{}", keys::CLASS_EVENTS_PREFIX, event.class_id),
                &event.id,
            )
            .ignore();
            pipe.sadd(
                format!("{}{}", keys::USER_EVENTS_PREFIX, event.user_id),
                &event.id,
            )
            .ignore();
        }

        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| storage_error(&format!("Redis batch insert error: {}", e)))?;

        info!("Inserted {} event(s)", events.len());
        Ok(events.to_vec())
    }

    async fn update_events(&self, events: &[StoredCalendarEvent]) -> CalResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for event in events {
            let json = serde_json::to_string(event)
                .map_err(|e| storage_error(&format!("JSON serialization error: {}", e)))?;
            pipe.set(format!("{}{}", keys::EVENT_PREFIX, event.id), json)
                .ignore();
        }

        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| storage_error(&format!("Redis batch update error: {}", e)))?;

        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter) -> CalResult<Vec<StoredCalendarEvent>> {
        let mut conn = self.get_connection().await?;

        // Pick the narrower index set to walk
        let index_key = if let Some(class_id) = &filter.class_id {
            format!("{}{}", keys::CLASS_EVENTS_PREFIX, class_id)
        } else if let Some(user_id) = &filter.user_id {
            format!("{}{}", keys::USER_EVENTS_PREFIX, user_id)
        } else {
            return Err(storage_error("Event filter must name a class or a user"));
        };

        let ids: Vec<String> = conn
            .smembers(&index_key)
            .await
            .map_err(|e| storage_error(&format!("Redis SMEMBERS error: {}", e)))?;

        let mut events = self.fetch_events(&mut conn, ids).await?;
        events.retain(|event| filter.matches(event));
        sort_by_due(&mut events);
        Ok(events)
    }

    async fn create_class(&self, class: &ClassRecord) -> CalResult<()> {
        let mut conn = self.get_connection().await?;

        let json = serde_json::to_string(class)
            .map_err(|e| storage_error(&format!("JSON serialization error: {}", e)))?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.set(format!("{}{}", keys::CLASS_PREFIX, class.id), json)
            .ignore();
        pipe.sadd(
            format!("{}{}", keys::USER_CLASSES_PREFIX, class.user_id),
            &class.id,
        )
        .ignore();

        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| storage_error(&format!("Redis SET error: {}", e)))?;

        Ok(())
    }

    async fn get_class(&self, class_id: &str) -> CalResult<Option<ClassRecord>> {
        let mut conn = self.get_connection().await?;

        let data: Option<String> = conn
            .get(format!("{}{}", keys::CLASS_PREFIX, class_id))
            .await
            .map_err(|e| storage_error(&format!("Redis GET error: {}", e)))?;

        match data {
            Some(json) => {
                let class: ClassRecord = serde_json::from_str(&json)
                    .map_err(|e| storage_error(&format!("JSON parse error: {}", e)))?;
                Ok(Some(class))
            }
            None => Ok(None),
        }
    }

    async fn list_classes(&self, user_id: &str) -> CalResult<Vec<ClassRecord>> {
        let mut conn = self.get_connection().await?;

        let ids: Vec<String> = conn
            .smembers(format!("{}{}", keys::USER_CLASSES_PREFIX, user_id))
            .await
            .map_err(|e| storage_error(&format!("Redis SMEMBERS error: {}", e)))?;

        let mut classes = Vec::with_capacity(ids.len());
        for id in ids {
            let data: Option<String> = conn
                .get(format!("{}{}", keys::CLASS_PREFIX, id))
                .await
                .map_err(|e| storage_error(&format!("Redis GET error: {}", e)))?;
            if let Some(json) = data {
                let class: ClassRecord = serde_json::from_str(&json)
                    .map_err(|e| storage_error(&format!("JSON parse error: {}", e)))?;
                classes.push(class);
            }
        }
        classes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(classes)
    }

    async fn delete_class(&self, class_id: &str) -> CalResult<()> {
        let mut conn = self.get_connection().await?;

        // Resolve the class first so the user index can be cleaned up
        let class = self.get_class(class_id).await?;

        let event_ids: Vec<String> = conn
            .smembers(format!("{}{}", keys::CLASS_EVENTS_PREFIX, class_id))
            .await
            .map_err(|e| storage_error(&format!("Redis SMEMBERS error: {}", e)))?;

        let syllabus_ids: Vec<String> = conn
            .smembers(format!("{}{}", keys::CLASS_SYLLABI_PREFIX, class_id))
            .await
            .map_err(|e| storage_error(&format!("Redis SMEMBERS error: {}", e)))?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for id in &event_ids {
            pipe.del(format!("{}{}", keys::EVENT_PREFIX, id)).ignore();
            if let Some(class) = &class {
                pipe.srem(format!("{}{}", keys::USER_EVENTS_PREFIX, class.user_id), id)
                    .ignore();
            }
        }
        for id in &syllabus_ids {
            pipe.del(format!("{}{}", keys::SYLLABUS_PREFIX, id)).ignore();
        }
        pipe.del(format!("{}{}", keys::CLASS_EVENTS_PREFIX, class_id))
            .ignore();
        pipe.del(format!("{}{}", keys::CLASS_SYLLABI_PREFIX, class_id))
            .ignore();
        pipe.del(format!("{}{}", keys::CLASS_PREFIX, class_id)).ignore();
        if let Some(class) = &class {
            pipe.srem(
                format!("{}{}", keys::USER_CLASSES_PREFIX, class.user_id),
                class_id,
            )
            .ignore();
        }

        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| storage_error(&format!("Redis DEL error: {}", e)))?;

        info!("Deleted class {} with {} event(s)", class_id, event_ids.len());
        Ok(())
    }

    async fn create_syllabus(&self, syllabus: &SyllabusRecord) -> CalResult<()> {
        let mut conn = self.get_connection().await?;

        let json = serde_json::to_string(syllabus)
            .map_err(|e| storage_error(&format!("JSON serialization error: {}", e)))?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.set(format!("{}{}", keys::SYLLABUS_PREFIX, syllabus.id), json)
            .ignore();
        pipe.sadd(
            format!("{}{}", keys::CLASS_SYLLABI_PREFIX, syllabus.class_id),
            &syllabus.id,
        )
        .ignore();

        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| storage_error(&format!("Redis SET error: {}", e)))?;

        Ok(())
    }

    async fn list_syllabi(&self, class_id: &str) -> CalResult<Vec<SyllabusRecord>> {
        let mut conn = self.get_connection().await?;

        let ids: Vec<String> = conn
            .smembers(format!("{}{}", keys::CLASS_SYLLABI_PREFIX, class_id))
            .await
            .map_err(|e| storage_error(&format!("Redis SMEMBERS error: {}", e)))?;

        let mut syllabi = Vec::with_capacity(ids.len());
        for id in ids {
            let data: Option<String> = conn
                .get(format!("{}{}", keys::SYLLABUS_PREFIX, id))
                .await
                .map_err(|e| storage_error(&format!("Redis GET error: {}", e)))?;
            if let Some(json) = data {
                let syllabus: SyllabusRecord = serde_json::from_str(&json)
                    .map_err(|e| storage_error(&format!("JSON parse error: {}", e)))?;
                syllabi.push(syllabus);
            }
        }
        syllabi.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
        Ok(syllabi)
    }
}
