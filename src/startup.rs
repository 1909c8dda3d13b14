use crate::config::Config;
use crate::error::Error;
use crate::models::{provenance, Ownership, SyllabusRecord};
use crate::pipeline::process_syllabus;
use crate::store::{EventStore, RedisStore};
use std::env;
use std::fs;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Process one syllabus upload from the command line.
///
/// Usage: coursecal <syllabus.pdf> <class-id> <user-id>
pub async fn run(config: Arc<Config>) -> miette::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        return Err(Error::Config(format!(
            "Usage: {} <syllabus.pdf> <class-id> <user-id>",
            args.first().map(String::as_str).unwrap_or("coursecal")
        ))
        .into());
    }

    let path = &args[1];
    let class_id = &args[2];
    let user_id = &args[3];

    let bytes = fs::read(path).map_err(Error::Io)?;

    let store = RedisStore::new(&config.redis_url)?;

    // Record the upload before processing it
    let syllabus = SyllabusRecord::new(class_id, path);
    store.create_syllabus(&syllabus).await?;

    let ownership = Ownership {
        class_id: class_id.clone(),
        user_id: user_id.clone(),
        syllabus_id: Some(syllabus.id.clone()),
    };

    let outcome = process_syllabus(
        &store,
        &config.llm,
        &bytes,
        crate::document::PDF_CONTENT_TYPE,
        &ownership,
        provenance::UPLOAD_WORKFLOW,
    )
    .await?;

    if outcome.saved_count == 0 {
        info!("No events found in {}", path);
    } else {
        info!("Extracted and saved {} event(s) from {}", outcome.saved_count, path);
        for event in &outcome.events {
            info!(
                "  {} [{}] due {}{}",
                event.title,
                event.event_type,
                event.due_date,
                event
                    .due_time
                    .as_deref()
                    .map(|t| format!(" {}", t))
                    .unwrap_or_default()
            );
        }
    }

    Ok(())
}
