mod calendar;
mod config;
mod dedupe;
mod document;
mod error;
mod export;
mod extraction;
mod models;
mod pipeline;
mod startup;
mod store;
mod validate;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting coursecal");

    // Load configuration
    let config = startup::load_config()?;

    // Process the upload
    startup::run(config).await
}
