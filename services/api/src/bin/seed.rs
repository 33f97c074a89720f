//! services/api/src/bin/seed.rs
//!
//! Loads catalog resources from a JSON file (an array of resource objects, in
//! the same shape the API accepts) and upserts them. Missing or invalid
//! focus-area tags are filled in from the category mapping.

use api_lib::{adapters::DbAdapter, config::Config, error::ApiError, web::dto::ResourcePayload};
use resource_list_core::catalog::prepare_for_ingest;
use resource_list_core::ports::CatalogStore;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| ApiError::Internal("usage: seed <resources.json>".to_string()))?;
    let raw = std::fs::read_to_string(&path)?;
    let payloads: Vec<ResourcePayload> = serde_json::from_str(&raw)
        .map_err(|e| ApiError::Internal(format!("{} is not a valid resource file: {}", path, e)))?;
    info!("Read {} resources from {}", payloads.len(), path);

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;
    let db = DbAdapter::new(pool);
    db.run_migrations().await?;

    let mut skipped = 0usize;
    for payload in payloads {
        let id = payload.id.clone();
        let resource = match payload.into_domain() {
            Ok(resource) => prepare_for_ingest(resource),
            Err(reason) => {
                warn!("Skipping resource '{}': {}", id, reason);
                skipped += 1;
                continue;
            }
        };
        db.upsert_resource(&resource).await?;
    }

    let total = db.count_resources().await?;
    info!(skipped, total, "Seeding complete");
    Ok(())
}
