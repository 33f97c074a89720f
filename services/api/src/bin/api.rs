//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, OpenAiClassifierAdapter},
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{header::ACCEPT, header::CONTENT_TYPE, HeaderValue, Method};
use axum::Router;
use resource_list_core::classifier::{ClassifierSettings, IntentClassifier};
use resource_list_core::ports::{ClassificationProvider, RandomHexSlugs};
use resource_list_core::{ListService, ResourceListEngine, SystemClock};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the Classifier ---
    let provider: Option<Arc<dyn ClassificationProvider>> = match &config.openai_api_key {
        Some(key) => {
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(key));
            info!("AI classification enabled with model {}", config.classifier_model);
            let adapter: Arc<dyn ClassificationProvider> = Arc::new(
                OpenAiClassifierAdapter::new(openai_client, config.classifier_model.clone()),
            );
            Some(adapter)
        }
        None => {
            warn!("OPENAI_API_KEY is not set; classification will use keyword rules only");
            None
        }
    };
    let clock = Arc::new(SystemClock);
    let classifier = Arc::new(IntentClassifier::new(
        provider,
        clock.clone(),
        ClassifierSettings {
            timeout: config.classifier_timeout,
            cooldown: config.classifier_cooldown,
        },
    ));

    // --- 4. Build the Shared AppState ---
    let engine = Arc::new(ResourceListEngine::new(db_adapter.clone(), classifier));
    let lists = ListService::new(
        db_adapter.clone(),
        db_adapter.clone(),
        clock,
        Arc::new(RandomHexSlugs),
        config.public_base_url.clone(),
    );
    let app_state = Arc::new(AppState {
        catalog: db_adapter.clone(),
        plans: db_adapter,
        engine,
        lists,
    });

    // --- 5. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
