pub mod dto;
pub mod lists;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use lists::{
    create_manual_list_handler, get_list_handler, get_shared_list_handler, share_list_handler,
    update_item_handler,
};
use rest::{
    assistant_handler, create_plan_handler, generate_handler, get_plan_handler,
    get_resource_handler, health_handler, list_resources_handler, update_plan_handler,
};
use state::AppState;

/// Builds the API routes. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/resources", get(list_resources_handler))
        .route("/resources/{id}", get(get_resource_handler))
        .route("/plans", post(create_plan_handler))
        .route("/plans/{id}", get(get_plan_handler).put(update_plan_handler))
        .route("/plans/{id}/generate", post(generate_handler))
        .route("/assistant", post(assistant_handler))
        .route("/lists/manual", post(create_manual_list_handler))
        .route("/lists/{id}", get(get_list_handler))
        .route("/lists/{id}/items/{item_id}", patch(update_item_handler))
        .route("/lists/{id}/share", post(share_list_handler))
        .route("/shared/{slug}", get(get_shared_list_handler))
        .with_state(app_state)
}
