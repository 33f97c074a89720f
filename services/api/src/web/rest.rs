//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the catalog, plan, generation and assistant
//! endpoints, and the master definition for the OpenAPI specification.

use crate::error::engine_error_response;
use crate::web::dto::{
    source_label, AssistantPayload, AssistantResponse, GenerateOptions, GeneratedListResponse,
    GroupingResponse, HealthResponse, ItemPatchPayload, ListEntryResponse, ListItemResponse,
    ManualListPayload, PlanPayload, PlanResponse, ResourcePayload, ResourceQuery,
    ResourceResponse, SavedListResponse, ScoredResourceResponse, ShareResponse,
};
use crate::web::lists;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use resource_list_core::catalog::{filter_resources, ResourceFilter};
use resource_list_core::{EngineError, FocusArea, SkillLevel};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_resources_handler,
        get_resource_handler,
        create_plan_handler,
        get_plan_handler,
        update_plan_handler,
        generate_handler,
        assistant_handler,
        health_handler,
        lists::create_manual_list_handler,
        lists::get_list_handler,
        lists::update_item_handler,
        lists::share_list_handler,
        lists::get_shared_list_handler,
    ),
    components(
        schemas(
            ResourceResponse, ResourcePayload, ScoredResourceResponse, GroupingResponse,
            PlanPayload, PlanResponse, GenerateOptions, GeneratedListResponse,
            ListItemResponse, ListEntryResponse, SavedListResponse, ManualListPayload,
            ItemPatchPayload, ShareResponse, AssistantPayload, AssistantResponse, HealthResponse
        )
    ),
    tags(
        (name = "Resource Lists API", description = "Curated resource lists for community builders.")
    )
)]
pub struct ApiDoc;

fn bad_request(reason: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, reason.into())
}

//=========================================================================================
// Catalog
//=========================================================================================

/// Browse, search and filter the resource catalog.
#[utoipa::path(
    get,
    path = "/resources",
    params(ResourceQuery),
    responses(
        (status = 200, description = "Matching resources in catalog order", body = [ResourceResponse]),
        (status = 400, description = "Unknown difficulty or focus area"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_resources_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ResourceQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let difficulty = match query.difficulty.as_deref() {
        Some(raw) => Some(
            SkillLevel::parse(raw).ok_or_else(|| bad_request(format!("Unknown difficulty '{}'", raw)))?,
        ),
        None => None,
    };
    let focus_area = match query.focus_area.as_deref() {
        Some(raw) => Some(
            FocusArea::parse(raw).ok_or_else(|| bad_request(format!("Unknown focus area '{}'", raw)))?,
        ),
        None => None,
    };
    let filter = ResourceFilter {
        query: query.q,
        category: query.category,
        resource_type: query.resource_type,
        difficulty,
        focus_area,
    };

    let resources = app_state.catalog.list_resources().await.map_err(|e| {
        error!("Failed to list resources: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to list resources".to_string(),
        )
    })?;
    let body: Vec<ResourceResponse> = filter_resources(resources, &filter)
        .iter()
        .map(ResourceResponse::from)
        .collect();
    Ok(Json(body))
}

/// Fetch a single resource.
#[utoipa::path(
    get,
    path = "/resources/{id}",
    params(("id" = String, Path, description = "The resource id.")),
    responses(
        (status = 200, description = "The resource", body = ResourceResponse),
        (status = 404, description = "No such resource")
    )
)]
pub async fn get_resource_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let resource = app_state
        .catalog
        .get_resource(&id)
        .await
        .map_err(|e| engine_error_response("Fetching resource", EngineError::from(e)))?;
    Ok(Json(ResourceResponse::from(&resource)))
}

//=========================================================================================
// Project plans
//=========================================================================================

/// Create a project plan from the intake form.
#[utoipa::path(
    post,
    path = "/plans",
    request_body = PlanPayload,
    responses(
        (status = 201, description = "Plan created", body = PlanResponse),
        (status = 400, description = "Missing required fields")
    )
)]
pub async fn create_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<PlanPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let new_plan = payload.into_domain().map_err(bad_request)?;
    let plan = app_state
        .plans
        .create_plan(&new_plan)
        .await
        .map_err(|e| engine_error_response("Creating plan", EngineError::from(e)))?;
    info!(plan_id = %plan.id, "Project plan created");
    Ok((StatusCode::CREATED, Json(PlanResponse::from(plan))))
}

#[utoipa::path(
    get,
    path = "/plans/{id}",
    params(("id" = Uuid, Path, description = "The plan id.")),
    responses(
        (status = 200, description = "The plan", body = PlanResponse),
        (status = 404, description = "No such plan")
    )
)]
pub async fn get_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let plan = app_state
        .plans
        .get_plan(id)
        .await
        .map_err(|e| engine_error_response("Fetching plan", EngineError::from(e)))?;
    Ok(Json(PlanResponse::from(plan)))
}

/// Replace the writable fields of a plan.
#[utoipa::path(
    put,
    path = "/plans/{id}",
    params(("id" = Uuid, Path, description = "The plan id.")),
    request_body = PlanPayload,
    responses(
        (status = 200, description = "The updated plan", body = PlanResponse),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "No such plan")
    )
)]
pub async fn update_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlanPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let new_plan = payload.into_domain().map_err(bad_request)?;
    let plan = app_state
        .plans
        .update_plan(id, &new_plan)
        .await
        .map_err(|e| engine_error_response("Updating plan", EngineError::from(e)))?;
    Ok(Json(PlanResponse::from(plan)))
}

/// Generate a tiered resource list for a plan, optionally saving it.
#[utoipa::path(
    post,
    path = "/plans/{id}/generate",
    params(("id" = Uuid, Path, description = "The plan id.")),
    request_body = GenerateOptions,
    responses(
        (status = 200, description = "The generated list", body = GeneratedListResponse),
        (status = 404, description = "No such plan"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(options): Json<GenerateOptions>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let plan = app_state
        .plans
        .get_plan(id)
        .await
        .map_err(|e| engine_error_response("Fetching plan", EngineError::from(e)))?;
    let generated = app_state
        .engine
        .generate_for_plan(&plan)
        .await
        .map_err(|e| engine_error_response("Generating list", e))?;

    let saved_list = if options.save {
        let name = options
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&plan.name);
        let saved = app_state
            .lists
            .save_grouping(plan.id, name, &generated.grouping)
            .await
            .map_err(|e| engine_error_response("Saving list", e))?;
        Some(SavedListResponse::from(saved))
    } else {
        None
    };

    Ok(Json(GeneratedListResponse {
        focus_areas: generated
            .classification
            .focus_areas
            .iter()
            .map(|a| a.as_str().to_string())
            .collect(),
        source: source_label(generated.classification.source).to_string(),
        skill_level: generated.skill.map(|s| s.as_str().to_string()),
        grouping: GroupingResponse::from(&generated.grouping),
        saved_list,
    }))
}

//=========================================================================================
// Assistant and health
//=========================================================================================

/// Answer a free-text question with the top matching resources.
#[utoipa::path(
    post,
    path = "/assistant",
    request_body = AssistantPayload,
    responses(
        (status = 200, description = "Recommended resources", body = AssistantResponse),
        (status = 400, description = "Empty query")
    )
)]
pub async fn assistant_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AssistantPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let query = payload.query.trim();
    if query.is_empty() {
        return Err(bad_request("query is required"));
    }
    let recommendation = app_state
        .engine
        .recommend(query)
        .await
        .map_err(|e| engine_error_response("Assistant recommendation", e))?;

    let labels = |categories: &[resource_list_core::CanonicalCategory]| -> Vec<String> {
        categories.iter().map(|c| c.as_str().to_string()).collect()
    };
    let classification = &recommendation.classification;
    Ok(Json(AssistantResponse {
        primary_categories: labels(&classification.primary),
        secondary_categories: labels(&classification.secondary),
        skill_level: classification.skill.as_str().to_string(),
        source: source_label(classification.source).to_string(),
        grouping: GroupingResponse::from(&recommendation.grouping),
    }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
        (status = 500, description = "Catalog unavailable")
    )
)]
pub async fn health_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let resources = app_state
        .catalog
        .count_resources()
        .await
        .map_err(|e| engine_error_response("Health check", EngineError::from(e)))?;
    let classifier = app_state.engine.classifier();
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        resources,
        classifier: if classifier.has_provider() { "ai" } else { "keyword" }.to_string(),
        classifier_cooling_down: classifier.is_cooling_down(),
    }))
}
