//! services/api/src/web/lists.rs
//!
//! Handlers for saved lists: manual creation, owner access, item edits and
//! public sharing.

use crate::error::engine_error_response;
use crate::web::dto::{
    ItemPatchPayload, ListItemResponse, ManualListPayload, SavedListResponse, ShareResponse,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use resource_list_core::{ItemPatch, ManualSelection};
use std::sync::Arc;
use uuid::Uuid;

/// Save a hand-picked selection of resources as a new list.
#[utoipa::path(
    post,
    path = "/lists/manual",
    request_body = ManualListPayload,
    responses(
        (status = 201, description = "List created", body = SavedListResponse),
        (status = 400, description = "Missing name, no resources, or an invalid resource"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_manual_list_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ManualListPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let resources = payload
        .resources
        .into_iter()
        .map(|r| r.into_domain())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| (StatusCode::BAD_REQUEST, reason))?;

    let saved = app_state
        .lists
        .save_manual(ManualSelection {
            name: payload.name,
            skill_level: payload.skill_level,
            resources,
        })
        .await
        .map_err(|e| engine_error_response("Saving manual list", e))?;
    Ok((StatusCode::CREATED, Json(SavedListResponse::from(saved))))
}

/// Owner view of a list. Removed items are omitted.
#[utoipa::path(
    get,
    path = "/lists/{id}",
    params(("id" = Uuid, Path, description = "The list id.")),
    responses(
        (status = 200, description = "The list", body = SavedListResponse),
        (status = 404, description = "No such list")
    )
)]
pub async fn get_list_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let list = app_state
        .lists
        .fetch_owned(id)
        .await
        .map_err(|e| engine_error_response("Fetching list", e))?;
    Ok(Json(SavedListResponse::from(list)))
}

/// Remove, restore, favorite or reorder one item.
#[utoipa::path(
    patch,
    path = "/lists/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "The list id."),
        ("item_id" = Uuid, Path, description = "The item id.")
    ),
    request_body = ItemPatchPayload,
    responses(
        (status = 200, description = "The updated item", body = ListItemResponse),
        (status = 400, description = "Empty patch"),
        (status = 404, description = "No such item in this list")
    )
)]
pub async fn update_item_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ItemPatchPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let patch = ItemPatch::from(payload);
    let item = app_state
        .lists
        .update_item(id, item_id, &patch)
        .await
        .map_err(|e| engine_error_response("Updating list item", e))?;
    Ok(Json(ListItemResponse::from(item)))
}

/// Make a list publicly readable and return its link.
#[utoipa::path(
    post,
    path = "/lists/{id}/share",
    params(("id" = Uuid, Path, description = "The list id.")),
    responses(
        (status = 200, description = "Share link", body = ShareResponse),
        (status = 404, description = "No such list")
    )
)]
pub async fn share_list_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let link = app_state
        .lists
        .share(id)
        .await
        .map_err(|e| engine_error_response("Sharing list", e))?;
    Ok(Json(ShareResponse {
        slug: link.slug,
        url: link.url,
    }))
}

/// Public view of a shared list.
#[utoipa::path(
    get,
    path = "/shared/{slug}",
    params(("slug" = String, Path, description = "The share slug.")),
    responses(
        (status = 200, description = "The shared list", body = SavedListResponse),
        (status = 404, description = "Unknown slug, or the list was never shared")
    )
)]
pub async fn get_shared_list_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let list = app_state
        .lists
        .fetch_shared(&slug)
        .await
        .map_err(|e| engine_error_response("Fetching shared list", e))?;
    Ok(Json(SavedListResponse::from(list)))
}
