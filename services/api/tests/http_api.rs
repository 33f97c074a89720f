//! Drives the REST router end to end against the in-memory store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use api_lib::web::{router, state::AppState};
use resource_list_core::classifier::IntentClassifier;
use resource_list_core::memory::MemoryStore;
use resource_list_core::ports::{ManualClock, RandomHexSlugs};
use resource_list_core::{ListService, Priority, Resource, ResourceListEngine, Section};

fn resource(id: &str, category: &str, tags: &str, difficulty: &str, priority: Priority) -> Resource {
    Resource {
        id: id.into(),
        title: format!("{id} handbook"),
        description: format!("A {category} resource"),
        resource_type: "guide".into(),
        url: format!("https://example.com/{id}"),
        category: category.into(),
        creator_name: "Creator".into(),
        creator_url: None,
        section: Section::Website,
        difficulty: difficulty.into(),
        default_priority: priority,
        focus_areas: Some(tags.into()),
    }
}

fn app() -> Router {
    let store = Arc::new(MemoryStore::with_resources(vec![
        resource("a", "Branding", r#"["Branding"]"#, "beginner", Priority::Required),
        resource(
            "b",
            "Automation and Systems",
            r#"["Automation / Bots"]"#,
            "advanced",
            Priority::Optional,
        ),
    ]));
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let classifier = Arc::new(IntentClassifier::keyword_only(clock.clone()));
    let engine = Arc::new(ResourceListEngine::new(store.clone(), classifier));
    let lists = ListService::new(
        store.clone(),
        store.clone(),
        clock,
        Arc::new(RandomHexSlugs),
        "https://hub.example.org",
    );
    router(Arc::new(AppState {
        catalog: store.clone(),
        plans: store,
        engine,
        lists,
    }))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_plan(app: &Router) -> String {
    let (status, plan) = send(
        app,
        "POST",
        "/plans",
        Some(json!({
            "name": "Spring launch",
            "projectType": "community",
            "skillLevel": "beginner",
            "focusAreas": ["Branding"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    plan["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_catalog_size_and_keyword_mode() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resources"], 2);
    assert_eq!(body["classifier"], "keyword");
    assert_eq!(body["classifierCoolingDown"], false);
}

#[tokio::test]
async fn resources_can_be_filtered_by_focus_area() {
    let app = app();
    let (status, body) = send(&app, "GET", "/resources?focus_area=Branding", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a"]);

    let (status, _) = send(&app, "GET", "/resources?difficulty=expert", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/resources/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn plan_validation_and_updates() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/plans",
        Some(json!({ "name": " ", "projectType": "community", "skillLevel": "beginner" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = create_plan(&app).await;
    let (status, plan) = send(
        &app,
        "PUT",
        &format!("/plans/{id}"),
        Some(json!({
            "name": "Autumn launch",
            "projectType": "community",
            "skillLevel": "advanced",
            "focusAreas": ["Automation / Bots", "Knitting"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["name"], "Autumn launch");
    assert_eq!(plan["focusAreas"], json!(["Automation / Bots"]));

    let unknown = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/plans/{unknown}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_saves_and_shares_a_list() {
    let app = app();
    let plan_id = create_plan(&app).await;

    let (status, generated) = send(
        &app,
        "POST",
        &format!("/plans/{plan_id}/generate"),
        Some(json!({ "save": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["source"], "override");
    assert_eq!(generated["focusAreas"], json!(["Branding"]));
    assert_eq!(generated["grouping"]["required"][0]["resource"]["id"], "a");
    assert_eq!(generated["grouping"]["optional"], json!([]));

    let list = &generated["savedList"];
    assert_eq!(list["name"], "Spring launch");
    assert_eq!(list["sharedAt"], Value::Null);
    let list_id = list["id"].as_str().unwrap().to_string();
    let slug = list["slug"].as_str().unwrap().to_string();

    // Not public until shared.
    let (status, _) = send(&app, "GET", &format!("/shared/{slug}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, share) = send(&app, "POST", &format!("/lists/{list_id}/share"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(share["url"], format!("https://hub.example.org/shared/{slug}"));

    let (status, shared) = send(&app, "GET", &format!("/shared/{slug}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared["items"].as_array().unwrap().len(), 1);
    assert!(shared["sharedAt"].is_string());
}

#[tokio::test]
async fn generate_without_save_returns_no_list() {
    let app = app();
    let plan_id = create_plan(&app).await;
    let (status, generated) =
        send(&app, "POST", &format!("/plans/{plan_id}/generate"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["savedList"], Value::Null);
    assert_eq!(generated["skillLevel"], "beginner");
}

#[tokio::test]
async fn removed_items_disappear_from_the_owner_view() {
    let app = app();
    let (status, list) = send(
        &app,
        "POST",
        "/lists/manual",
        Some(json!({
            "name": "My picks",
            "resources": [
                {
                    "id": "a", "title": "a handbook", "resourceType": "guide",
                    "url": "https://example.com/a", "category": "Branding"
                },
                {
                    "id": "c", "title": "Color palettes", "resourceType": "color-tool",
                    "url": "https://example.com/c", "category": "Color Theory",
                    "section": "website"
                }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let list_id = list["id"].as_str().unwrap().to_string();
    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["resource"]["id"], "c");
    let item_id = items[0]["id"].as_str().unwrap().to_string();

    let (status, item) = send(
        &app,
        "PATCH",
        &format!("/lists/{list_id}/items/{item_id}"),
        Some(json!({ "removed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["removed"], true);

    let (status, fetched) = send(&app, "GET", &format!("/lists/{list_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let remaining = fetched["items"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["resource"]["id"], "c");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/lists/{list_id}/items/{item_id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let other_list = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/lists/{other_list}/items/{item_id}"),
        Some(json!({ "isFavorite": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manual_list_rejects_invalid_input() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/lists/manual",
        Some(json!({ "name": "Empty", "resources": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/lists/manual",
        Some(json!({
            "name": "Bad",
            "resources": [{
                "id": "z", "title": "Z", "resourceType": "guide",
                "url": "https://example.com/z", "category": "Misc", "section": "podcast"
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assistant_falls_back_to_keyword_categories() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/assistant",
        Some(json!({ "query": "basic ticket bots" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "keyword");
    assert_eq!(body["skillLevel"], "beginner");
    assert_eq!(body["primaryCategories"], json!(["Automation and Systems"]));
    assert_eq!(body["grouping"]["required"][0]["resource"]["id"], "b");

    let (status, _) = send(&app, "POST", "/assistant", Some(json!({ "query": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
