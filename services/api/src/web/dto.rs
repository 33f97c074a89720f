//! services/api/src/web/dto.rs
//!
//! Request and response payloads for the REST API, and their conversions to
//! and from the core domain types.

use chrono::{DateTime, Utc};
use resource_list_core::classifier::ClassificationSource;
use resource_list_core::focus::{encode_focus_areas, resolve_focus_areas, sanitize_focus_areas};
use resource_list_core::{
    Grouping, ItemPatch, ListEntry, ListItem, NewProjectPlan, Priority, ProjectPlan, Resource,
    SavedList, ScoredResource, Section,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub(crate) fn source_label(source: ClassificationSource) -> &'static str {
    match source {
        ClassificationSource::Override => "override",
        ClassificationSource::Ai => "ai",
        ClassificationSource::Keyword => "keyword",
    }
}

fn required(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(trimmed.to_string())
    }
}

//=========================================================================================
// Resources
//=========================================================================================

/// A catalog resource as returned by the API. Focus areas are always resolved.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub resource_type: String,
    pub url: String,
    pub category: String,
    pub creator_name: String,
    pub creator_url: Option<String>,
    pub section: String,
    pub difficulty: String,
    pub default_priority: String,
    pub focus_areas: Vec<String>,
}

impl From<&Resource> for ResourceResponse {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.clone(),
            title: resource.title.clone(),
            description: resource.description.clone(),
            resource_type: resource.resource_type.clone(),
            url: resource.url.clone(),
            category: resource.category.clone(),
            creator_name: resource.creator_name.clone(),
            creator_url: resource.creator_url.clone(),
            section: resource.section.as_str().to_string(),
            difficulty: resource.difficulty.clone(),
            default_priority: resource.default_priority.as_str().to_string(),
            focus_areas: resolve_focus_areas(resource)
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
        }
    }
}

/// A resource submitted by a client or a seed file.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePayload {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub resource_type: String,
    pub url: String,
    pub category: String,
    #[serde(default)]
    pub creator_name: String,
    pub creator_url: Option<String>,
    /// `video-hosting` or `website`; defaults to `website`.
    pub section: Option<String>,
    pub difficulty: Option<String>,
    pub default_priority: Option<String>,
    pub focus_areas: Option<Vec<String>>,
}

impl ResourcePayload {
    pub fn into_domain(self) -> Result<Resource, String> {
        let section = match self.section.as_deref() {
            None => Section::Website,
            Some(raw) => Section::parse(raw).ok_or_else(|| format!("unknown section '{}'", raw))?,
        };
        let default_priority = match self.default_priority.as_deref() {
            None => Priority::Recommended,
            Some(raw) => {
                Priority::parse(raw).ok_or_else(|| format!("unknown priority '{}'", raw))?
            }
        };
        Ok(Resource {
            id: required("id", &self.id)?,
            title: required("title", &self.title)?,
            description: self.description,
            resource_type: required("resourceType", &self.resource_type)?,
            url: required("url", &self.url)?,
            category: required("category", &self.category)?,
            creator_name: self.creator_name,
            creator_url: self.creator_url.filter(|u| !u.trim().is_empty()),
            section,
            difficulty: self
                .difficulty
                .map(|d| d.trim().to_lowercase())
                .unwrap_or_else(|| "beginner".to_string()),
            default_priority,
            focus_areas: self
                .focus_areas
                .map(|areas| encode_focus_areas(&sanitize_focus_areas(areas.as_slice()))),
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResourceQuery {
    /// Case-insensitive text search over title, description and creator.
    pub q: Option<String>,
    pub category: Option<String>,
    pub resource_type: Option<String>,
    /// beginner, intermediate or advanced
    pub difficulty: Option<String>,
    /// A focus-area label, e.g. `Graphic Design`.
    pub focus_area: Option<String>,
}

//=========================================================================================
// Groupings
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResourceResponse {
    pub resource: ResourceResponse,
    pub score: f64,
    pub priority: String,
}

impl From<&ScoredResource> for ScoredResourceResponse {
    fn from(scored: &ScoredResource) -> Self {
        Self {
            resource: ResourceResponse::from(&scored.resource),
            score: scored.score,
            priority: scored.priority.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupingResponse {
    pub required: Vec<ScoredResourceResponse>,
    pub recommended: Vec<ScoredResourceResponse>,
    pub optional: Vec<ScoredResourceResponse>,
}

impl From<&Grouping> for GroupingResponse {
    fn from(grouping: &Grouping) -> Self {
        let convert = |tier: &[ScoredResource]| -> Vec<ScoredResourceResponse> {
            tier.iter().map(ScoredResourceResponse::from).collect()
        };
        Self {
            required: convert(&grouping.required),
            recommended: convert(&grouping.recommended),
            optional: convert(&grouping.optional),
        }
    }
}

//=========================================================================================
// Project plans
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    pub name: String,
    pub project_type: String,
    pub skill_level: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    /// Focus-area labels; unknown labels are dropped.
    #[serde(default)]
    pub focus_areas: Vec<String>,
    pub description: Option<String>,
}

impl PlanPayload {
    pub fn into_domain(self) -> Result<NewProjectPlan, String> {
        Ok(NewProjectPlan {
            name: required("name", &self.name)?,
            project_type: required("projectType", &self.project_type)?,
            skill_level: required("skillLevel", &self.skill_level)?.to_lowercase(),
            budget_range: self.budget_range,
            timeline: self.timeline,
            focus_areas: sanitize_focus_areas(self.focus_areas.as_slice()),
            description: self.description,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub id: Uuid,
    pub name: String,
    pub project_type: String,
    pub skill_level: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub focus_areas: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectPlan> for PlanResponse {
    fn from(plan: ProjectPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            project_type: plan.project_type,
            skill_level: plan.skill_level,
            budget_range: plan.budget_range,
            timeline: plan.timeline,
            focus_areas: plan.focus_areas.iter().map(|a| a.as_str().to_string()).collect(),
            description: plan.description,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

/// Options for list generation. Send `{}` to only generate.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// Persist the generated list as a saved list.
    pub save: bool,
    /// Name of the saved list; defaults to the plan name.
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedListResponse {
    pub focus_areas: Vec<String>,
    /// override, ai or keyword
    pub source: String,
    pub skill_level: Option<String>,
    pub grouping: GroupingResponse,
    pub saved_list: Option<SavedListResponse>,
}

//=========================================================================================
// Saved lists
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListItemResponse {
    pub id: Uuid,
    pub list_id: Uuid,
    pub resource_id: String,
    pub priority: String,
    pub removed: bool,
    pub is_favorite: bool,
    pub sort_order: i32,
}

impl From<ListItem> for ListItemResponse {
    fn from(item: ListItem) -> Self {
        Self {
            id: item.id,
            list_id: item.list_id,
            priority: item.priority.as_str().to_string(),
            resource_id: item.resource_id,
            removed: item.removed,
            is_favorite: item.is_favorite,
            sort_order: item.sort_order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEntryResponse {
    pub id: Uuid,
    pub priority: String,
    pub is_favorite: bool,
    pub sort_order: i32,
    pub resource: ResourceResponse,
}

impl From<ListEntry> for ListEntryResponse {
    fn from(entry: ListEntry) -> Self {
        Self {
            id: entry.item.id,
            priority: entry.item.priority.as_str().to_string(),
            is_favorite: entry.item.is_favorite,
            sort_order: entry.item.sort_order,
            resource: ResourceResponse::from(&entry.resource),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedListResponse {
    pub id: Uuid,
    pub project_plan_id: Uuid,
    pub name: String,
    pub slug: String,
    pub shared_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ListEntryResponse>,
}

impl From<SavedList> for SavedListResponse {
    fn from(list: SavedList) -> Self {
        Self {
            id: list.id,
            project_plan_id: list.project_plan_id,
            name: list.name,
            slug: list.slug,
            shared_at: list.shared_at,
            created_at: list.created_at,
            items: list.items.into_iter().map(ListEntryResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualListPayload {
    pub name: String,
    pub skill_level: Option<String>,
    /// Resources in display order. Unknown ones are added to the catalog.
    pub resources: Vec<ResourcePayload>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatchPayload {
    pub removed: Option<bool>,
    pub is_favorite: Option<bool>,
    pub sort_order: Option<i32>,
}

impl From<ItemPatchPayload> for ItemPatch {
    fn from(payload: ItemPatchPayload) -> Self {
        Self {
            removed: payload.removed,
            is_favorite: payload.is_favorite,
            sort_order: payload.sort_order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub slug: String,
    pub url: String,
}

//=========================================================================================
// Assistant and health
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistantPayload {
    pub query: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub primary_categories: Vec<String>,
    pub secondary_categories: Vec<String>,
    pub skill_level: String,
    pub source: String,
    pub grouping: GroupingResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub resources: u64,
    /// `ai` when a provider is configured, otherwise `keyword`.
    pub classifier: String,
    pub classifier_cooling_down: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ResourcePayload {
        ResourcePayload {
            id: "r1".into(),
            title: "Logo basics".into(),
            description: String::new(),
            resource_type: "video".into(),
            url: "https://example.com/r1".into(),
            category: "Logo Design".into(),
            creator_name: "Studio".into(),
            creator_url: Some("  ".into()),
            section: Some("youtube".into()),
            difficulty: Some("Beginner".into()),
            default_priority: None,
            focus_areas: Some(vec!["branding".into(), "Video Editing".into()]),
        }
    }

    #[test]
    fn resource_payload_normalizes_fields() {
        let resource = payload().into_domain().unwrap();
        assert_eq!(resource.section, Section::VideoHosting);
        assert_eq!(resource.default_priority, Priority::Recommended);
        assert_eq!(resource.difficulty, "beginner");
        assert_eq!(resource.creator_url, None);
        assert_eq!(resource.focus_areas.as_deref(), Some(r#"["Branding"]"#));
    }

    #[test]
    fn resource_payload_rejects_missing_title_and_bad_section() {
        let mut missing = payload();
        missing.title = " ".into();
        assert_eq!(missing.into_domain().unwrap_err(), "title is required");

        let mut bad = payload();
        bad.section = Some("podcast".into());
        assert!(bad.into_domain().unwrap_err().contains("podcast"));
    }

    #[test]
    fn plan_payload_drops_unknown_focus_areas() {
        let plan = PlanPayload {
            name: "Guild hub".into(),
            project_type: "server".into(),
            skill_level: "Advanced".into(),
            budget_range: None,
            timeline: None,
            focus_areas: vec!["Branding".into(), "Cooking".into()],
            description: None,
        }
        .into_domain()
        .unwrap();
        assert_eq!(plan.skill_level, "advanced");
        assert_eq!(plan.focus_areas, vec![resource_list_core::FocusArea::Branding]);
    }
}
