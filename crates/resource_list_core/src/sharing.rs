//! crates/resource_list_core/src/sharing.rs
//!
//! Saved-list persistence and public sharing on top of the `ListStore` port.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    FocusArea, Grouping, ItemPatch, ListItem, NewListItem, NewProjectPlan, NewSavedList, Resource,
    SavedList,
};
use crate::catalog::prepare_for_ingest;
use crate::error::{EngineError, EngineResult};
use crate::focus::resolve_focus_areas;
use crate::ports::{CatalogStore, Clock, ListStore, PortError, SlugSource};

/// Upper bound on slug candidates tried for one list.
pub const MAX_SLUG_ATTEMPTS: usize = 10;

/// A hand-picked set of resources to save as a list.
#[derive(Debug, Clone)]
pub struct ManualSelection {
    pub name: String,
    pub skill_level: Option<String>,
    /// In display order. Ids the catalog lacks are added before linking.
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub slug: String,
    pub url: String,
}

fn not_found(e: PortError) -> EngineError {
    match e {
        PortError::NotFound(what) => EngineError::NotFound(what),
        other => EngineError::Port(other),
    }
}

/// Fetches must hide soft-removed items and order by `sort_order`.
fn visible(mut list: SavedList) -> SavedList {
    list.items.retain(|entry| !entry.item.removed);
    list.items.sort_by_key(|entry| entry.item.sort_order);
    list
}

/// Turns a grouping into list items in tier-then-rank order.
pub fn items_from_grouping(grouping: &Grouping) -> Vec<NewListItem> {
    grouping
        .iter()
        .enumerate()
        .map(|(i, scored)| NewListItem {
            resource_id: scored.resource.id.clone(),
            priority: scored.priority,
            sort_order: i as i32,
        })
        .collect()
}

#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn ListStore>,
    catalog: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
    slugs: Arc<dyn SlugSource>,
    public_base_url: String,
}

impl ListService {
    pub fn new(
        store: Arc<dyn ListStore>,
        catalog: Arc<dyn CatalogStore>,
        clock: Arc<dyn Clock>,
        slugs: Arc<dyn SlugSource>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            slugs,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn share_url(&self, slug: &str) -> String {
        format!("{}/shared/{}", self.public_base_url, slug)
    }

    /// Draws candidates until one is unused, counting every draw against a
    /// budget of `MAX_SLUG_ATTEMPTS` shared by the caller.
    async fn next_free_slug(&self, attempts: &mut usize) -> EngineResult<String> {
        while *attempts < MAX_SLUG_ATTEMPTS {
            *attempts += 1;
            let slug = self.slugs.next_slug();
            if !self.store.slug_exists(&slug).await? {
                return Ok(slug);
            }
        }
        Err(EngineError::SlugExhaustion {
            attempts: MAX_SLUG_ATTEMPTS,
        })
    }

    /// Returns a slug that no stored list uses yet.
    pub async fn generate_unique_slug(&self) -> EngineResult<String> {
        let mut attempts = 0;
        self.next_free_slug(&mut attempts).await
    }

    /// Creates the list under `slug`, a slug `next_free_slug` already reported
    /// free after `attempts` draws. A uniqueness conflict at insert time
    /// (another request took the slug in between) is retried with a new slug
    /// from the same attempt budget.
    async fn create_with_slug(
        &self,
        project_plan_id: Uuid,
        name: &str,
        items: Vec<NewListItem>,
        slug: String,
        mut attempts: usize,
    ) -> EngineResult<SavedList> {
        let mut list = NewSavedList {
            project_plan_id,
            name: name.to_string(),
            slug,
            items,
        };

        loop {
            match self.store.create_list(&list).await {
                Ok(saved) => {
                    info!(list_id = %saved.id, slug = %saved.slug, items = saved.items.len(), "Saved list created");
                    return Ok(saved);
                }
                Err(PortError::Conflict(detail)) => {
                    warn!(attempts, %detail, "Slug taken at insert time; retrying");
                    list.slug = self.next_free_slug(&mut attempts).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Persists a generated grouping as a saved list of an existing plan.
    pub async fn save_grouping(
        &self,
        project_plan_id: Uuid,
        name: &str,
        grouping: &Grouping,
    ) -> EngineResult<SavedList> {
        self.store.get_plan(project_plan_id).await.map_err(not_found)?;
        let mut attempts = 0;
        let slug = self.next_free_slug(&mut attempts).await?;
        self.create_with_slug(project_plan_id, name, items_from_grouping(grouping), slug, attempts)
            .await
    }

    /// Saves a manual selection: adds resources the catalog does not know yet,
    /// synthesizes a plan for them, then creates the list in the given order.
    /// Resources already in the catalog are linked as stored and never
    /// overwritten. The slug is reserved before anything is written, so an
    /// exhausted slug budget leaves no plan behind.
    pub async fn save_manual(&self, selection: ManualSelection) -> EngineResult<SavedList> {
        let name = selection.name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("list name is required".to_string()));
        }
        if selection.resources.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one resource is required".to_string(),
            ));
        }

        let mut attempts = 0;
        let slug = self.next_free_slug(&mut attempts).await?;

        let mut focus_areas: Vec<FocusArea> = Vec::new();
        let mut items = Vec::with_capacity(selection.resources.len());
        for resource in &selection.resources {
            let stored = self
                .catalog
                .insert_resource_if_absent(&prepare_for_ingest(resource.clone()))
                .await?;
            for area in resolve_focus_areas(&stored) {
                if !focus_areas.contains(&area) {
                    focus_areas.push(area);
                }
            }
            if items.iter().any(|i: &NewListItem| i.resource_id == stored.id) {
                continue;
            }
            items.push(NewListItem {
                resource_id: stored.id.clone(),
                priority: stored.default_priority,
                sort_order: items.len() as i32,
            });
        }

        let plan = self
            .store
            .create_plan(&NewProjectPlan {
                name: name.to_string(),
                project_type: "manual".to_string(),
                skill_level: selection
                    .skill_level
                    .unwrap_or_else(|| "intermediate".to_string()),
                budget_range: None,
                timeline: None,
                focus_areas,
                description: None,
            })
            .await?;

        self.create_with_slug(plan.id, name, items, slug, attempts).await
    }

    /// Updates one item. The item must belong to `list_id`.
    pub async fn update_item(
        &self,
        list_id: Uuid,
        item_id: Uuid,
        patch: &ItemPatch,
    ) -> EngineResult<ListItem> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput("nothing to update".to_string()));
        }
        self.store
            .update_item(list_id, item_id, patch)
            .await
            .map_err(not_found)
    }

    /// Stamps `shared_at` (again, if already shared) and returns the public link.
    pub async fn share(&self, list_id: Uuid) -> EngineResult<ShareLink> {
        let list = self
            .store
            .mark_shared(list_id, self.clock.now())
            .await
            .map_err(not_found)?;
        info!(list_id = %list.id, slug = %list.slug, "List shared");
        Ok(ShareLink {
            url: self.share_url(&list.slug),
            slug: list.slug,
        })
    }

    /// Owner view of a list.
    pub async fn fetch_owned(&self, list_id: Uuid) -> EngineResult<SavedList> {
        let list = self.store.get_list(list_id).await.map_err(not_found)?;
        Ok(visible(list))
    }

    /// Public view by slug. Lists that were never shared are reported as not found.
    pub async fn fetch_shared(&self, slug: &str) -> EngineResult<SavedList> {
        let list = self.store.get_list_by_slug(slug).await.map_err(not_found)?;
        if list.shared_at.is_none() {
            return Err(EngineError::NotFound(format!("shared list {slug}")));
        }
        Ok(visible(list))
    }
}
