//! crates/resource_list_core/src/memory.rs
//!
//! An in-process implementation of the storage ports. Behaves like the
//! Postgres adapter (unique slugs, list/item scoping) without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::{
    ItemPatch, ListEntry, ListItem, NewProjectPlan, NewSavedList, ProjectPlan, Resource, SavedList,
};
use crate::ports::{CatalogStore, ListStore, PortError, PortResult};

struct ListRow {
    id: Uuid,
    project_plan_id: Uuid,
    name: String,
    slug: String,
    shared_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    resources: Vec<Resource>,
    plans: HashMap<Uuid, ProjectPlan>,
    lists: Vec<ListRow>,
    items: Vec<ListItem>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(resources: Vec<Resource>) -> Self {
        let store = Self::default();
        store.lock_tables().resources = resources;
        store
    }

    /// Number of stored project plans.
    pub fn plan_count(&self) -> usize {
        self.lock_tables().plans.len()
    }

    fn lock_tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Tables {
    fn assemble(&self, row: &ListRow) -> PortResult<SavedList> {
        let mut items = Vec::new();
        for item in self.items.iter().filter(|i| i.list_id == row.id) {
            let resource = self
                .resources
                .iter()
                .find(|r| r.id == item.resource_id)
                .cloned()
                .ok_or_else(|| PortError::Unexpected(format!("Resource {} missing", item.resource_id)))?;
            items.push(ListEntry {
                item: item.clone(),
                resource,
            });
        }
        Ok(SavedList {
            id: row.id,
            project_plan_id: row.project_plan_id,
            name: row.name.clone(),
            slug: row.slug.clone(),
            shared_at: row.shared_at,
            created_at: row.created_at,
            items,
        })
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_resources(&self) -> PortResult<Vec<Resource>> {
        Ok(self.lock_tables().resources.clone())
    }

    async fn get_resource(&self, id: &str) -> PortResult<Resource> {
        self.lock_tables()
            .resources
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Resource {} not found", id)))
    }

    async fn upsert_resource(&self, resource: &Resource) -> PortResult<Resource> {
        let mut tables = self.lock_tables();
        match tables.resources.iter().position(|r| r.id == resource.id) {
            Some(index) => tables.resources[index] = resource.clone(),
            None => tables.resources.push(resource.clone()),
        }
        Ok(resource.clone())
    }

    async fn insert_resource_if_absent(&self, resource: &Resource) -> PortResult<Resource> {
        let mut tables = self.lock_tables();
        if let Some(existing) = tables.resources.iter().find(|r| r.id == resource.id) {
            return Ok(existing.clone());
        }
        tables.resources.push(resource.clone());
        Ok(resource.clone())
    }

    async fn count_resources(&self) -> PortResult<u64> {
        Ok(self.lock_tables().resources.len() as u64)
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn create_plan(&self, plan: &NewProjectPlan) -> PortResult<ProjectPlan> {
        let now = Utc::now();
        let created = ProjectPlan {
            id: Uuid::new_v4(),
            name: plan.name.clone(),
            project_type: plan.project_type.clone(),
            skill_level: plan.skill_level.clone(),
            budget_range: plan.budget_range.clone(),
            timeline: plan.timeline.clone(),
            focus_areas: plan.focus_areas.clone(),
            description: plan.description.clone(),
            created_at: now,
            updated_at: now,
        };
        self.lock_tables().plans.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_plan(&self, plan_id: Uuid) -> PortResult<ProjectPlan> {
        self.lock_tables()
            .plans
            .get(&plan_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Project plan {} not found", plan_id)))
    }

    async fn update_plan(&self, plan_id: Uuid, plan: &NewProjectPlan) -> PortResult<ProjectPlan> {
        let mut tables = self.lock_tables();
        let existing = tables
            .plans
            .get_mut(&plan_id)
            .ok_or_else(|| PortError::NotFound(format!("Project plan {} not found", plan_id)))?;
        existing.name = plan.name.clone();
        existing.project_type = plan.project_type.clone();
        existing.skill_level = plan.skill_level.clone();
        existing.budget_range = plan.budget_range.clone();
        existing.timeline = plan.timeline.clone();
        existing.focus_areas = plan.focus_areas.clone();
        existing.description = plan.description.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn slug_exists(&self, slug: &str) -> PortResult<bool> {
        Ok(self.lock_tables().lists.iter().any(|l| l.slug == slug))
    }

    async fn create_list(&self, list: &NewSavedList) -> PortResult<SavedList> {
        let mut tables = self.lock_tables();
        if tables.lists.iter().any(|l| l.slug == list.slug) {
            return Err(PortError::Conflict(format!("Slug {} already in use", list.slug)));
        }
        if !tables.plans.contains_key(&list.project_plan_id) {
            return Err(PortError::NotFound(format!(
                "Project plan {} not found",
                list.project_plan_id
            )));
        }
        if let Some(missing) = list
            .items
            .iter()
            .find(|i| !tables.resources.iter().any(|r| r.id == i.resource_id))
        {
            return Err(PortError::NotFound(format!("Resource {} not found", missing.resource_id)));
        }

        let row = ListRow {
            id: Uuid::new_v4(),
            project_plan_id: list.project_plan_id,
            name: list.name.clone(),
            slug: list.slug.clone(),
            shared_at: None,
            created_at: Utc::now(),
        };
        for new_item in &list.items {
            tables.items.push(ListItem {
                id: Uuid::new_v4(),
                list_id: row.id,
                resource_id: new_item.resource_id.clone(),
                priority: new_item.priority,
                removed: false,
                is_favorite: false,
                sort_order: new_item.sort_order,
            });
        }
        let saved = tables.assemble(&row)?;
        tables.lists.push(row);
        Ok(saved)
    }

    async fn get_list(&self, list_id: Uuid) -> PortResult<SavedList> {
        let tables = self.lock_tables();
        let row = tables
            .lists
            .iter()
            .find(|l| l.id == list_id)
            .ok_or_else(|| PortError::NotFound(format!("List {} not found", list_id)))?;
        tables.assemble(row)
    }

    async fn get_list_by_slug(&self, slug: &str) -> PortResult<SavedList> {
        let tables = self.lock_tables();
        let row = tables
            .lists
            .iter()
            .find(|l| l.slug == slug)
            .ok_or_else(|| PortError::NotFound(format!("List with slug {} not found", slug)))?;
        tables.assemble(row)
    }

    async fn update_item(
        &self,
        list_id: Uuid,
        item_id: Uuid,
        patch: &ItemPatch,
    ) -> PortResult<ListItem> {
        let mut tables = self.lock_tables();
        let item = tables
            .items
            .iter_mut()
            .find(|i| i.id == item_id && i.list_id == list_id)
            .ok_or_else(|| PortError::NotFound(format!("Item {} not found in list {}", item_id, list_id)))?;
        if let Some(removed) = patch.removed {
            item.removed = removed;
        }
        if let Some(is_favorite) = patch.is_favorite {
            item.is_favorite = is_favorite;
        }
        if let Some(sort_order) = patch.sort_order {
            item.sort_order = sort_order;
        }
        Ok(item.clone())
    }

    async fn mark_shared(&self, list_id: Uuid, shared_at: DateTime<Utc>) -> PortResult<SavedList> {
        let mut tables = self.lock_tables();
        let index = tables
            .lists
            .iter()
            .position(|l| l.id == list_id)
            .ok_or_else(|| PortError::NotFound(format!("List {} not found", list_id)))?;
        tables.lists[index].shared_at = Some(shared_at);
        tables.assemble(&tables.lists[index])
    }
}
