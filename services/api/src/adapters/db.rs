//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CatalogStore` and `ListStore` ports from the core crate. It handles all
//! interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resource_list_core::domain::{
    ItemPatch, ListEntry, ListItem, NewProjectPlan, NewSavedList, Priority, ProjectPlan, Resource,
    SavedList, Section,
};
use resource_list_core::focus::{decode_focus_areas, encode_focus_areas};
use resource_list_core::ports::{CatalogStore, ListStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const RESOURCE_COLUMNS: &str = "id, title, description, resource_type, url, category, \
     creator_name, creator_url, section, difficulty, default_priority, focus_areas";

#[derive(FromRow)]
struct ResourceRecord {
    id: String,
    title: String,
    description: String,
    resource_type: String,
    url: String,
    category: String,
    creator_name: String,
    creator_url: Option<String>,
    section: String,
    difficulty: String,
    default_priority: String,
    focus_areas: Option<String>,
}
impl ResourceRecord {
    fn to_domain(self) -> Resource {
        Resource {
            section: Section::parse(&self.section).unwrap_or(Section::Website),
            default_priority: Priority::parse(&self.default_priority)
                .unwrap_or(Priority::Recommended),
            id: self.id,
            title: self.title,
            description: self.description,
            resource_type: self.resource_type,
            url: self.url,
            category: self.category,
            creator_name: self.creator_name,
            creator_url: self.creator_url,
            difficulty: self.difficulty,
            focus_areas: self.focus_areas,
        }
    }
}

#[derive(FromRow)]
struct PlanRecord {
    id: Uuid,
    name: String,
    project_type: String,
    skill_level: String,
    budget_range: Option<String>,
    timeline: Option<String>,
    focus_areas: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl PlanRecord {
    fn to_domain(self) -> ProjectPlan {
        let focus_areas = decode_focus_areas(&self.focus_areas).unwrap_or_else(|e| {
            warn!("Project plan {} has unreadable focus areas: {}", self.id, e);
            Vec::new()
        });
        ProjectPlan {
            id: self.id,
            name: self.name,
            project_type: self.project_type,
            skill_level: self.skill_level,
            budget_range: self.budget_range,
            timeline: self.timeline,
            focus_areas,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ListRecord {
    id: Uuid,
    project_plan_id: Uuid,
    name: String,
    slug: String,
    shared_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}
impl ListRecord {
    fn to_domain(self, items: Vec<ListEntry>) -> SavedList {
        SavedList {
            id: self.id,
            project_plan_id: self.project_plan_id,
            name: self.name,
            slug: self.slug,
            shared_at: self.shared_at,
            created_at: self.created_at,
            items,
        }
    }
}

#[derive(FromRow)]
struct ItemRecord {
    id: Uuid,
    list_id: Uuid,
    resource_id: String,
    priority: String,
    removed: bool,
    is_favorite: bool,
    sort_order: i32,
}
impl ItemRecord {
    fn to_domain(self) -> ListItem {
        ListItem {
            priority: Priority::parse(&self.priority).unwrap_or(Priority::Optional),
            id: self.id,
            list_id: self.list_id,
            resource_id: self.resource_id,
            removed: self.removed,
            is_favorite: self.is_favorite,
            sort_order: self.sort_order,
        }
    }
}

/// A list item joined with its resource in one row.
#[derive(FromRow)]
struct EntryRecord {
    #[sqlx(flatten)]
    item: ItemRecord,
    title: String,
    description: String,
    resource_type: String,
    url: String,
    category: String,
    creator_name: String,
    creator_url: Option<String>,
    section: String,
    difficulty: String,
    default_priority: String,
    focus_areas: Option<String>,
}
impl EntryRecord {
    fn to_domain(self) -> ListEntry {
        let resource = ResourceRecord {
            id: self.item.resource_id.clone(),
            title: self.title,
            description: self.description,
            resource_type: self.resource_type,
            url: self.url,
            category: self.category,
            creator_name: self.creator_name,
            creator_url: self.creator_url,
            section: self.section,
            difficulty: self.difficulty,
            default_priority: self.default_priority,
            focus_areas: self.focus_areas,
        }
        .to_domain();
        ListEntry {
            item: self.item.to_domain(),
            resource,
        }
    }
}

impl DbAdapter {
    async fn entries_for_list(&self, list_id: Uuid) -> PortResult<Vec<ListEntry>> {
        let records = sqlx::query_as::<_, EntryRecord>(
            "SELECT i.id, i.list_id, i.resource_id, i.priority, i.removed, i.is_favorite, i.sort_order, \
                    r.title, r.description, r.resource_type, r.url, r.category, r.creator_name, \
                    r.creator_url, r.section, r.difficulty, r.default_priority, r.focus_areas \
             FROM list_items i JOIN resources r ON r.id = i.resource_id \
             WHERE i.list_id = $1 ORDER BY i.sort_order ASC, i.id ASC",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn assemble(&self, record: ListRecord) -> PortResult<SavedList> {
        let items = self.entries_for_list(record.id).await?;
        Ok(record.to_domain(items))
    }
}

//=========================================================================================
// `CatalogStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogStore for DbAdapter {
    async fn list_resources(&self) -> PortResult<Vec<Resource>> {
        let records = sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {} FROM resources ORDER BY created_at ASC, id ASC",
            RESOURCE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_resource(&self, id: &str) -> PortResult<Resource> {
        let record = sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {} FROM resources WHERE id = $1",
            RESOURCE_COLUMNS
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Resource {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn upsert_resource(&self, resource: &Resource) -> PortResult<Resource> {
        let record = sqlx::query_as::<_, ResourceRecord>(&format!(
            "INSERT INTO resources ({cols}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO UPDATE SET \
                title = EXCLUDED.title, description = EXCLUDED.description, \
                resource_type = EXCLUDED.resource_type, url = EXCLUDED.url, \
                category = EXCLUDED.category, creator_name = EXCLUDED.creator_name, \
                creator_url = EXCLUDED.creator_url, section = EXCLUDED.section, \
                difficulty = EXCLUDED.difficulty, default_priority = EXCLUDED.default_priority, \
                focus_areas = EXCLUDED.focus_areas, updated_at = now() \
             RETURNING {cols}",
            cols = RESOURCE_COLUMNS
        ))
        .bind(&resource.id)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(&resource.resource_type)
        .bind(&resource.url)
        .bind(&resource.category)
        .bind(&resource.creator_name)
        .bind(&resource.creator_url)
        .bind(resource.section.as_str())
        .bind(&resource.difficulty)
        .bind(resource.default_priority.as_str())
        .bind(&resource.focus_areas)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn insert_resource_if_absent(&self, resource: &Resource) -> PortResult<Resource> {
        sqlx::query(&format!(
            "INSERT INTO resources ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO NOTHING",
            RESOURCE_COLUMNS
        ))
        .bind(&resource.id)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(&resource.resource_type)
        .bind(&resource.url)
        .bind(&resource.category)
        .bind(&resource.creator_name)
        .bind(&resource.creator_url)
        .bind(resource.section.as_str())
        .bind(&resource.difficulty)
        .bind(resource.default_priority.as_str())
        .bind(&resource.focus_areas)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        self.get_resource(&resource.id).await
    }

    async fn count_resources(&self) -> PortResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resources")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count.max(0) as u64)
    }
}

//=========================================================================================
// `ListStore` Trait Implementation
//=========================================================================================

const PLAN_COLUMNS: &str = "id, name, project_type, skill_level, budget_range, timeline, \
     focus_areas, description, created_at, updated_at";

#[async_trait]
impl ListStore for DbAdapter {
    async fn create_plan(&self, plan: &NewProjectPlan) -> PortResult<ProjectPlan> {
        let record = sqlx::query_as::<_, PlanRecord>(&format!(
            "INSERT INTO project_plans \
                (id, name, project_type, skill_level, budget_range, timeline, focus_areas, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&plan.name)
        .bind(&plan.project_type)
        .bind(&plan.skill_level)
        .bind(&plan.budget_range)
        .bind(&plan.timeline)
        .bind(encode_focus_areas(&plan.focus_areas))
        .bind(&plan.description)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_plan(&self, plan_id: Uuid) -> PortResult<ProjectPlan> {
        let record = sqlx::query_as::<_, PlanRecord>(&format!(
            "SELECT {} FROM project_plans WHERE id = $1",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Project plan {} not found", plan_id)))?;
        Ok(record.to_domain())
    }

    async fn update_plan(&self, plan_id: Uuid, plan: &NewProjectPlan) -> PortResult<ProjectPlan> {
        let record = sqlx::query_as::<_, PlanRecord>(&format!(
            "UPDATE project_plans SET name = $2, project_type = $3, skill_level = $4, \
                budget_range = $5, timeline = $6, focus_areas = $7, description = $8, \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .bind(&plan.name)
        .bind(&plan.project_type)
        .bind(&plan.skill_level)
        .bind(&plan.budget_range)
        .bind(&plan.timeline)
        .bind(encode_focus_areas(&plan.focus_areas))
        .bind(&plan.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Project plan {} not found", plan_id)))?;
        Ok(record.to_domain())
    }

    async fn slug_exists(&self, slug: &str) -> PortResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM saved_lists WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(exists)
    }

    async fn create_list(&self, list: &NewSavedList) -> PortResult<SavedList> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let record = sqlx::query_as::<_, ListRecord>(
            "INSERT INTO saved_lists (id, project_plan_id, name, slug) VALUES ($1, $2, $3, $4) \
             RETURNING id, project_plan_id, name, slug, shared_at, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(list.project_plan_id)
        .bind(&list.name)
        .bind(&list.slug)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Slug {} already in use", list.slug))
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => PortError::NotFound(
                format!("Project plan {} not found", list.project_plan_id),
            ),
            _ => unexpected(e),
        })?;

        for item in &list.items {
            sqlx::query(
                "INSERT INTO list_items (id, list_id, resource_id, priority, sort_order) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(record.id)
            .bind(&item.resource_id)
            .bind(item.priority.as_str())
            .bind(item.sort_order)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    PortError::NotFound(format!("Resource {} not found", item.resource_id))
                }
                _ => unexpected(e),
            })?;
        }

        tx.commit().await.map_err(unexpected)?;
        self.assemble(record).await
    }

    async fn get_list(&self, list_id: Uuid) -> PortResult<SavedList> {
        let record = sqlx::query_as::<_, ListRecord>(
            "SELECT id, project_plan_id, name, slug, shared_at, created_at FROM saved_lists WHERE id = $1",
        )
        .bind(list_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("List {} not found", list_id)))?;
        self.assemble(record).await
    }

    async fn get_list_by_slug(&self, slug: &str) -> PortResult<SavedList> {
        let record = sqlx::query_as::<_, ListRecord>(
            "SELECT id, project_plan_id, name, slug, shared_at, created_at FROM saved_lists WHERE slug = $1",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("List with slug {} not found", slug)))?;
        self.assemble(record).await
    }

    async fn update_item(
        &self,
        list_id: Uuid,
        item_id: Uuid,
        patch: &ItemPatch,
    ) -> PortResult<ListItem> {
        let record = sqlx::query_as::<_, ItemRecord>(
            "UPDATE list_items SET \
                removed = COALESCE($3, removed), \
                is_favorite = COALESCE($4, is_favorite), \
                sort_order = COALESCE($5, sort_order) \
             WHERE id = $1 AND list_id = $2 \
             RETURNING id, list_id, resource_id, priority, removed, is_favorite, sort_order",
        )
        .bind(item_id)
        .bind(list_id)
        .bind(patch.removed)
        .bind(patch.is_favorite)
        .bind(patch.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            not_found_or_unexpected(e, format!("Item {} not found in list {}", item_id, list_id))
        })?;
        Ok(record.to_domain())
    }

    async fn mark_shared(&self, list_id: Uuid, shared_at: DateTime<Utc>) -> PortResult<SavedList> {
        let record = sqlx::query_as::<_, ListRecord>(
            "UPDATE saved_lists SET shared_at = $2 WHERE id = $1 \
             RETURNING id, project_plan_id, name, slug, shared_at, created_at",
        )
        .bind(list_id)
        .bind(shared_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("List {} not found", list_id)))?;
        self.assemble(record).await
    }
}
