//! crates/resource_list_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    ItemPatch, ListItem, NewProjectPlan, NewSavedList, ProjectPlan, Resource, SavedList,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint was violated (e.g. a duplicate share slug).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The external provider reported an exhausted quota or rate limit.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("The operation timed out")]
    Timeout,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read access to the resource catalog, plus the writes used by manual lists
/// and catalog seeding.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Returns every resource in stable catalog order.
    async fn list_resources(&self) -> PortResult<Vec<Resource>>;

    async fn get_resource(&self, id: &str) -> PortResult<Resource>;

    /// Inserts or overwrites a catalog row. Only catalog ingestion uses this.
    async fn upsert_resource(&self, resource: &Resource) -> PortResult<Resource>;

    /// Inserts the resource unless its id is already taken, and returns the
    /// stored row. An existing row is returned unchanged.
    async fn insert_resource_if_absent(&self, resource: &Resource) -> PortResult<Resource>;

    async fn count_resources(&self) -> PortResult<u64>;
}

/// Persistence for project plans, saved lists and their items.
#[async_trait]
pub trait ListStore: Send + Sync {
    // --- Project Plans ---
    async fn create_plan(&self, plan: &NewProjectPlan) -> PortResult<ProjectPlan>;

    async fn get_plan(&self, plan_id: Uuid) -> PortResult<ProjectPlan>;

    async fn update_plan(&self, plan_id: Uuid, plan: &NewProjectPlan) -> PortResult<ProjectPlan>;

    // --- Saved Lists ---
    async fn slug_exists(&self, slug: &str) -> PortResult<bool>;

    /// Creates the list and all of its items atomically.
    /// Must return `PortError::Conflict` when the slug is already taken.
    async fn create_list(&self, list: &NewSavedList) -> PortResult<SavedList>;

    /// Returns the list with every item, including soft-removed ones.
    async fn get_list(&self, list_id: Uuid) -> PortResult<SavedList>;

    /// Returns the list with every item regardless of its `shared_at` state.
    async fn get_list_by_slug(&self, slug: &str) -> PortResult<SavedList>;

    /// Applies the patch to the item matching both ids. An item that exists
    /// under a different list is `NotFound`.
    async fn update_item(
        &self,
        list_id: Uuid,
        item_id: Uuid,
        patch: &ItemPatch,
    ) -> PortResult<ListItem>;

    async fn mark_shared(&self, list_id: Uuid, shared_at: DateTime<Utc>) -> PortResult<SavedList>;
}

#[async_trait]
pub trait ClassificationProvider: Send + Sync {
    /// Sends a system and user prompt to the model and returns the raw JSON
    /// text of its reply. Validation of that text is the caller's job.
    async fn complete_json(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String>;
}

//=========================================================================================
// Clock and slug sources
//=========================================================================================

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Produces candidate share slugs. Uniqueness is checked by the caller.
pub trait SlugSource: Send + Sync {
    fn next_slug(&self) -> String;
}

pub const SLUG_LENGTH: usize = 10;

/// Short lowercase hex slugs cut from a random v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomHexSlugs;

impl SlugSource for RandomHexSlugs {
    fn next_slug(&self) -> String {
        let mut slug = Uuid::new_v4().simple().to_string();
        slug.truncate(SLUG_LENGTH);
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_slugs_are_short_hex() {
        let slug = RandomHexSlugs.next_slug();
        assert_eq!(slug.len(), SLUG_LENGTH);
        assert!(slug.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn manual_clock_advances_only_on_request() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::minutes(5));
        assert_eq!(clock.now(), start + chrono::Duration::minutes(5));
    }
}
