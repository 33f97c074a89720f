//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use resource_list_core::ports::{CatalogStore, ListStore};
use resource_list_core::{ListService, ResourceListEngine};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub plans: Arc<dyn ListStore>,
    pub engine: Arc<ResourceListEngine>,
    pub lists: ListService,
}
