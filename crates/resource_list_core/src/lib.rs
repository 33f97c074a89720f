pub mod bucketing;
pub mod catalog;
pub mod classifier;
pub mod domain;
pub mod engine;
pub mod error;
pub mod focus;
pub mod memory;
pub mod ports;
pub mod scoring;
pub mod sharing;

pub use domain::{
    CanonicalCategory, FocusArea, Grouping, ItemPatch, ListEntry, ListItem, NewProjectPlan,
    Priority, ProjectPlan, Resource, SavedList, ScoredResource, Section, SkillLevel,
};
pub use engine::{AssistantRecommendation, GeneratedList, GenerationRequest, ResourceListEngine};
pub use error::{EngineError, EngineResult};
pub use ports::{
    CatalogStore, ClassificationProvider, Clock, ListStore, PortError, PortResult, SlugSource,
    SystemClock,
};
pub use sharing::{ListService, ManualSelection, ShareLink};
