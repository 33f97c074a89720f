//! crates/resource_list_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowercases a label and strips everything except letters and digits, so that
/// "Automation / Bots", "automation/bots" and "AUTOMATION BOTS" compare equal.
pub(crate) fn label_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

//=========================================================================================
// Taxonomies
//=========================================================================================

/// The closed set of focus areas used by the resource list engine.
///
/// Every tag stored on a resource or produced by classification is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FocusArea {
    #[serde(rename = "Graphic Design")]
    GraphicDesign,
    #[serde(rename = "Branding")]
    Branding,
    #[serde(rename = "Server Setup")]
    ServerSetup,
    #[serde(rename = "Automation / Bots")]
    AutomationBots,
    #[serde(rename = "Staff & Management")]
    StaffManagement,
    #[serde(rename = "Marketing & Growth")]
    MarketingGrowth,
    #[serde(rename = "Documentation / SOPs")]
    DocumentationSops,
}

impl FocusArea {
    pub const ALL: [FocusArea; 7] = [
        FocusArea::GraphicDesign,
        FocusArea::Branding,
        FocusArea::ServerSetup,
        FocusArea::AutomationBots,
        FocusArea::StaffManagement,
        FocusArea::MarketingGrowth,
        FocusArea::DocumentationSops,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::GraphicDesign => "Graphic Design",
            FocusArea::Branding => "Branding",
            FocusArea::ServerSetup => "Server Setup",
            FocusArea::AutomationBots => "Automation / Bots",
            FocusArea::StaffManagement => "Staff & Management",
            FocusArea::MarketingGrowth => "Marketing & Growth",
            FocusArea::DocumentationSops => "Documentation / SOPs",
        }
    }

    /// Parses a focus area label, ignoring case, spacing and punctuation.
    /// Returns `None` for anything outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        let key = label_key(value);
        if key.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|area| label_key(area.as_str()) == key)
    }
}

impl std::fmt::Display for FocusArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The assistant's own category vocabulary.
///
/// This is a separate taxonomy from [`FocusArea`]; the two are connected only
/// through [`CanonicalCategory::focus_area`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalCategory {
    #[serde(rename = "Design and Visuals")]
    DesignAndVisuals,
    #[serde(rename = "Branding and Identity")]
    BrandingAndIdentity,
    #[serde(rename = "Community Setup")]
    CommunitySetup,
    #[serde(rename = "Automation and Systems")]
    AutomationAndSystems,
    #[serde(rename = "Moderation and Staff")]
    ModerationAndStaff,
    #[serde(rename = "Growth and Marketing")]
    GrowthAndMarketing,
    #[serde(rename = "Documentation and Process")]
    DocumentationAndProcess,
}

impl CanonicalCategory {
    pub const ALL: [CanonicalCategory; 7] = [
        CanonicalCategory::DesignAndVisuals,
        CanonicalCategory::BrandingAndIdentity,
        CanonicalCategory::CommunitySetup,
        CanonicalCategory::AutomationAndSystems,
        CanonicalCategory::ModerationAndStaff,
        CanonicalCategory::GrowthAndMarketing,
        CanonicalCategory::DocumentationAndProcess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalCategory::DesignAndVisuals => "Design and Visuals",
            CanonicalCategory::BrandingAndIdentity => "Branding and Identity",
            CanonicalCategory::CommunitySetup => "Community Setup",
            CanonicalCategory::AutomationAndSystems => "Automation and Systems",
            CanonicalCategory::ModerationAndStaff => "Moderation and Staff",
            CanonicalCategory::GrowthAndMarketing => "Growth and Marketing",
            CanonicalCategory::DocumentationAndProcess => "Documentation and Process",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let key = label_key(value);
        if key.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|c| label_key(c.as_str()) == key)
    }

    /// The fixed, total mapping from assistant categories to focus areas.
    pub fn focus_area(&self) -> FocusArea {
        match self {
            CanonicalCategory::DesignAndVisuals => FocusArea::GraphicDesign,
            CanonicalCategory::BrandingAndIdentity => FocusArea::Branding,
            CanonicalCategory::CommunitySetup => FocusArea::ServerSetup,
            CanonicalCategory::AutomationAndSystems => FocusArea::AutomationBots,
            CanonicalCategory::ModerationAndStaff => FocusArea::StaffManagement,
            CanonicalCategory::GrowthAndMarketing => FocusArea::MarketingGrowth,
            CanonicalCategory::DocumentationAndProcess => FocusArea::DocumentationSops,
        }
    }
}

impl std::fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered skill scale shared by users and resource difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn rank(&self) -> u8 {
        match self {
            SkillLevel::Beginner => 0,
            SkillLevel::Intermediate => 1,
            SkillLevel::Advanced => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }

    /// Difficulty and skill are free text; anything unrecognized is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" => Some(SkillLevel::Beginner),
            "intermediate" => Some(SkillLevel::Intermediate),
            "advanced" => Some(SkillLevel::Advanced),
            _ => None,
        }
    }
}

/// Priority tier, both as a resource's editorial default and as an assigned tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Required,
    Recommended,
    Optional,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Required => "required",
            Priority::Recommended => "recommended",
            Priority::Optional => "optional",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "required" => Some(Priority::Required),
            "recommended" => Some(Priority::Recommended),
            "optional" => Some(Priority::Optional),
            _ => None,
        }
    }
}

/// Where a resource lives: on a video host or on a generic website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    VideoHosting,
    Website,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::VideoHosting => "video-hosting",
            Section::Website => "website",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "video-hosting" | "youtube" | "video" => Some(Section::VideoHosting),
            "website" | "websites" => Some(Section::Website),
            _ => None,
        }
    }
}

//=========================================================================================
// Catalog
//=========================================================================================

/// A catalog entry. The core only reads these, except for adding unknown ids from manual lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    /// video, guide, website, tool, document, font-library, color-tool, inspiration
    pub resource_type: String,
    pub url: String,
    pub category: String,
    pub creator_name: String,
    pub creator_url: Option<String>,
    pub section: Section,
    /// Conventionally beginner/intermediate/advanced, but stored as free text.
    pub difficulty: String,
    pub default_priority: Priority,
    /// Focus-area tags exactly as serialized in storage (a JSON list of strings).
    /// Use [`crate::focus::resolve_focus_areas`] to read them.
    pub focus_areas: Option<String>,
}

/// A resource with its computed relevance score and assigned tier.
/// Only lives for the duration of one scoring call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResource {
    pub resource: Resource,
    pub score: f64,
    pub priority: Priority,
}

/// The three presentation tiers produced by a bucketer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    pub required: Vec<ScoredResource>,
    pub recommended: Vec<ScoredResource>,
    pub optional: Vec<ScoredResource>,
}

impl Grouping {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.recommended.is_empty() && self.optional.is_empty()
    }

    pub fn len(&self) -> usize {
        self.required.len() + self.recommended.len() + self.optional.len()
    }

    /// Iterates all tiers in order: required, recommended, optional.
    pub fn iter(&self) -> impl Iterator<Item = &ScoredResource> {
        self.required
            .iter()
            .chain(self.recommended.iter())
            .chain(self.optional.iter())
    }
}

//=========================================================================================
// Plans and saved lists
//=========================================================================================

/// A user's stated intent, captured by the intake form or a manual selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPlan {
    pub id: Uuid,
    pub name: String,
    pub project_type: String,
    pub skill_level: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub focus_areas: Vec<FocusArea>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable fields of a project plan, used for both create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProjectPlan {
    pub name: String,
    pub project_type: String,
    pub skill_level: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub focus_areas: Vec<FocusArea>,
    pub description: Option<String>,
}

/// One entry of a saved list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: Uuid,
    pub list_id: Uuid,
    pub resource_id: String,
    pub priority: Priority,
    pub removed: bool,
    pub is_favorite: bool,
    pub sort_order: i32,
}

/// A list item joined with the resource it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub item: ListItem,
    pub resource: Resource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedList {
    pub id: Uuid,
    pub project_plan_id: Uuid,
    pub name: String,
    pub slug: String,
    /// The list is publicly readable by slug only once this is set.
    pub shared_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ListEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewListItem {
    pub resource_id: String,
    pub priority: Priority,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSavedList {
    pub project_plan_id: Uuid,
    pub name: String,
    pub slug: String,
    pub items: Vec<NewListItem>,
}

/// A partial update of a list item's mutable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub removed: Option<bool>,
    pub is_favorite: Option<bool>,
    pub sort_order: Option<i32>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.removed.is_none() && self.is_favorite.is_none() && self.sort_order.is_none()
    }
}
