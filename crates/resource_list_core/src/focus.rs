//! crates/resource_list_core/src/focus.rs
//!
//! The focus-area mapper: a static table from free-form catalog categories to
//! canonical focus areas, plus the encode/decode helpers for stored tags.

use std::collections::HashSet;
use tracing::warn;

use crate::domain::{label_key, FocusArea, Resource};

use FocusArea::*;

/// Used when a category is not in the table.
pub const DEFAULT_FOCUS_AREA: FocusArea = GraphicDesign;

/// Known catalog categories. Keys are compared after [`label_key`] normalization.
const CATEGORY_TABLE: &[(&str, &[FocusArea])] = &[
    ("Graphic Design", &[GraphicDesign]),
    ("Design", &[GraphicDesign]),
    ("Logo Design", &[GraphicDesign, Branding]),
    ("Typography", &[GraphicDesign]),
    ("Fonts", &[GraphicDesign]),
    ("Color Theory", &[GraphicDesign]),
    ("Colors", &[GraphicDesign]),
    ("Inspiration", &[GraphicDesign]),
    ("Design and Visuals", &[GraphicDesign]),
    ("Branding", &[Branding]),
    ("Brand Identity", &[Branding, GraphicDesign]),
    ("Branding and Identity", &[Branding]),
    ("Server Setup", &[ServerSetup]),
    ("Discord Setup", &[ServerSetup]),
    ("Community Setup", &[ServerSetup]),
    ("Roles and Permissions", &[ServerSetup, StaffManagement]),
    ("Bots", &[AutomationBots]),
    ("Automation", &[AutomationBots]),
    ("Automation and Systems", &[AutomationBots]),
    ("Webhooks", &[AutomationBots]),
    ("Moderation", &[StaffManagement]),
    ("Staff Management", &[StaffManagement]),
    ("Moderation and Staff", &[StaffManagement]),
    ("Leadership", &[StaffManagement]),
    ("Marketing", &[MarketingGrowth]),
    ("Growth", &[MarketingGrowth]),
    ("Growth and Marketing", &[MarketingGrowth]),
    ("Social Media", &[MarketingGrowth]),
    ("Partnerships", &[MarketingGrowth]),
    ("Events", &[MarketingGrowth, StaffManagement]),
    ("Documentation", &[DocumentationSops]),
    ("SOPs", &[DocumentationSops]),
    ("Documentation and Process", &[DocumentationSops]),
    ("Policies", &[DocumentationSops, StaffManagement]),
];

/// Maps a catalog category to one or more focus areas. Never returns an empty list.
pub fn map_category_to_focus_areas(category: &str) -> Vec<FocusArea> {
    let key = label_key(category);
    if let Some((_, areas)) = CATEGORY_TABLE.iter().find(|(name, _)| label_key(name) == key) {
        return areas.to_vec();
    }
    // A category spelled exactly like a focus area maps to itself.
    if let Some(area) = FocusArea::parse(category) {
        return vec![area];
    }
    vec![DEFAULT_FOCUS_AREA]
}

/// Normalized keys of every known category that maps into at least one of `targets`.
/// Used for the category cross-reference bonus.
pub fn categories_for_focus_areas(targets: &[FocusArea]) -> HashSet<String> {
    let mut keys: HashSet<String> = CATEGORY_TABLE
        .iter()
        .filter(|(_, areas)| areas.iter().any(|a| targets.contains(a)))
        .map(|(name, _)| label_key(name))
        .collect();
    keys.extend(targets.iter().map(|t| label_key(t.as_str())));
    keys
}

/// Returns true if `category` is one of the keys produced by [`categories_for_focus_areas`].
pub fn category_in(category: &str, keys: &HashSet<String>) -> bool {
    keys.contains(&label_key(category))
}

//=========================================================================================
// Stored tag encoding
//=========================================================================================

/// Keeps only members of the closed set, drops duplicates, preserves order.
pub fn sanitize_focus_areas<S: AsRef<str>>(values: &[S]) -> Vec<FocusArea> {
    let mut out = Vec::new();
    for value in values {
        if let Some(area) = FocusArea::parse(value.as_ref()) {
            if !out.contains(&area) {
                out.push(area);
            }
        }
    }
    out
}

pub fn encode_focus_areas(areas: &[FocusArea]) -> String {
    let labels: Vec<&str> = areas.iter().map(|a| a.as_str()).collect();
    serde_json::to_string(&labels).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes a serialized tag list. Unknown labels are dropped; only a payload that
/// is not a JSON list of strings is an error.
pub fn decode_focus_areas(raw: &str) -> Result<Vec<FocusArea>, serde_json::Error> {
    let labels: Vec<String> = serde_json::from_str(raw)?;
    Ok(sanitize_focus_areas(&labels))
}

/// The focus areas the engine should use for a resource.
///
/// Falls back to the category mapping when the stored tags are missing, empty,
/// contain no valid labels, or cannot be parsed at all.
pub fn resolve_focus_areas(resource: &Resource) -> Vec<FocusArea> {
    let raw = match resource.focus_areas.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return map_category_to_focus_areas(&resource.category),
    };

    match decode_focus_areas(raw) {
        Ok(areas) if !areas.is_empty() => areas,
        Ok(_) => map_category_to_focus_areas(&resource.category),
        Err(e) => {
            warn!(
                resource_id = %resource.id,
                error = %e,
                "Malformed focus-area tags; using category mapping"
            );
            map_category_to_focus_areas(&resource.category)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Section};

    fn resource(category: &str, tags: Option<&str>) -> Resource {
        Resource {
            id: "r1".into(),
            title: "Title".into(),
            description: String::new(),
            resource_type: "guide".into(),
            url: "https://example.com".into(),
            category: category.into(),
            creator_name: "someone".into(),
            creator_url: None,
            section: Section::Website,
            difficulty: "beginner".into(),
            default_priority: Priority::Recommended,
            focus_areas: tags.map(str::to_string),
        }
    }

    #[test]
    fn known_categories_map_case_insensitively() {
        assert_eq!(map_category_to_focus_areas("logo design"), vec![GraphicDesign, Branding]);
        assert_eq!(map_category_to_focus_areas("BOTS"), vec![AutomationBots]);
        assert_eq!(map_category_to_focus_areas("Automation and Systems"), vec![AutomationBots]);
    }

    #[test]
    fn unknown_category_falls_back_to_default() {
        assert_eq!(map_category_to_focus_areas("Underwater Basket Weaving"), vec![DEFAULT_FOCUS_AREA]);
        assert_eq!(map_category_to_focus_areas(""), vec![DEFAULT_FOCUS_AREA]);
    }

    #[test]
    fn focus_area_label_as_category_maps_to_itself() {
        assert_eq!(map_category_to_focus_areas("Marketing & Growth"), vec![MarketingGrowth]);
    }

    #[test]
    fn implied_categories_cover_targets() {
        let keys = categories_for_focus_areas(&[Branding]);
        assert!(category_in("Logo Design", &keys));
        assert!(category_in("branding", &keys));
        assert!(!category_in("Bots", &keys));
        assert!(!category_in("Automation and Systems", &keys));
    }

    #[test]
    fn decode_drops_unknown_labels() {
        let areas = decode_focus_areas(r#"["Branding","Cooking","branding","Server Setup"]"#).unwrap();
        assert_eq!(areas, vec![Branding, ServerSetup]);
    }

    #[test]
    fn encode_then_decode_preserves_tags() {
        let encoded = encode_focus_areas(&[StaffManagement, DocumentationSops]);
        assert_eq!(decode_focus_areas(&encoded).unwrap(), vec![StaffManagement, DocumentationSops]);
    }

    #[test]
    fn malformed_tags_use_category_mapping() {
        let r = resource("Bots", Some("not json ["));
        assert_eq!(resolve_focus_areas(&r), vec![AutomationBots]);
    }

    #[test]
    fn empty_or_invalid_tags_use_category_mapping() {
        assert_eq!(resolve_focus_areas(&resource("Marketing", Some("[]"))), vec![MarketingGrowth]);
        assert_eq!(resolve_focus_areas(&resource("Marketing", Some(r#"["Nope"]"#))), vec![MarketingGrowth]);
        assert_eq!(resolve_focus_areas(&resource("Marketing", None)), vec![MarketingGrowth]);
    }

    #[test]
    fn stored_tags_win_over_category() {
        let r = resource("Marketing", Some(r#"["Branding"]"#));
        assert_eq!(resolve_focus_areas(&r), vec![Branding]);
    }
}
