//! crates/resource_list_core/src/catalog.rs
//!
//! Catalog helpers: browse/search filtering and ingestion-time tag population.

use crate::domain::{FocusArea, Resource, SkillLevel};
use crate::focus::{encode_focus_areas, resolve_focus_areas};

/// Browse filters. Every set field must match; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    /// Case-insensitive substring match against title, description and creator.
    pub query: Option<String>,
    pub category: Option<String>,
    pub resource_type: Option<String>,
    pub difficulty: Option<SkillLevel>,
    pub focus_area: Option<FocusArea>,
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let needle = query.to_lowercase();
            let found = [&resource.title, &resource.description, &resource.creator_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !resource.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }
        if let Some(resource_type) = &self.resource_type {
            if !resource.resource_type.eq_ignore_ascii_case(resource_type.trim()) {
                return false;
            }
        }
        if let Some(difficulty) = self.difficulty {
            if SkillLevel::parse(&resource.difficulty) != Some(difficulty) {
                return false;
            }
        }
        if let Some(area) = self.focus_area {
            if !resolve_focus_areas(resource).contains(&area) {
                return false;
            }
        }
        true
    }
}

pub fn filter_resources(resources: Vec<Resource>, filter: &ResourceFilter) -> Vec<Resource> {
    resources.into_iter().filter(|r| filter.matches(r)).collect()
}

/// Normalizes a resource before it is written to the catalog: stored tags are
/// rewritten in canonical form, and missing or unusable tags are filled in
/// from the category mapping.
pub fn prepare_for_ingest(mut resource: Resource) -> Resource {
    let areas = resolve_focus_areas(&resource);
    resource.focus_areas = Some(encode_focus_areas(&areas));
    resource
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Section};

    fn resource(id: &str, title: &str, category: &str, kind: &str, difficulty: &str) -> Resource {
        Resource {
            id: id.into(),
            title: title.into(),
            description: format!("All about {title}"),
            resource_type: kind.into(),
            url: format!("https://example.com/{id}"),
            category: category.into(),
            creator_name: "Studio".into(),
            creator_url: None,
            section: Section::VideoHosting,
            difficulty: difficulty.into(),
            default_priority: Priority::Recommended,
            focus_areas: None,
        }
    }

    fn catalog() -> Vec<Resource> {
        vec![
            resource("1", "Logo basics", "Logo Design", "video", "beginner"),
            resource("2", "Ticket bots", "Bots", "tool", "advanced"),
            resource("3", "Writing SOPs", "Documentation", "guide", "intermediate"),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(filter_resources(catalog(), &ResourceFilter::default()).len(), 3);
    }

    #[test]
    fn filters_combine() {
        let filter = ResourceFilter {
            query: Some("BOTS".into()),
            resource_type: Some("tool".into()),
            ..Default::default()
        };
        let found = filter_resources(catalog(), &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");
    }

    #[test]
    fn focus_area_filter_uses_category_mapping_for_untagged_resources() {
        let filter = ResourceFilter {
            focus_area: Some(FocusArea::Branding),
            ..Default::default()
        };
        let found = filter_resources(catalog(), &filter);
        assert_eq!(found.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn ingest_fills_missing_tags() {
        let prepared = prepare_for_ingest(resource("2", "Ticket bots", "Bots", "tool", "advanced"));
        assert_eq!(prepared.focus_areas.as_deref(), Some(r#"["Automation / Bots"]"#));
    }

    #[test]
    fn ingest_canonicalizes_existing_tags() {
        let mut r = resource("1", "Logo basics", "Logo Design", "video", "beginner");
        r.focus_areas = Some(r#"["branding", "Nonsense"]"#.into());
        assert_eq!(prepare_for_ingest(r).focus_areas.as_deref(), Some(r#"["Branding"]"#));
    }
}
