//! crates/resource_list_core/src/scoring.rs
//!
//! Relevance scoring of catalog resources against a classified intent.

use std::collections::HashSet;

use crate::classifier::AssistantClassification;
use crate::domain::{FocusArea, Priority, Resource, ScoredResource, SkillLevel};
use crate::focus::{categories_for_focus_areas, category_in, resolve_focus_areas};

/// Signal weights. The defaults are the reference tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    /// Per matching tag when targets are not split into primary/secondary.
    pub focus_match: f64,
    pub primary_match: f64,
    pub secondary_match: f64,
    /// Category cross-reference bonus on the list-engine path.
    pub category_bonus: f64,
    /// Category cross-reference bonus on the assistant path.
    pub assistant_category_bonus: f64,
    pub skill: f64,
    pub default_priority: f64,
    /// Per query token found in the resource's text.
    pub query_token: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            focus_match: 10.0,
            primary_match: 12.0,
            secondary_match: 6.0,
            category_bonus: 3.0,
            assistant_category_bonus: 4.0,
            skill: 3.0,
            default_priority: 2.0,
            query_token: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FocusTargets {
    Flat(Vec<FocusArea>),
    Split {
        primary: Vec<FocusArea>,
        secondary: Vec<FocusArea>,
    },
}

/// Everything about the request that scoring needs, computed once per call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreContext {
    targets: FocusTargets,
    implied_categories: HashSet<String>,
    skill: Option<SkillLevel>,
    query_tokens: Vec<String>,
    assistant: bool,
}

impl ScoreContext {
    /// Context for project-plan driven list generation.
    pub fn for_focus_areas(targets: &[FocusArea], skill: Option<SkillLevel>) -> Self {
        Self {
            targets: FocusTargets::Flat(targets.to_vec()),
            implied_categories: categories_for_focus_areas(targets),
            skill,
            query_tokens: Vec::new(),
            assistant: false,
        }
    }

    /// Context for the free-text assistant, with primary/secondary weighting
    /// and query-token overlap.
    pub fn for_assistant(classification: &AssistantClassification, query: &str) -> Self {
        let mut primary: Vec<FocusArea> = Vec::new();
        for area in classification.primary.iter().map(|c| c.focus_area()) {
            if !primary.contains(&area) {
                primary.push(area);
            }
        }
        let mut secondary: Vec<FocusArea> = Vec::new();
        for area in classification.secondary.iter().map(|c| c.focus_area()) {
            if !primary.contains(&area) && !secondary.contains(&area) {
                secondary.push(area);
            }
        }

        let all: Vec<FocusArea> = primary.iter().chain(secondary.iter()).copied().collect();
        Self {
            implied_categories: categories_for_focus_areas(&all),
            targets: FocusTargets::Split { primary, secondary },
            skill: Some(classification.skill),
            query_tokens: query_tokens(query),
            assistant: true,
        }
    }
}

/// Whitespace-delimited, lowercased tokens longer than two characters.
pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() > 2)
        .collect()
}

/// Credit for how close a resource's difficulty is to the user's skill.
pub fn skill_credit(difficulty: &str, user: Option<SkillLevel>) -> f64 {
    match (SkillLevel::parse(difficulty), user) {
        (Some(resource), Some(user)) => match resource.rank().abs_diff(user.rank()) {
            0 => 1.0,
            1 => 0.5,
            _ => 0.2,
        },
        _ => 0.5,
    }
}

pub fn priority_credit(priority: Priority) -> f64 {
    match priority {
        Priority::Required => 1.0,
        Priority::Recommended => 0.5,
        Priority::Optional => 0.0,
    }
}

/// Scores one resource. The result is never negative.
///
/// Skill and default-priority credit only count once the resource has some
/// relevance signal (tag overlap, category cross-reference or query tokens);
/// a resource with none scores exactly zero.
pub fn score(resource: &Resource, ctx: &ScoreContext, weights: &ScoreWeights) -> f64 {
    let tags = resolve_focus_areas(resource);

    let mut relevance = match &ctx.targets {
        FocusTargets::Flat(targets) => {
            tags.iter().filter(|t| targets.contains(t)).count() as f64 * weights.focus_match
        }
        FocusTargets::Split { primary, secondary } => {
            let p = tags.iter().filter(|t| primary.contains(t)).count() as f64;
            let s = tags.iter().filter(|t| secondary.contains(t)).count() as f64;
            p * weights.primary_match + s * weights.secondary_match
        }
    };

    if category_in(&resource.category, &ctx.implied_categories) {
        relevance += if ctx.assistant {
            weights.assistant_category_bonus
        } else {
            weights.category_bonus
        };
    }

    if !ctx.query_tokens.is_empty() {
        let haystack = format!(
            "{} {} {}",
            resource.title, resource.description, resource.category
        )
        .to_lowercase();
        let hits = ctx
            .query_tokens
            .iter()
            .filter(|t| haystack.contains(t.as_str()))
            .count();
        relevance += hits as f64 * weights.query_token;
    }

    if relevance <= 0.0 {
        return 0.0;
    }

    relevance
        + skill_credit(&resource.difficulty, ctx.skill) * weights.skill
        + priority_credit(resource.default_priority) * weights.default_priority
}

/// Scores the catalog, drops zero scores, and sorts descending.
/// The sort is stable, so equal scores keep catalog order.
pub fn rank(resources: &[Resource], ctx: &ScoreContext, weights: &ScoreWeights) -> Vec<ScoredResource> {
    let mut scored: Vec<ScoredResource> = resources
        .iter()
        .filter_map(|r| {
            let score = score(r, ctx, weights);
            (score > 0.0).then(|| ScoredResource {
                resource: r.clone(),
                score,
                priority: r.default_priority,
            })
        })
        .collect();
    sort_by_score(&mut scored);
    scored
}

pub(crate) fn sort_by_score(scored: &mut [ScoredResource]) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassificationSource;
    use crate::domain::{CanonicalCategory, Section};

    fn resource(id: &str, category: &str, tags: &str, difficulty: &str, priority: Priority) -> Resource {
        Resource {
            id: id.into(),
            title: format!("{id} title"),
            description: String::new(),
            resource_type: "guide".into(),
            url: format!("https://example.com/{id}"),
            category: category.into(),
            creator_name: "creator".into(),
            creator_url: None,
            section: Section::Website,
            difficulty: difficulty.into(),
            default_priority: priority,
            focus_areas: Some(tags.into()),
        }
    }

    #[test]
    fn branding_scenario_scores_match_reference() {
        let a = resource("a", "Branding", r#"["Branding"]"#, "beginner", Priority::Required);
        let b = resource(
            "b",
            "Automation and Systems",
            r#"["Automation / Bots"]"#,
            "advanced",
            Priority::Optional,
        );
        let ctx = ScoreContext::for_focus_areas(&[FocusArea::Branding], Some(SkillLevel::Beginner));
        let w = ScoreWeights::default();

        // 10 focus + 3 category + 3 skill + 2 priority
        assert_eq!(score(&a, &ctx, &w), 18.0);
        assert_eq!(score(&b, &ctx, &w), 0.0);

        let ranked = rank(&[b, a.clone()], &ctx, &w);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].resource, a);
    }

    #[test]
    fn skill_distance_credit() {
        assert_eq!(skill_credit("beginner", Some(SkillLevel::Beginner)), 1.0);
        assert_eq!(skill_credit("Intermediate", Some(SkillLevel::Beginner)), 0.5);
        assert_eq!(skill_credit("advanced", Some(SkillLevel::Beginner)), 0.2);
        assert_eq!(skill_credit("all levels", Some(SkillLevel::Beginner)), 0.5);
        assert_eq!(skill_credit("advanced", None), 0.5);
    }

    #[test]
    fn category_bonus_alone_is_relevant() {
        // Stored tags point elsewhere, but the raw category is implied by the target.
        let r = resource("c", "Logo Design", r#"["Server Setup"]"#, "intermediate", Priority::Optional);
        let ctx = ScoreContext::for_focus_areas(&[FocusArea::Branding], Some(SkillLevel::Intermediate));
        assert_eq!(score(&r, &ctx, &ScoreWeights::default()), 3.0 + 3.0);
    }

    #[test]
    fn rank_is_stable_for_equal_scores() {
        let first = resource("first", "Bots", r#"["Automation / Bots"]"#, "beginner", Priority::Optional);
        let second = resource("second", "Bots", r#"["Automation / Bots"]"#, "beginner", Priority::Optional);
        let ctx = ScoreContext::for_focus_areas(&[FocusArea::AutomationBots], Some(SkillLevel::Beginner));
        let ranked = rank(&[first, second], &ctx, &ScoreWeights::default());
        let ids: Vec<_> = ranked.iter().map(|s| s.resource.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn assistant_weights_primary_over_secondary_and_counts_tokens() {
        let classification = AssistantClassification {
            primary: vec![CanonicalCategory::AutomationAndSystems],
            secondary: vec![CanonicalCategory::ModerationAndStaff],
            skill: SkillLevel::Intermediate,
            source: ClassificationSource::Keyword,
        };
        let ctx = ScoreContext::for_assistant(&classification, "ticket bot setup");
        let w = ScoreWeights::default();

        let mut bots = resource("bots", "Bots", r#"["Automation / Bots"]"#, "intermediate", Priority::Optional);
        bots.title = "Ticket Bot Guide".into();
        let staff = resource("staff", "Moderation", r#"["Staff & Management"]"#, "intermediate", Priority::Optional);

        // 12 primary + 4 category + 2 tokens ("ticket", "bot") + 3 skill
        assert_eq!(score(&bots, &ctx, &w), 21.0);
        // 6 secondary + 4 category + 3 skill
        assert_eq!(score(&staff, &ctx, &w), 13.0);
    }

    #[test]
    fn short_tokens_are_ignored() {
        assert_eq!(query_tokens("a to Bot setup"), vec!["bot", "setup"]);
    }
}
