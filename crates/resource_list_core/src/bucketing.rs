//! crates/resource_list_core/src/bucketing.rs
//!
//! Partitioning of scored resources into required / recommended / optional tiers.
//!
//! Two deliberately different strategies exist: percentile-derived tier sizes for
//! project-plan generation, and fixed slices of the top results for the assistant.

use crate::domain::{Grouping, Priority, ScoredResource};
use crate::scoring::sort_by_score;

pub trait Bucketer {
    /// Drops zero scores, sorts descending (stable) and splits into tiers.
    /// Each resource's `priority` is set to the tier it lands in.
    fn bucket(&self, scored: Vec<ScoredResource>) -> Grouping;
}

fn prepare(mut scored: Vec<ScoredResource>) -> Vec<ScoredResource> {
    scored.retain(|s| s.score > 0.0);
    sort_by_score(&mut scored);
    scored
}

fn assign(tier: Vec<ScoredResource>, priority: Priority) -> Vec<ScoredResource> {
    tier.into_iter()
        .map(|mut s| {
            s.priority = priority;
            s
        })
        .collect()
}

fn split(mut ranked: Vec<ScoredResource>, required: usize, recommended: usize, optional: usize) -> Grouping {
    ranked.truncate(required + recommended + optional);
    let mut recommended_part = ranked.split_off(required.min(ranked.len()));
    let optional_part = recommended_part.split_off(recommended.min(recommended_part.len()));
    Grouping {
        required: assign(ranked, Priority::Required),
        recommended: assign(recommended_part, Priority::Recommended),
        optional: assign(optional_part, Priority::Optional),
    }
}

//=========================================================================================
// Percentile strategy
//=========================================================================================

/// Tier sizes as clamped fractions of the positively-scored count.
#[derive(Debug, Clone, PartialEq)]
pub struct TierPolicy {
    pub required_fraction: f64,
    pub required_min: usize,
    pub required_max: usize,
    pub recommended_fraction: f64,
    pub recommended_min: usize,
    pub recommended_max: usize,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            required_fraction: 0.2,
            required_min: 2,
            required_max: 5,
            recommended_fraction: 0.4,
            recommended_min: 5,
            recommended_max: 10,
        }
    }
}

impl TierPolicy {
    /// `(required, recommended)` sizes for `count` positively-scored resources.
    /// Neither tier ever claims more resources than remain.
    pub fn tier_sizes(&self, count: usize) -> (usize, usize) {
        let fraction_of = |f: f64| (count as f64 * f).ceil() as usize;
        let required = fraction_of(self.required_fraction)
            .clamp(self.required_min, self.required_max)
            .min(count);
        let recommended = fraction_of(self.recommended_fraction)
            .clamp(self.recommended_min, self.recommended_max)
            .min(count - required);
        (required, recommended)
    }
}

impl Bucketer for TierPolicy {
    fn bucket(&self, scored: Vec<ScoredResource>) -> Grouping {
        let ranked = prepare(scored);
        let count = ranked.len();
        let (required, recommended) = self.tier_sizes(count);
        split(ranked, required, recommended, count)
    }
}

//=========================================================================================
// Fixed-slice strategy
//=========================================================================================

/// Fixed tier sizes taken from the top of the ranking. Anything past their sum is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceLayout {
    pub required: usize,
    pub recommended: usize,
    pub optional: usize,
}

impl Default for SliceLayout {
    fn default() -> Self {
        Self {
            required: 6,
            recommended: 8,
            optional: 10,
        }
    }
}

impl SliceLayout {
    pub fn total(&self) -> usize {
        self.required + self.recommended + self.optional
    }
}

impl Bucketer for SliceLayout {
    fn bucket(&self, scored: Vec<ScoredResource>) -> Grouping {
        split(prepare(scored), self.required, self.recommended, self.optional)
    }
}

/// Caller-selected strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketStrategy {
    Percentile(TierPolicy),
    FixedSlice(SliceLayout),
}

impl Bucketer for BucketStrategy {
    fn bucket(&self, scored: Vec<ScoredResource>) -> Grouping {
        match self {
            BucketStrategy::Percentile(policy) => policy.bucket(scored),
            BucketStrategy::FixedSlice(layout) => layout.bucket(scored),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Resource, Section};

    fn scored(id: usize, score: f64) -> ScoredResource {
        ScoredResource {
            resource: Resource {
                id: format!("r{id}"),
                title: format!("Resource {id}"),
                description: String::new(),
                resource_type: "tool".into(),
                url: format!("https://example.com/{id}"),
                category: "Bots".into(),
                creator_name: "creator".into(),
                creator_url: None,
                section: Section::Website,
                difficulty: "beginner".into(),
                default_priority: Priority::Optional,
                focus_areas: None,
            },
            score,
            priority: Priority::Optional,
        }
    }

    fn many(n: usize) -> Vec<ScoredResource> {
        (0..n).map(|i| scored(i, (n - i) as f64)).collect()
    }

    #[test]
    fn tier_sizes_follow_clamped_percentiles() {
        let policy = TierPolicy::default();
        assert_eq!(policy.tier_sizes(0), (0, 0));
        assert_eq!(policy.tier_sizes(1), (1, 0));
        assert_eq!(policy.tier_sizes(4), (2, 2));
        assert_eq!(policy.tier_sizes(10), (2, 5));
        assert_eq!(policy.tier_sizes(20), (4, 8));
        assert_eq!(policy.tier_sizes(100), (5, 10));
    }

    #[test]
    fn percentile_tiers_are_monotonic() {
        let mut input = many(30);
        input.reverse();
        let grouping = TierPolicy::default().bucket(input);
        assert_eq!(grouping.required.len(), 5);
        assert_eq!(grouping.recommended.len(), 10);
        assert_eq!(grouping.optional.len(), 15);

        let min_required = grouping.required.iter().map(|s| s.score).fold(f64::MAX, f64::min);
        let max_recommended = grouping.recommended.iter().map(|s| s.score).fold(0.0, f64::max);
        let min_recommended = grouping.recommended.iter().map(|s| s.score).fold(f64::MAX, f64::min);
        let max_optional = grouping.optional.iter().map(|s| s.score).fold(0.0, f64::max);
        assert!(min_required >= max_recommended);
        assert!(min_recommended >= max_optional);
        assert!(grouping.required.iter().all(|s| s.priority == Priority::Required));
        assert!(grouping.optional.iter().all(|s| s.priority == Priority::Optional));
    }

    #[test]
    fn zero_scores_never_land_in_a_tier() {
        let mut input = many(3);
        input.push(scored(99, 0.0));
        let grouping = TierPolicy::default().bucket(input);
        assert_eq!(grouping.len(), 3);
        assert!(grouping.iter().all(|s| s.resource.id != "r99"));
    }

    #[test]
    fn empty_input_gives_empty_grouping() {
        assert!(TierPolicy::default().bucket(Vec::new()).is_empty());
        assert!(SliceLayout::default().bucket(Vec::new()).is_empty());
    }

    #[test]
    fn fixed_slices_take_top_twenty_four() {
        let grouping = SliceLayout::default().bucket(many(40));
        assert_eq!(grouping.required.len(), 6);
        assert_eq!(grouping.recommended.len(), 8);
        assert_eq!(grouping.optional.len(), 10);
        assert_eq!(grouping.required[0].resource.id, "r0");
        assert_eq!(grouping.optional[9].resource.id, "r23");
    }

    #[test]
    fn fixed_slices_shrink_without_padding() {
        let grouping = SliceLayout::default().bucket(many(9));
        assert_eq!(grouping.required.len(), 6);
        assert_eq!(grouping.recommended.len(), 3);
        assert!(grouping.optional.is_empty());
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let input = vec![scored(1, 5.0), scored(2, 5.0), scored(3, 5.0)];
        let grouping = BucketStrategy::FixedSlice(SliceLayout::default()).bucket(input);
        let ids: Vec<_> = grouping.iter().map(|s| s.resource.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }
}
