//! crates/resource_list_core/src/engine.rs
//!
//! The generation pipeline: classification, scoring and bucketing over a
//! catalog snapshot fetched once per call.

use std::sync::Arc;
use tracing::info;

use crate::bucketing::{Bucketer, SliceLayout, TierPolicy};
use crate::classifier::{AssistantClassification, FocusClassification, IntentClassifier};
use crate::domain::{Grouping, ProjectPlan, Resource, SkillLevel};
use crate::error::EngineResult;
use crate::ports::CatalogStore;
use crate::scoring::{rank, ScoreContext, ScoreWeights};

/// Input for a percentile-bucketed resource list.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub description: Option<String>,
    /// Explicit focus-area labels; used verbatim when at least one is valid.
    pub focus_areas: Vec<String>,
    pub skill_level: Option<String>,
}

impl From<&ProjectPlan> for GenerationRequest {
    fn from(plan: &ProjectPlan) -> Self {
        Self {
            description: plan.description.clone(),
            focus_areas: plan.focus_areas.iter().map(|a| a.as_str().to_string()).collect(),
            skill_level: Some(plan.skill_level.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedList {
    pub classification: FocusClassification,
    pub skill: Option<SkillLevel>,
    pub grouping: Grouping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantRecommendation {
    pub classification: AssistantClassification,
    pub grouping: Grouping,
}

/// Pure scoring + bucketing of a catalog snapshot.
pub fn group_catalog(
    resources: &[Resource],
    ctx: &ScoreContext,
    weights: &ScoreWeights,
    bucketer: &dyn Bucketer,
) -> Grouping {
    bucketer.bucket(rank(resources, ctx, weights))
}

pub struct ResourceListEngine {
    catalog: Arc<dyn CatalogStore>,
    classifier: Arc<IntentClassifier>,
    weights: ScoreWeights,
    tiers: TierPolicy,
    slices: SliceLayout,
}

impl ResourceListEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, classifier: Arc<IntentClassifier>) -> Self {
        Self {
            catalog,
            classifier,
            weights: ScoreWeights::default(),
            tiers: TierPolicy::default(),
            slices: SliceLayout::default(),
        }
    }

    pub fn with_tuning(mut self, weights: ScoreWeights, tiers: TierPolicy, slices: SliceLayout) -> Self {
        self.weights = weights;
        self.tiers = tiers;
        self.slices = slices;
        self
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Classifies the request and returns the percentile-bucketed grouping.
    /// An empty grouping means nothing in the catalog was relevant.
    pub async fn generate(&self, request: &GenerationRequest) -> EngineResult<GeneratedList> {
        let classification = self
            .classifier
            .classify_focus_areas(request.description.as_deref(), request.focus_areas.as_slice())
            .await;
        let skill = request.skill_level.as_deref().and_then(SkillLevel::parse);

        let resources = self.catalog.list_resources().await?;
        let ctx = ScoreContext::for_focus_areas(&classification.focus_areas, skill);
        let grouping = group_catalog(&resources, &ctx, &self.weights, &self.tiers);

        info!(
            source = ?classification.source,
            focus_areas = ?classification.focus_areas,
            catalog = resources.len(),
            matched = grouping.len(),
            "Generated resource list"
        );
        Ok(GeneratedList {
            classification,
            skill,
            grouping,
        })
    }

    pub async fn generate_for_plan(&self, plan: &ProjectPlan) -> EngineResult<GeneratedList> {
        self.generate(&GenerationRequest::from(plan)).await
    }

    /// Free-text assistant: category classification, token-aware scoring and
    /// fixed-slice grouping of the top results.
    pub async fn recommend(&self, query: &str) -> EngineResult<AssistantRecommendation> {
        let classification = self.classifier.classify_assistant(query).await;
        let resources = self.catalog.list_resources().await?;
        let ctx = ScoreContext::for_assistant(&classification, query);
        let grouping = group_catalog(&resources, &ctx, &self.weights, &self.slices);

        info!(
            source = ?classification.source,
            primary = ?classification.primary,
            skill = classification.skill.as_str(),
            matched = grouping.len(),
            limit = self.slices.total(),
            "Assistant recommendation"
        );
        Ok(AssistantRecommendation {
            classification,
            grouping,
        })
    }
}
