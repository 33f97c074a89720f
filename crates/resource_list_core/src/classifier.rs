//! crates/resource_list_core/src/classifier.rs
//!
//! The intent classifier: turns a free-text goal description into canonical
//! focus areas (list engine) or canonical categories plus a skill estimate
//! (assistant endpoint).
//!
//! The AI path goes through a [`ClassificationProvider`] with a hard timeout and
//! a quota cooldown. Whatever it returns is validated by the pure functions in
//! this module. Any failure falls back to deterministic keyword rules, which
//! always produce a non-empty answer.

use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::CanonicalCategory as C;
use crate::domain::FocusArea as F;
use crate::domain::{CanonicalCategory, FocusArea, SkillLevel};
use crate::error::{EngineError, EngineResult};
use crate::focus::sanitize_focus_areas;
use crate::ports::{ClassificationProvider, Clock, PortError};

pub const MAX_FOCUS_AREAS: usize = 5;
const MAX_PRIMARY_CATEGORIES: usize = 3;
const MAX_SECONDARY_CATEGORIES: usize = 4;

/// Returned by the keyword fallback when nothing in the text matches.
pub const DEFAULT_FOCUS_AREAS: [FocusArea; 2] = [FocusArea::GraphicDesign, FocusArea::ServerSetup];
pub const DEFAULT_PRIMARY_CATEGORY: CanonicalCategory = CanonicalCategory::CommunitySetup;
pub const DEFAULT_SECONDARY_CATEGORY: CanonicalCategory = CanonicalCategory::DesignAndVisuals;

//=========================================================================================
// Results
//=========================================================================================

/// Outcome of validating a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Valid(T),
    Invalid(String),
}

impl<T> Parsed<T> {
    pub fn into_result(self) -> EngineResult<T> {
        match self {
            Parsed::Valid(value) => Ok(value),
            Parsed::Invalid(reason) => Err(EngineError::ClassificationUnavailable(reason)),
        }
    }
}

/// Which path produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Override,
    Ai,
    Keyword,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusClassification {
    pub focus_areas: Vec<FocusArea>,
    pub source: ClassificationSource,
}

/// The validated content of an assistant reply, before the skill default is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySplit {
    pub primary: Vec<CanonicalCategory>,
    pub secondary: Vec<CanonicalCategory>,
    pub skill: Option<SkillLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantClassification {
    pub primary: Vec<CanonicalCategory>,
    pub secondary: Vec<CanonicalCategory>,
    pub skill: SkillLevel,
    pub source: ClassificationSource,
}

//=========================================================================================
// Prompts
//=========================================================================================

const FOCUS_PROMPT: &str = r#"You classify descriptions of online community projects into focus areas.

Respond with ONLY a JSON object of this exact shape:
{"focusAreas": ["<label>", ...]}

Rules:
- Pick between 1 and 5 labels.
- Use ONLY these exact labels:
{labels}
- Never invent labels, never add commentary or markdown."#;

const ASSISTANT_PROMPT: &str = r#"You route questions from online community builders to the right learning resources.

Respond with ONLY a JSON object of this exact shape:
{"primaryCategories": ["<label>", ...], "secondaryCategories": ["<label>", ...], "priority": "beginner" | "intermediate" | "advanced"}

Rules:
- primaryCategories: the 1 to 3 categories the question is mainly about.
- secondaryCategories: up to 4 related categories that would also help.
- priority: the asker's apparent skill level.
- Use ONLY these exact category labels:
{labels}
- Never invent labels, never add commentary or markdown."#;

fn bullet_list<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.map(|l| format!("  - {l}")).collect::<Vec<_>>().join("\n")
}

pub fn focus_system_prompt() -> String {
    FOCUS_PROMPT.replace("{labels}", &bullet_list(FocusArea::ALL.iter().map(|a| a.as_str())))
}

pub fn assistant_system_prompt() -> String {
    ASSISTANT_PROMPT.replace(
        "{labels}",
        &bullet_list(CanonicalCategory::ALL.iter().map(|c| c.as_str())),
    )
}

//=========================================================================================
// Reply validation (pure)
//=========================================================================================

/// Models occasionally wrap JSON in a markdown fence even when told not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_object(raw: &str) -> Result<Value, String> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err("empty reply".to_string());
    }
    let value: Value = serde_json::from_str(body).map_err(|e| format!("malformed JSON: {e}"))?;
    if !value.is_object() {
        return Err("reply is not a JSON object".to_string());
    }
    Ok(value)
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn sanitize_categories(values: &[String]) -> Vec<CanonicalCategory> {
    let mut out = Vec::new();
    for value in values {
        if let Some(category) = CanonicalCategory::parse(value) {
            if !out.contains(&category) {
                out.push(category);
            }
        }
    }
    out
}

/// Validates a `{"focusAreas": [...]}` reply.
pub fn validate_focus_reply(raw: &str) -> Parsed<Vec<FocusArea>> {
    let value = match parse_object(raw) {
        Ok(value) => value,
        Err(reason) => return Parsed::Invalid(reason),
    };
    let mut areas = sanitize_focus_areas(&string_list(&value, "focusAreas"));
    if areas.is_empty() {
        return Parsed::Invalid("no valid focus areas in reply".to_string());
    }
    areas.truncate(MAX_FOCUS_AREAS);
    Parsed::Valid(areas)
}

/// Validates an assistant reply with primary/secondary categories and a skill estimate.
pub fn validate_assistant_reply(raw: &str) -> Parsed<CategorySplit> {
    let value = match parse_object(raw) {
        Ok(value) => value,
        Err(reason) => return Parsed::Invalid(reason),
    };

    let mut primary = sanitize_categories(&string_list(&value, "primaryCategories"));
    let mut secondary = sanitize_categories(&string_list(&value, "secondaryCategories"));
    if primary.is_empty() && secondary.is_empty() {
        return Parsed::Invalid("no valid categories in reply".to_string());
    }
    primary.truncate(MAX_PRIMARY_CATEGORIES);
    secondary.retain(|c| !primary.contains(c));
    secondary.truncate(MAX_SECONDARY_CATEGORIES);

    let skill = value
        .get("priority")
        .and_then(Value::as_str)
        .and_then(SkillLevel::parse);

    Parsed::Valid(CategorySplit {
        primary,
        secondary,
        skill,
    })
}

//=========================================================================================
// Keyword fallback (pure, infallible)
//=========================================================================================

/// Keywords match any word that starts with them, so "automat" covers
/// "automate", "automation" and "automated". Stems shorter than
/// `MIN_PREFIX_STEM` match only the whole word or its plural.
const FOCUS_KEYWORDS: &[(&str, FocusArea)] = &[
    ("design", F::GraphicDesign),
    ("graphic", F::GraphicDesign),
    ("logo", F::GraphicDesign),
    ("banner", F::GraphicDesign),
    ("thumbnail", F::GraphicDesign),
    ("icon", F::GraphicDesign),
    ("emoji", F::GraphicDesign),
    ("font", F::GraphicDesign),
    ("color", F::GraphicDesign),
    ("colour", F::GraphicDesign),
    ("brand", F::Branding),
    ("identity", F::Branding),
    ("mascot", F::Branding),
    ("aesthetic", F::Branding),
    ("theme", F::Branding),
    ("server", F::ServerSetup),
    ("channel", F::ServerSetup),
    ("role", F::ServerSetup),
    ("permission", F::ServerSetup),
    ("discord", F::ServerSetup),
    ("setup", F::ServerSetup),
    ("onboarding", F::ServerSetup),
    ("bot", F::AutomationBots),
    ("automat", F::AutomationBots),
    ("webhook", F::AutomationBots),
    ("ticket", F::AutomationBots),
    ("command", F::AutomationBots),
    ("integration", F::AutomationBots),
    ("staff", F::StaffManagement),
    ("moderat", F::StaffManagement),
    ("mod", F::StaffManagement),
    ("team", F::StaffManagement),
    ("hiring", F::StaffManagement),
    ("recruit", F::StaffManagement),
    ("manage", F::StaffManagement),
    ("market", F::MarketingGrowth),
    ("grow", F::MarketingGrowth),
    ("promot", F::MarketingGrowth),
    ("advertis", F::MarketingGrowth),
    ("social", F::MarketingGrowth),
    ("partner", F::MarketingGrowth),
    ("audience", F::MarketingGrowth),
    ("engagement", F::MarketingGrowth),
    ("document", F::DocumentationSops),
    ("sop", F::DocumentationSops),
    ("guideline", F::DocumentationSops),
    ("rule", F::DocumentationSops),
    ("policy", F::DocumentationSops),
    ("policies", F::DocumentationSops),
    ("process", F::DocumentationSops),
    ("handbook", F::DocumentationSops),
];

const CATEGORY_KEYWORDS: &[(&str, CanonicalCategory)] = &[
    ("design", C::DesignAndVisuals),
    ("graphic", C::DesignAndVisuals),
    ("visual", C::DesignAndVisuals),
    ("logo", C::DesignAndVisuals),
    ("banner", C::DesignAndVisuals),
    ("font", C::DesignAndVisuals),
    ("color", C::DesignAndVisuals),
    ("colour", C::DesignAndVisuals),
    ("icon", C::DesignAndVisuals),
    ("brand", C::BrandingAndIdentity),
    ("identity", C::BrandingAndIdentity),
    ("mascot", C::BrandingAndIdentity),
    ("name", C::BrandingAndIdentity),
    ("server", C::CommunitySetup),
    ("community", C::CommunitySetup),
    ("channel", C::CommunitySetup),
    ("role", C::CommunitySetup),
    ("permission", C::CommunitySetup),
    ("discord", C::CommunitySetup),
    ("bot", C::AutomationAndSystems),
    ("automat", C::AutomationAndSystems),
    ("webhook", C::AutomationAndSystems),
    ("ticket", C::AutomationAndSystems),
    ("system", C::AutomationAndSystems),
    ("staff", C::ModerationAndStaff),
    ("moderat", C::ModerationAndStaff),
    ("mod", C::ModerationAndStaff),
    ("team", C::ModerationAndStaff),
    ("recruit", C::ModerationAndStaff),
    ("market", C::GrowthAndMarketing),
    ("grow", C::GrowthAndMarketing),
    ("promot", C::GrowthAndMarketing),
    ("advertis", C::GrowthAndMarketing),
    ("member", C::GrowthAndMarketing),
    ("social", C::GrowthAndMarketing),
    ("document", C::DocumentationAndProcess),
    ("sop", C::DocumentationAndProcess),
    ("rule", C::DocumentationAndProcess),
    ("guideline", C::DocumentationAndProcess),
    ("process", C::DocumentationAndProcess),
    ("policy", C::DocumentationAndProcess),
];

/// "mod" must not match "modern", nor "sop" "sophisticated".
const MIN_PREFIX_STEM: usize = 4;

fn keyword_matches(word: &str, keyword: &str) -> bool {
    if keyword.len() >= MIN_PREFIX_STEM {
        return word.starts_with(keyword);
    }
    word.strip_prefix(keyword)
        .is_some_and(|rest| rest.is_empty() || rest == "s")
}

/// Skill words must match whole words.
const BEGINNER_WORDS: &[&str] = &[
    "beginner", "new", "first", "basic", "basics", "simple", "start", "starting", "learn",
    "learning", "newbie", "easy", "help",
];
const ADVANCED_WORDS: &[&str] = &[
    "advanced", "expert", "pro", "professional", "complex", "scale", "scaling", "custom",
    "api", "enterprise", "optimize", "optimise",
];

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Counts keyword hits per label and returns the labels that were hit, most hits
/// first. Ties keep the order of `labels`.
fn rank_hits<T: Copy + PartialEq>(words: &[String], table: &[(&str, T)], labels: &[T]) -> Vec<(T, usize)> {
    let mut counts: Vec<(T, usize)> = labels.iter().map(|l| (*l, 0)).collect();
    for (keyword, label) in table {
        if words.iter().any(|w| keyword_matches(w, keyword)) {
            if let Some(entry) = counts.iter_mut().find(|(l, _)| l == label) {
                entry.1 += 1;
            }
        }
    }
    counts.retain(|(_, n)| *n > 0);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Keyword classification into focus areas. Never empty.
pub fn fallback_focus_areas(text: &str) -> Vec<FocusArea> {
    let hits = rank_hits(&words(text), FOCUS_KEYWORDS, &FocusArea::ALL);
    if hits.is_empty() {
        return DEFAULT_FOCUS_AREAS.to_vec();
    }
    hits.into_iter()
        .take(MAX_FOCUS_AREAS)
        .map(|(area, _)| area)
        .collect()
}

/// Keyword classification into primary and secondary assistant categories.
/// The primary set is never empty.
pub fn fallback_categories(text: &str) -> (Vec<CanonicalCategory>, Vec<CanonicalCategory>) {
    let hits = rank_hits(&words(text), CATEGORY_KEYWORDS, &CanonicalCategory::ALL);
    let Some(&(_, best)) = hits.first() else {
        return (vec![DEFAULT_PRIMARY_CATEGORY], vec![DEFAULT_SECONDARY_CATEGORY]);
    };

    let (primary, secondary): (Vec<_>, Vec<_>) = hits.into_iter().partition(|(_, n)| *n == best);
    (
        primary
            .into_iter()
            .take(MAX_PRIMARY_CATEGORIES)
            .map(|(c, _)| c)
            .collect(),
        secondary
            .into_iter()
            .take(MAX_SECONDARY_CATEGORIES)
            .map(|(c, _)| c)
            .collect(),
    )
}

/// Estimates skill from keyword presence. Ambiguous text is intermediate.
pub fn classify_skill(text: &str) -> SkillLevel {
    let words = words(text);
    let beginner = words.iter().filter(|w| BEGINNER_WORDS.contains(&w.as_str())).count();
    let advanced = words.iter().filter(|w| ADVANCED_WORDS.contains(&w.as_str())).count();
    match beginner.cmp(&advanced) {
        std::cmp::Ordering::Greater => SkillLevel::Beginner,
        std::cmp::Ordering::Less => SkillLevel::Advanced,
        std::cmp::Ordering::Equal => SkillLevel::Intermediate,
    }
}

//=========================================================================================
// Quota cooldown
//=========================================================================================

const NO_COOLDOWN: i64 = i64::MIN;

/// Marks the provider unavailable until a deadline. Shared by every request
/// that goes through one classifier; reads and writes are unsynchronized
/// beyond the atomic itself, so a request racing the expiry may take the
/// fallback path once more than strictly needed.
#[derive(Debug)]
pub struct CooldownGate {
    until_millis: AtomicI64,
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self {
            until_millis: AtomicI64::new(NO_COOLDOWN),
        }
    }
}

impl CooldownGate {
    pub fn is_active(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now.timestamp_millis() < self.until_millis.load(Ordering::Relaxed)
    }

    pub fn trip(&self, until: chrono::DateTime<chrono::Utc>) {
        self.until_millis.store(until.timestamp_millis(), Ordering::Relaxed);
    }
}

//=========================================================================================
// The classifier service
//=========================================================================================

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Upper bound on a single provider call.
    pub timeout: Duration,
    /// How long to skip the provider after it reports an exhausted quota.
    pub cooldown: chrono::Duration,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(7),
            cooldown: chrono::Duration::minutes(30),
        }
    }
}

pub struct IntentClassifier {
    provider: Option<Arc<dyn ClassificationProvider>>,
    clock: Arc<dyn Clock>,
    cooldown: CooldownGate,
    settings: ClassifierSettings,
}

impl IntentClassifier {
    pub fn new(
        provider: Option<Arc<dyn ClassificationProvider>>,
        clock: Arc<dyn Clock>,
        settings: ClassifierSettings,
    ) -> Self {
        Self {
            provider,
            clock,
            cooldown: CooldownGate::default(),
            settings,
        }
    }

    /// A classifier that never calls out and always uses keyword rules.
    pub fn keyword_only(clock: Arc<dyn Clock>) -> Self {
        Self::new(None, clock, ClassifierSettings::default())
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown.is_active(self.clock.now())
    }

    /// Resolves the target focus areas for a list generation request.
    ///
    /// A non-empty override with at least one valid label short-circuits
    /// classification. Otherwise the description is classified by the AI
    /// provider, falling back to keyword rules.
    pub async fn classify_focus_areas<S: AsRef<str>>(
        &self,
        description: Option<&str>,
        overrides: &[S],
    ) -> FocusClassification {
        let valid = sanitize_focus_areas(overrides);
        if !valid.is_empty() {
            return FocusClassification {
                focus_areas: valid,
                source: ClassificationSource::Override,
            };
        }
        if !overrides.is_empty() {
            debug!("Focus-area override held no valid labels; classifying the description instead");
        }

        let text = description.map(str::trim).unwrap_or_default();
        if !text.is_empty() {
            let attempt = match self.request(&focus_system_prompt(), text).await {
                Ok(raw) => validate_focus_reply(&raw).into_result(),
                Err(e) => Err(e),
            };
            match attempt {
                Ok(focus_areas) => {
                    return FocusClassification {
                        focus_areas,
                        source: ClassificationSource::Ai,
                    }
                }
                Err(e) => warn!(error = %e, "Falling back to keyword focus-area rules"),
            }
        }

        FocusClassification {
            focus_areas: fallback_focus_areas(text),
            source: ClassificationSource::Keyword,
        }
    }

    /// Classifies a free-text assistant query into canonical categories and a skill level.
    pub async fn classify_assistant(&self, query: &str) -> AssistantClassification {
        let text = query.trim();
        if !text.is_empty() {
            let attempt = match self.request(&assistant_system_prompt(), text).await {
                Ok(raw) => validate_assistant_reply(&raw).into_result(),
                Err(e) => Err(e),
            };
            match attempt {
                Ok(split) => {
                    return AssistantClassification {
                        primary: split.primary,
                        secondary: split.secondary,
                        skill: split.skill.unwrap_or_else(|| classify_skill(text)),
                        source: ClassificationSource::Ai,
                    }
                }
                Err(e) => warn!(error = %e, "Falling back to keyword category rules"),
            }
        }

        let (primary, secondary) = fallback_categories(text);
        AssistantClassification {
            primary,
            secondary,
            skill: classify_skill(text),
            source: ClassificationSource::Keyword,
        }
    }

    /// One provider round-trip, guarded by the cooldown and the timeout.
    async fn request(&self, system_prompt: &str, user_prompt: &str) -> EngineResult<String> {
        let Some(provider) = &self.provider else {
            return Err(EngineError::ClassificationUnavailable(
                "no provider configured".to_string(),
            ));
        };
        if self.is_cooling_down() {
            return Err(EngineError::ClassificationUnavailable(
                "provider quota cooldown in effect".to_string(),
            ));
        }

        let call = provider.complete_json(system_prompt, user_prompt);
        match tokio::time::timeout(self.settings.timeout, call).await {
            Err(_) => Err(EngineError::ClassificationUnavailable(format!(
                "provider did not answer within {:?}",
                self.settings.timeout
            ))),
            Ok(Err(PortError::QuotaExceeded(detail))) => {
                let until = self.clock.now() + self.settings.cooldown;
                self.cooldown.trip(until);
                warn!(%until, "Classifier quota exhausted; skipping AI calls until cooldown ends");
                Err(EngineError::ClassificationUnavailable(format!(
                    "quota exceeded: {detail}"
                )))
            }
            Ok(Err(e)) => Err(EngineError::ClassificationUnavailable(e.to_string())),
            Ok(Ok(raw)) if raw.trim().is_empty() => Err(EngineError::ClassificationUnavailable(
                "empty reply".to_string(),
            )),
            Ok(Ok(raw)) => Ok(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ManualClock, PortResult};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    enum Reply {
        Json(&'static str),
        Quota,
        Fail,
        Hang,
    }

    struct StubProvider {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClassificationProvider for StubProvider {
        async fn complete_json(&self, _system: &str, _user: &str) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Json(body) => Ok(body.to_string()),
                Reply::Quota => Err(PortError::QuotaExceeded("insufficient_quota".into())),
                Reply::Fail => Err(PortError::Unexpected("500".into())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(r#"{"focusAreas":["Branding"]}"#.to_string())
                }
            }
        }
    }

    fn classifier(provider: Arc<StubProvider>, clock: Arc<ManualClock>) -> IntentClassifier {
        IntentClassifier::new(
            Some(provider),
            clock,
            ClassifierSettings {
                timeout: Duration::from_millis(50),
                cooldown: chrono::Duration::minutes(30),
            },
        )
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(chrono::Utc::now()))
    }

    #[test]
    fn focus_reply_drops_unknown_labels() {
        let parsed = validate_focus_reply(r#"{"focusAreas":["Branding","Knitting","server setup"]}"#);
        assert_eq!(parsed, Parsed::Valid(vec![F::Branding, F::ServerSetup]));
    }

    #[test]
    fn focus_reply_with_only_unknown_labels_is_invalid() {
        assert!(matches!(
            validate_focus_reply(r#"{"focusAreas":["Knitting"]}"#),
            Parsed::Invalid(_)
        ));
        assert!(matches!(validate_focus_reply("sure! here you go"), Parsed::Invalid(_)));
        assert!(matches!(validate_focus_reply("[]"), Parsed::Invalid(_)));
        assert!(matches!(validate_focus_reply(""), Parsed::Invalid(_)));
    }

    #[test]
    fn focus_reply_is_capped_at_five() {
        let raw = r#"{"focusAreas":["Graphic Design","Branding","Server Setup","Automation / Bots","Staff & Management","Marketing & Growth"]}"#;
        let Parsed::Valid(areas) = validate_focus_reply(raw) else {
            panic!("expected a valid reply");
        };
        assert_eq!(areas.len(), MAX_FOCUS_AREAS);
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"focusAreas\":[\"Branding\"]}\n```";
        assert_eq!(validate_focus_reply(raw), Parsed::Valid(vec![F::Branding]));
    }

    #[test]
    fn assistant_reply_separates_primary_from_secondary() {
        let raw = r#"{"primaryCategories":["Automation and Systems"],"secondaryCategories":["Automation and Systems","Moderation and Staff","Nope"],"priority":"advanced"}"#;
        let Parsed::Valid(split) = validate_assistant_reply(raw) else {
            panic!("expected a valid reply");
        };
        assert_eq!(split.primary, vec![C::AutomationAndSystems]);
        assert_eq!(split.secondary, vec![C::ModerationAndStaff]);
        assert_eq!(split.skill, Some(SkillLevel::Advanced));
    }

    #[test]
    fn assistant_reply_with_no_valid_categories_is_invalid() {
        let raw = r#"{"primaryCategories":["Cooking"],"secondaryCategories":[],"priority":"beginner"}"#;
        assert!(matches!(validate_assistant_reply(raw), Parsed::Invalid(_)));
    }

    #[test]
    fn fallback_is_never_empty() {
        assert_eq!(fallback_focus_areas(""), DEFAULT_FOCUS_AREAS.to_vec());
        assert_eq!(fallback_focus_areas("qwzx plorb"), DEFAULT_FOCUS_AREAS.to_vec());
        let (primary, _) = fallback_categories("");
        assert_eq!(primary, vec![DEFAULT_PRIMARY_CATEGORY]);
    }

    #[test]
    fn fallback_ranks_by_hit_count() {
        let areas = fallback_focus_areas("I need a bot to automate tickets and a logo");
        assert_eq!(areas.first(), Some(&F::AutomationBots));
        assert!(areas.contains(&F::GraphicDesign));
    }

    #[test]
    fn fallback_matches_word_prefixes_only() {
        // "philosophy" contains "sop" but does not start with it.
        assert_eq!(fallback_focus_areas("philosophy"), DEFAULT_FOCUS_AREAS.to_vec());
        assert_eq!(fallback_focus_areas("writing SOPs"), vec![F::DocumentationSops]);
    }

    #[test]
    fn short_stems_match_whole_words_only() {
        assert_eq!(fallback_focus_areas("a sophisticated modern logo"), vec![F::GraphicDesign]);
        assert_eq!(fallback_focus_areas("both"), DEFAULT_FOCUS_AREAS.to_vec());
        assert_eq!(fallback_focus_areas("need more mods"), vec![F::StaffManagement]);
        assert_eq!(fallback_focus_areas("one sop"), vec![F::DocumentationSops]);

        let (primary, _) = fallback_categories("modern bottles");
        assert_eq!(primary, vec![DEFAULT_PRIMARY_CATEGORY]);
        let (primary, _) = fallback_categories("mod team");
        assert_eq!(primary, vec![C::ModerationAndStaff]);
    }

    #[test]
    fn skill_defaults_to_intermediate() {
        assert_eq!(classify_skill("I'm new and want a simple setup"), SkillLevel::Beginner);
        assert_eq!(classify_skill("custom api integration at scale"), SkillLevel::Advanced);
        assert_eq!(classify_skill("make a server"), SkillLevel::Intermediate);
    }

    #[tokio::test]
    async fn valid_override_skips_classification() {
        let provider = StubProvider::new(Reply::Json(r#"{"focusAreas":["Branding"]}"#));
        let c = classifier(provider.clone(), clock());
        let result = c
            .classify_focus_areas(Some("bots please"), &["Marketing & Growth", "bogus"])
            .await;
        assert_eq!(result.source, ClassificationSource::Override);
        assert_eq!(result.focus_areas, vec![F::MarketingGrowth]);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_override_falls_through_to_ai() {
        let provider = StubProvider::new(Reply::Json(r#"{"focusAreas":["Branding"]}"#));
        let c = classifier(provider.clone(), clock());
        let result = c.classify_focus_areas(Some("a new logo"), &["bogus"]).await;
        assert_eq!(result.source, ClassificationSource::Ai);
        assert_eq!(result.focus_areas, vec![F::Branding]);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn provider_failure_uses_keywords() {
        let provider = StubProvider::new(Reply::Fail);
        let c = classifier(provider, clock());
        let result = c.classify_focus_areas(Some("moderation team"), &[] as &[&str]).await;
        assert_eq!(result.source, ClassificationSource::Keyword);
        assert_eq!(result.focus_areas, vec![F::StaffManagement]);
    }

    #[tokio::test]
    async fn unusable_reply_uses_keywords() {
        let provider = StubProvider::new(Reply::Json(r#"{"focusAreas":["Knitting"]}"#));
        let c = classifier(provider, clock());
        let result = c.classify_focus_areas(Some("social media growth"), &[] as &[&str]).await;
        assert_eq!(result.source, ClassificationSource::Keyword);
        assert_eq!(result.focus_areas, vec![F::MarketingGrowth]);
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let provider = StubProvider::new(Reply::Hang);
        let c = classifier(provider, clock());
        let result = c.classify_focus_areas(Some("brand kit"), &[] as &[&str]).await;
        assert_eq!(result.source, ClassificationSource::Keyword);
        assert_eq!(result.focus_areas, vec![F::Branding]);
    }

    #[tokio::test]
    async fn quota_error_starts_cooldown_until_it_expires() {
        let provider = StubProvider::new(Reply::Quota);
        let clock = clock();
        let c = classifier(provider.clone(), clock.clone());

        c.classify_focus_areas(Some("bots"), &[] as &[&str]).await;
        assert_eq!(provider.calls(), 1);
        assert!(c.is_cooling_down());

        clock.advance(chrono::Duration::minutes(29));
        let during = c.classify_focus_areas(Some("bots"), &[] as &[&str]).await;
        assert_eq!(during.source, ClassificationSource::Keyword);
        assert_eq!(provider.calls(), 1);

        clock.advance(chrono::Duration::minutes(2));
        assert!(!c.is_cooling_down());
        c.classify_focus_areas(Some("bots"), &[] as &[&str]).await;
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn assistant_uses_keyword_skill_when_reply_omits_it() {
        let provider = StubProvider::new(Reply::Json(
            r#"{"primaryCategories":["Design and Visuals"],"secondaryCategories":[]}"#,
        ));
        let c = classifier(provider, clock());
        let result = c.classify_assistant("I'm a beginner making my first logo").await;
        assert_eq!(result.source, ClassificationSource::Ai);
        assert_eq!(result.primary, vec![C::DesignAndVisuals]);
        assert_eq!(result.skill, SkillLevel::Beginner);
    }

    #[tokio::test]
    async fn keyword_only_classifier_never_calls_out() {
        let c = IntentClassifier::keyword_only(clock());
        let result = c.classify_assistant("how do I set up ticket bots").await;
        assert_eq!(result.source, ClassificationSource::Keyword);
        assert_eq!(result.primary, vec![C::AutomationAndSystems]);
    }
}
