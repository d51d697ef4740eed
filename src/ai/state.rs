use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{AiInsight, ContentDraft, GeneratedContent, InsightDraft};
use super::DEFAULT_MODEL;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl fmt::Display for InsightFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InsightFrequency::Daily => "daily",
            InsightFrequency::Weekly => "weekly",
            InsightFrequency::Monthly => "monthly",
        })
    }
}

impl FromStr for InsightFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(InsightFrequency::Daily),
            "weekly" => Ok(InsightFrequency::Weekly),
            "monthly" => Ok(InsightFrequency::Monthly),
            other => Err(format!("unknown insight frequency `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    #[serde(default = "enabled")]
    pub auto_analysis: bool,
    #[serde(default)]
    pub insight_frequency: InsightFrequency,
    #[serde(default = "enabled")]
    pub content_generation: bool,
    #[serde(default = "enabled")]
    pub personalized_recommendations: bool,
}

fn enabled() -> bool {
    true
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            auto_analysis: true,
            insight_frequency: InsightFrequency::default(),
            content_generation: true,
            personalized_recommendations: true,
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiSettingsPatch {
    pub auto_analysis: Option<bool>,
    pub insight_frequency: Option<InsightFrequency>,
    pub content_generation: Option<bool>,
    pub personalized_recommendations: Option<bool>,
}

impl AiSettings {
    pub fn apply(&mut self, patch: AiSettingsPatch) {
        if let Some(value) = patch.auto_analysis {
            self.auto_analysis = value;
        }
        if let Some(value) = patch.insight_frequency {
            self.insight_frequency = value;
        }
        if let Some(value) = patch.content_generation {
            self.content_generation = value;
        }
        if let Some(value) = patch.personalized_recommendations {
            self.personalized_recommendations = value;
        }
    }
}

/// Insights and generated content produced by the AI collaborator.
///
/// Both collections are kept newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiState {
    pub insights: Vec<AiInsight>,
    pub generated_content: Vec<GeneratedContent>,
    pub is_analyzing: bool,
    pub last_analysis: Option<DateTime<Utc>>,
    pub enabled: bool,
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    pub settings: AiSettings,
    pub error: Option<String>,
}

impl Default for AiState {
    fn default() -> Self {
        Self {
            insights: Vec::new(),
            generated_content: Vec::new(),
            is_analyzing: false,
            last_analysis: None,
            enabled: false,
            api_key: None,
            model: DEFAULT_MODEL.into(),
            settings: AiSettings::default(),
            error: None,
        }
    }
}

impl AiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from user configuration, reading the key from the
    /// configured environment variable.
    pub fn from_config(config: &crate::config::AiConfig) -> Self {
        Self {
            enabled: config.enabled,
            api_key: config.api_key(),
            model: config.model.clone(),
            settings: config.settings.clone(),
            ..Self::default()
        }
    }

    /// True when AI is enabled and a non-blank key is present.
    pub fn is_ready(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn add_insight(&mut self, draft: InsightDraft) -> Uuid {
        let id = Uuid::new_v4();
        self.insights.insert(0, draft.into_insight(id, Utc::now()));
        id
    }

    pub fn remove_insight(&mut self, id: Uuid) -> bool {
        let before = self.insights.len();
        self.insights.retain(|insight| insight.id != id);
        self.insights.len() != before
    }

    pub fn clear_insights(&mut self) {
        self.insights.clear();
    }

    pub fn add_content(&mut self, draft: ContentDraft) -> Uuid {
        let id = Uuid::new_v4();
        self.generated_content
            .insert(0, draft.into_content(id, Utc::now()));
        id
    }

    /// Replaces the content with the same id. Unknown ids are ignored.
    pub fn update_content(&mut self, content: GeneratedContent) -> bool {
        match self
            .generated_content
            .iter_mut()
            .find(|existing| existing.id == content.id)
        {
            Some(slot) => {
                *slot = content;
                true
            }
            None => false,
        }
    }

    pub fn delete_content(&mut self, id: Uuid) -> bool {
        let before = self.generated_content.len();
        self.generated_content.retain(|content| content.id != id);
        self.generated_content.len() != before
    }

    pub fn update_settings(&mut self, patch: AiSettingsPatch) {
        self.settings.apply(patch);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::model::{ContentKind, ContentStatus, InsightKind};

    fn draft(title: &str) -> InsightDraft {
        InsightDraft {
            kind: InsightKind::BudgetAlert,
            title: title.into(),
            description: String::new(),
            confidence: 140.0,
            actionable: false,
            action_text: None,
            action_url: None,
            category: None,
            impact: Default::default(),
        }
    }

    #[test]
    fn insights_are_newest_first() {
        let mut state = AiState::new();
        state.add_insight(draft("first"));
        let second = state.add_insight(draft("second"));
        assert_eq!(state.insights[0].title, "second");
        assert_eq!(state.insights[0].confidence, 100);

        assert!(state.remove_insight(second));
        assert!(!state.remove_insight(second));
        assert_eq!(state.insights.len(), 1);
        state.clear_insights();
        assert!(state.insights.is_empty());
    }

    #[test]
    fn content_update_and_delete_by_id() {
        let mut state = AiState::new();
        let id = state.add_content(ContentDraft {
            kind: ContentKind::BlogPost,
            title: "Draft".into(),
            content: "body".into(),
            tags: vec![],
            status: ContentStatus::Draft,
        });

        let mut published = state.generated_content[0].clone();
        published.status = ContentStatus::Published;
        assert!(state.update_content(published));
        assert_eq!(state.generated_content[0].status, ContentStatus::Published);

        let mut stranger = state.generated_content[0].clone();
        stranger.id = Uuid::new_v4();
        assert!(!state.update_content(stranger));

        assert!(state.delete_content(id));
        assert!(state.generated_content.is_empty());
    }

    #[test]
    fn settings_patch_merges() {
        let mut state = AiState::new();
        state.update_settings(AiSettingsPatch {
            insight_frequency: Some(InsightFrequency::Daily),
            ..Default::default()
        });
        assert_eq!(state.settings.insight_frequency, InsightFrequency::Daily);
        assert!(state.settings.auto_analysis);
    }

    #[test]
    fn readiness_requires_enabled_and_key() {
        let mut state = AiState::new();
        assert!(!state.is_ready());
        state.enabled = true;
        state.api_key = Some("  ".into());
        assert!(!state.is_ready());
        state.api_key = Some("sk-test".into());
        assert!(state.is_ready());

        state.reset();
        assert_eq!(state, AiState::default());
    }
}
