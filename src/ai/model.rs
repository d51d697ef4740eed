use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    SpendingPattern,
    BudgetAlert,
    SavingOpportunity,
    #[default]
    TrendAnalysis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        })
    }
}

/// Insight content before the AI state assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightDraft {
    #[serde(rename = "type", default)]
    pub kind: InsightKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Clamped into 0..=100 when the insight is recorded.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub confidence: u8,
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub impact: Impact,
}

impl InsightDraft {
    pub fn into_insight(self, id: Uuid, timestamp: DateTime<Utc>) -> AiInsight {
        AiInsight {
            id,
            kind: self.kind,
            title: self.title,
            description: self.description,
            confidence: self.confidence.clamp(0.0, 100.0).round() as u8,
            actionable: self.actionable,
            action_text: self.action_text,
            action_url: self.action_url,
            timestamp,
            category: self.category,
            impact: self.impact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    BlogPost,
    Summary,
    Analysis,
    Recommendation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Generated content before the AI state assigns an id and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDraft {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ContentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: ContentStatus,
}

impl ContentDraft {
    pub fn into_content(self, id: Uuid, created_at: DateTime<Utc>) -> GeneratedContent {
        GeneratedContent {
            id,
            kind: self.kind,
            title: self.title,
            content: self.content,
            tags: self.tags,
            created_at,
            status: self.status,
        }
    }
}
