//! Turns free-form backend responses into structured drafts.

use serde_json::Value;
use tracing::debug;

use super::model::{Impact, InsightDraft, InsightKind};

const FALLBACK_TITLE: &str = "AI Analysis Available";
const FALLBACK_CONFIDENCE: f64 = 75.0;
const DEFAULT_BLOG_TITLE: &str = "Generated Blog Post";
const COMMON_TAGS: [&str; 4] = ["finance", "budgeting", "personal-finance", "money-management"];
const MAX_TAGS: usize = 5;

/// Removes a surrounding Markdown code fence, if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses an insight response.
///
/// A JSON array yields one draft per well-formed element. Text that is not
/// JSON becomes a single trend-analysis insight carrying the raw text. Any
/// other JSON value yields nothing.
pub fn parse_insights(content: &str) -> Vec<InsightDraft> {
    let body = strip_code_fence(content);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<InsightDraft>(entry) {
                Ok(draft) => Some(draft),
                Err(err) => {
                    debug!(error = %err, "skipping malformed insight");
                    None
                }
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(_) => vec![InsightDraft {
            kind: InsightKind::TrendAnalysis,
            title: FALLBACK_TITLE.into(),
            description: content.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            actionable: false,
            action_text: None,
            action_url: None,
            category: None,
            impact: Impact::Medium,
        }],
    }
}

/// First Markdown heading with its leading `#`s stripped.
pub fn extract_title(content: &str) -> String {
    content
        .lines()
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .unwrap_or_else(|| DEFAULT_BLOG_TITLE.into())
}

pub fn extract_tags(topic: &str) -> Vec<String> {
    COMMON_TAGS
        .iter()
        .map(|tag| tag.to_string())
        .chain(
            topic
                .to_lowercase()
                .split(' ')
                .filter(|word| word.chars().count() > 3)
                .map(str::to_string),
        )
        .take(MAX_TAGS)
        .collect()
}
