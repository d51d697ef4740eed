use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named expense bucket with an optional ceiling and a running spent total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategory {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    /// Maintained by the ledger from item mutations only.
    #[serde(default)]
    pub spent: f64,
}

impl BudgetCategory {
    /// Remaining headroom under the limit, negative when overspent.
    pub fn remaining(&self) -> Option<f64> {
        self.limit.map(|limit| limit - self.spent)
    }

    pub fn is_over_limit(&self) -> bool {
        self.remaining().is_some_and(|left| left < 0.0)
    }
}

/// Category content supplied by callers; the ledger assigns the id and the
/// spent total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>, color: impl Into<String>, limit: Option<f64>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            limit,
        }
    }

    pub(crate) fn into_category(self, id: Uuid) -> BudgetCategory {
        BudgetCategory {
            id,
            name: self.name,
            color: self.color,
            limit: self.limit,
            spent: 0.0,
        }
    }
}

const DEFAULT_CATEGORIES: [(&str, &str, f64); 6] = [
    ("Food & Dining", "#ef4444", 500.0),
    ("Transportation", "#3b82f6", 300.0),
    ("Entertainment", "#10b981", 200.0),
    ("Shopping", "#f59e0b", 400.0),
    ("Utilities", "#8b5cf6", 250.0),
    ("Healthcare", "#ec4899", 150.0),
];

/// Categories a fresh ledger starts with.
pub fn default_categories() -> Vec<CategoryDraft> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, color, limit)| CategoryDraft::new(*name, *color, Some(*limit)))
        .collect()
}
