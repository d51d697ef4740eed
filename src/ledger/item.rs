use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a recorded transaction. The stored amount is always a
/// magnitude; the kind carries the sign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Income,
    Expense,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Income => "income",
            ItemKind::Expense => "expense",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "in" => Ok(ItemKind::Income),
            "expense" | "out" => Ok(ItemKind::Expense),
            other => Err(format!("unknown item type `{other}`")),
        }
    }
}

/// A single recorded income or expense event.
///
/// Items are replaced wholesale on update; there is no partial mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    /// Name of the category this item is filed under. Joined by value, so it
    /// may reference a category that does not exist.
    pub category: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl BudgetItem {
    pub fn is_income(&self) -> bool {
        self.kind == ItemKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == ItemKind::Expense
    }

    /// Strips the id, producing a draft with the same content.
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            amount: self.amount,
            category: self.category.clone(),
            date: self.date,
            kind: self.kind,
            description: self.description.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Item content supplied by callers before the ledger assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ItemDraft {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        kind: ItemKind,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            category: category.into(),
            date,
            kind,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn income(name: impl Into<String>, amount: f64, date: DateTime<Utc>) -> Self {
        Self::new(name, amount, ItemKind::Income, "", date)
    }

    pub fn expense(
        name: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self::new(name, amount, ItemKind::Expense, category, date)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn into_item(self, id: Uuid) -> BudgetItem {
        BudgetItem {
            id,
            name: self.name,
            amount: self.amount,
            category: self.category,
            date: self.date,
            kind: self.kind,
            description: self.description,
            tags: self.tags,
        }
    }
}
