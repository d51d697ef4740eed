//! Typo-tolerant search over ledger items and generated content.
//!
//! Each document exposes weighted keys. A key matches when its score is at
//! or below the index threshold: `0` for a substring hit, otherwise
//! `1 - normalized Levenshtein similarity` against the closest word. A
//! document's score is the product of `score ^ normalized_weight` over its
//! matching keys, so lower is better.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use strsim::normalized_levenshtein;

use crate::ai::GeneratedContent;
use crate::ledger::{BudgetItem, ItemKind};

pub const ITEM_THRESHOLD: f64 = 0.3;
pub const CONTENT_THRESHOLD: f64 = 0.4;
const MAX_SUGGESTIONS: usize = 5;

/// A document that can be placed in a [`SearchIndex`].
pub trait Searchable {
    const THRESHOLD: f64;

    /// `(weight, values)` per key. A key with no values is absent.
    fn search_keys(&self) -> Vec<(f64, Vec<String>)>;
}

impl Searchable for BudgetItem {
    const THRESHOLD: f64 = ITEM_THRESHOLD;

    fn search_keys(&self) -> Vec<(f64, Vec<String>)> {
        vec![
            (0.4, vec![self.name.clone()]),
            (0.3, non_empty(&self.category)),
            (0.2, self.description.iter().cloned().collect()),
            (0.1, self.tags.clone()),
        ]
    }
}

impl Searchable for GeneratedContent {
    const THRESHOLD: f64 = CONTENT_THRESHOLD;

    fn search_keys(&self) -> Vec<(f64, Vec<String>)> {
        vec![
            (0.5, vec![self.title.clone()]),
            (0.3, non_empty(&self.content)),
            (0.2, self.tags.clone()),
        ]
    }
}

fn non_empty(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        Vec::new()
    } else {
        vec![value.to_string()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit<'a, T> {
    pub item: &'a T,
    pub score: f64,
}

struct IndexedKey {
    weight: f64,
    values: Vec<String>,
}

/// Lowercased key index over borrowed documents. Rebuild it after the
/// underlying collection changes.
pub struct SearchIndex<'a, T> {
    docs: Vec<(&'a T, Vec<IndexedKey>)>,
}

impl<'a, T: Searchable> SearchIndex<'a, T> {
    pub fn new(docs: &'a [T]) -> Self {
        let docs = docs
            .iter()
            .map(|doc| {
                let keys = doc
                    .search_keys()
                    .into_iter()
                    .map(|(weight, values)| IndexedKey {
                        weight,
                        values: values.iter().map(|value| value.to_lowercase()).collect(),
                    })
                    .collect();
                (doc, keys)
            })
            .collect();
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Matching documents ordered best first. A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<SearchHit<'a, T>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<SearchHit<'a, T>> = self
            .docs
            .iter()
            .filter_map(|(doc, keys)| {
                score(&query, keys, T::THRESHOLD)
                    .map(|score| SearchHit { item: *doc, score })
            })
            .collect();
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits
    }
}

fn score(query: &str, keys: &[IndexedKey], threshold: f64) -> Option<f64> {
    let total_weight: f64 = keys.iter().map(|key| key.weight).sum();
    let mut matched = false;
    let mut total = 1.0;
    for key in keys {
        let Some(score) = key
            .values
            .iter()
            .map(|value| field_score(query, value))
            .min_by(f64::total_cmp)
        else {
            continue;
        };
        if score <= threshold {
            matched = true;
            let norm = if total_weight > 0.0 {
                key.weight / total_weight
            } else {
                1.0
            };
            total *= score.max(f64::EPSILON).powf(norm);
        }
    }
    matched.then_some(total)
}

fn field_score(query: &str, value: &str) -> f64 {
    if value.contains(query) {
        return 0.0;
    }
    let best = value
        .split_whitespace()
        .map(|word| normalized_levenshtein(query, word))
        .fold(normalized_levenshtein(query, value), f64::max);
    1.0 - best
}

/// Post-match filters for item search. Ranges are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub kind: Option<ItemKind>,
    pub category: Option<String>,
    pub date_range: Option<RangeInclusive<DateTime<Utc>>>,
    pub amount_range: Option<RangeInclusive<f64>>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.category.is_none()
            && self.date_range.is_none()
            && self.amount_range.is_none()
    }

    pub fn accepts(&self, item: &BudgetItem) -> bool {
        self.kind.map_or(true, |kind| item.kind == kind)
            && self
                .category
                .as_deref()
                .map_or(true, |category| item.category == category)
            && self
                .date_range
                .as_ref()
                .map_or(true, |range| range.contains(&item.date))
            && self
                .amount_range
                .as_ref()
                .map_or(true, |range| range.contains(&item.amount))
    }
}

impl<'a> SearchIndex<'a, BudgetItem> {
    /// Searches, then applies `filters`. A blank query lists every item
    /// accepted by the filters, in ledger order with score zero.
    pub fn advanced_search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Vec<SearchHit<'a, BudgetItem>> {
        let hits = if query.trim().is_empty() {
            self.docs
                .iter()
                .map(|(doc, _)| SearchHit {
                    item: *doc,
                    score: 0.0,
                })
                .collect()
        } else {
            self.search(query)
        };
        hits.into_iter()
            .filter(|hit| filters.accepts(hit.item))
            .collect()
    }

    /// Up to five distinct category and item names containing `query`,
    /// categories first.
    pub fn suggestions(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        let categories = self.docs.iter().map(|(item, _)| item.category.as_str());
        let names = self.docs.iter().map(|(item, _)| item.name.as_str());

        let mut seen = HashSet::new();
        categories
            .chain(names)
            .filter(|candidate| !candidate.is_empty())
            .filter(|candidate| seen.insert(*candidate))
            .filter(|candidate| candidate.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ItemDraft;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn items() -> Vec<BudgetItem> {
        let day = |d| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap();
        vec![
            ItemDraft::expense("Groceries", 82.5, "Food & Dining", day(1))
                .with_tags(["weekly"])
                .into_item(Uuid::new_v4()),
            ItemDraft::expense("Pizza night", 30.0, "Food & Dining", day(5))
                .with_description("friends over")
                .into_item(Uuid::new_v4()),
            ItemDraft::expense("Bus pass", 45.0, "Transportation", day(9)).into_item(Uuid::new_v4()),
            ItemDraft::income("Salary", 3000.0, day(10)).into_item(Uuid::new_v4()),
        ]
    }

    #[test]
    fn substring_match_ranks_first() {
        let items = items();
        let index = SearchIndex::new(&items);
        let hits = index.search("pizza");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.name, "Pizza night");
        assert!(hits[0].score < 1e-3);
    }

    #[test]
    fn tolerates_typos() {
        let items = items();
        let index = SearchIndex::new(&items);
        let hits = index.search("grocries");
        assert_eq!(hits.first().map(|hit| hit.item.name.as_str()), Some("Groceries"));
    }

    #[test]
    fn blank_or_unrelated_query_matches_nothing() {
        let items = items();
        let index = SearchIndex::new(&items);
        assert!(index.search("   ").is_empty());
        assert!(index.search("xylophone").is_empty());
    }

    #[test]
    fn category_key_matches_items() {
        let items = items();
        let index = SearchIndex::new(&items);
        let hits = index.search("dining");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn filters_apply_after_matching() {
        let items = items();
        let index = SearchIndex::new(&items);
        let filters = SearchFilters {
            amount_range: Some(40.0..=100.0),
            ..Default::default()
        };
        let hits = index.advanced_search("food", &filters);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.name, "Groceries");

        let income_only = SearchFilters {
            kind: Some(ItemKind::Income),
            ..Default::default()
        };
        let all_income = index.advanced_search("", &income_only);
        assert_eq!(all_income.len(), 1);
        assert_eq!(all_income[0].item.name, "Salary");
    }

    #[test]
    fn suggestions_list_categories_first_and_cap() {
        let items = items();
        let index = SearchIndex::new(&items);
        assert_eq!(
            index.suggestions("I"),
            vec!["Food & Dining", "Transportation", "Groceries", "Pizza night"]
        );
        assert_eq!(index.suggestions("").len(), 5);
    }
}
