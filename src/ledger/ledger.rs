use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::category::{default_categories, BudgetCategory, CategoryDraft};
use super::item::{BudgetItem, ItemDraft, ItemKind};

pub const DEFAULT_MONTHLY_BUDGET: f64 = 2000.0;

/// Derived income/expense aggregates kept in step with the item set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

/// Owned read snapshot handed to presentation and AI consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    pub items: Vec<BudgetItem>,
    pub categories: Vec<BudgetCategory>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub monthly_budget: f64,
}

/// Whether the aggregate rule adds or withdraws an item's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Apply,
    Revert,
}

impl Sign {
    fn factor(self) -> f64 {
        match self {
            Sign::Apply => 1.0,
            Sign::Revert => -1.0,
        }
    }
}

/// In-memory budget ledger: items, categories and their aggregates.
///
/// Every command leaves `total_income`, `total_expenses`, `balance` and each
/// category's `spent` consistent with the item set, apart from items whose
/// category name matches no category (see [`Ledger::audit`]). Aggregates are
/// adjusted incrementally and never recomputed on read.
#[derive(Debug, Clone)]
pub struct Ledger {
    items: Vec<BudgetItem>,
    categories: Vec<BudgetCategory>,
    /// Category name -> position of the first category carrying that name.
    category_index: HashMap<String, usize>,
    totals: LedgerTotals,
    monthly_budget: f64,
}

impl Default for Ledger {
    fn default() -> Self {
        let mut ledger = Self::empty();
        ledger.monthly_budget = DEFAULT_MONTHLY_BUDGET;
        for draft in default_categories() {
            ledger.add_category(draft);
        }
        ledger
    }
}

impl Ledger {
    /// Creates a ledger seeded with the default categories and monthly budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger with no categories and a zero monthly budget.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            categories: Vec::new(),
            category_index: HashMap::new(),
            totals: LedgerTotals::default(),
            monthly_budget: 0.0,
        }
    }

    /// Records a new item, returning its freshly assigned id.
    ///
    /// No validation happens here; a category name that matches no category
    /// still counts toward `total_expenses`.
    pub fn add_item(&mut self, draft: ItemDraft) -> Uuid {
        let id = Uuid::new_v4();
        self.insert_item(draft.into_item(id));
        debug!(item = %id, "item added");
        id
    }

    /// Replaces the stored item carrying `item.id`.
    ///
    /// Returns `false` without touching anything when the id is unknown.
    pub fn update_item(&mut self, item: BudgetItem) -> bool {
        let Some(position) = self.item_position(item.id) else {
            warn!(item = %item.id, "update ignored: unknown item");
            return false;
        };
        let id = item.id;
        let previous = std::mem::replace(&mut self.items[position], item);
        self.apply_rule(&previous, Sign::Revert);
        let current = self.items[position].clone();
        self.apply_rule(&current, Sign::Apply);
        debug!(item = %id, "item updated");
        true
    }

    /// Removes an item and withdraws its contribution from the aggregates.
    pub fn delete_item(&mut self, id: Uuid) -> Option<BudgetItem> {
        let Some(position) = self.item_position(id) else {
            warn!(item = %id, "delete ignored: unknown item");
            return None;
        };
        let removed = self.items.remove(position);
        self.apply_rule(&removed, Sign::Revert);
        debug!(item = %id, "item deleted");
        Some(removed)
    }

    /// Adds a category with a zero spent total.
    ///
    /// Existing items that already reference the name are not absorbed.
    pub fn add_category(&mut self, draft: CategoryDraft) -> Uuid {
        let id = Uuid::new_v4();
        self.categories.push(draft.into_category(id));
        self.rebuild_category_index();
        debug!(category = %id, "category added");
        id
    }

    /// Replaces name, color and limit of an existing category. The spent
    /// total is owned by the ledger and keeps its current value.
    pub fn update_category(&mut self, category: BudgetCategory) -> bool {
        let Some(existing) = self.categories.iter_mut().find(|c| c.id == category.id) else {
            warn!(category = %category.id, "update ignored: unknown category");
            return false;
        };
        existing.name = category.name;
        existing.color = category.color;
        existing.limit = category.limit;
        self.rebuild_category_index();
        debug!(category = %category.id, "category updated");
        true
    }

    /// Removes a category. Items filed under its name keep that name.
    pub fn delete_category(&mut self, id: Uuid) -> Option<BudgetCategory> {
        let Some(position) = self.categories.iter().position(|c| c.id == id) else {
            warn!(category = %id, "delete ignored: unknown category");
            return None;
        };
        let removed = self.categories.remove(position);
        self.rebuild_category_index();
        debug!(category = %id, "category deleted");
        Some(removed)
    }

    pub fn set_monthly_budget(&mut self, value: f64) {
        self.monthly_budget = value;
        debug!(value, "monthly budget set");
    }

    /// Drops all state and returns to a freshly seeded ledger.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn items(&self) -> &[BudgetItem] {
        &self.items
    }

    pub fn categories(&self) -> &[BudgetCategory] {
        &self.categories
    }

    pub fn item(&self, id: Uuid) -> Option<&BudgetItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&BudgetCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Resolves the join key used by items. First category wins on duplicate
    /// names.
    pub fn category_by_name(&self, name: &str) -> Option<&BudgetCategory> {
        self.category_index
            .get(name)
            .and_then(|&position| self.categories.get(position))
    }

    pub fn total_income(&self) -> f64 {
        self.totals.total_income
    }

    pub fn total_expenses(&self) -> f64 {
        self.totals.total_expenses
    }

    pub fn balance(&self) -> f64 {
        self.totals.balance
    }

    pub fn totals(&self) -> LedgerTotals {
        self.totals
    }

    pub fn monthly_budget(&self) -> f64 {
        self.monthly_budget
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn view(&self) -> LedgerView {
        LedgerView {
            items: self.items.clone(),
            categories: self.categories.clone(),
            total_income: self.totals.total_income,
            total_expenses: self.totals.total_expenses,
            balance: self.totals.balance,
            monthly_budget: self.monthly_budget,
        }
    }

    /// Appends an item that already carries an id and applies its
    /// contribution. Used by `add_item` and by snapshot replay.
    pub(crate) fn insert_item(&mut self, item: BudgetItem) {
        self.items.push(item);
        if let Some(last) = self.items.last().cloned() {
            self.apply_rule(&last, Sign::Apply);
        }
    }

    /// Appends a category as-is, with `spent` reset to zero.
    pub(crate) fn insert_category(&mut self, mut category: BudgetCategory) {
        category.spent = 0.0;
        self.categories.push(category);
        self.rebuild_category_index();
    }

    pub(crate) fn contains_item(&self, id: Uuid) -> bool {
        self.item_position(id).is_some()
    }

    fn item_position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn apply_rule(&mut self, item: &BudgetItem, sign: Sign) {
        let delta = sign.factor() * item.amount;
        match item.kind {
            ItemKind::Income => self.totals.total_income += delta,
            ItemKind::Expense => {
                self.totals.total_expenses += delta;
                if let Some(&position) = self.category_index.get(&item.category) {
                    self.categories[position].spent += delta;
                }
            }
        }
        self.totals.balance = self.totals.total_income - self.totals.total_expenses;
    }

    fn rebuild_category_index(&mut self) {
        self.category_index.clear();
        for (position, category) in self.categories.iter().enumerate() {
            self.category_index
                .entry(category.name.clone())
                .or_insert(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn spent(ledger: &Ledger, name: &str) -> f64 {
        ledger.category_by_name(name).map(|c| c.spent).unwrap_or(-1.0)
    }

    #[test]
    fn fresh_ledger_is_seeded() {
        let ledger = Ledger::new();
        assert_eq!(ledger.categories().len(), 6);
        assert!(close(ledger.monthly_budget(), DEFAULT_MONTHLY_BUDGET));
        assert_eq!(ledger.totals(), LedgerTotals::default());
    }

    #[test]
    fn basic_flow_updates_totals_and_category() {
        let mut ledger = Ledger::new();
        ledger.add_item(ItemDraft::income("Salary", 1000.0, at(1)));
        assert!(close(ledger.total_income(), 1000.0));
        assert!(close(ledger.balance(), 1000.0));

        ledger.add_item(ItemDraft::expense("Groceries", 120.0, "Food & Dining", at(2)));
        assert!(close(ledger.total_expenses(), 120.0));
        assert!(close(ledger.balance(), 880.0));
        assert!(close(spent(&ledger, "Food & Dining"), 120.0));
    }

    #[test]
    fn update_reverses_old_contribution_before_applying_new() {
        let mut ledger = Ledger::new();
        let id = ledger.add_item(ItemDraft::expense("Bus pass", 50.0, "Transportation", at(3)));
        let before = ledger.totals();

        let mut replacement = ledger.item(id).cloned().unwrap();
        replacement.category = "Shopping".into();
        replacement.amount = 30.0;
        assert!(ledger.update_item(replacement));

        assert!(close(spent(&ledger, "Transportation"), 0.0));
        assert!(close(spent(&ledger, "Shopping"), 30.0));
        assert!(close(ledger.total_expenses(), before.total_expenses - 20.0));
        assert!(close(ledger.total_income(), before.total_income));
    }

    #[test]
    fn update_can_flip_item_kind() {
        let mut ledger = Ledger::new();
        let id = ledger.add_item(ItemDraft::expense("Refund", 80.0, "Shopping", at(4)));

        let mut flipped = ledger.item(id).cloned().unwrap();
        flipped.kind = ItemKind::Income;
        assert!(ledger.update_item(flipped));

        assert!(close(ledger.total_expenses(), 0.0));
        assert!(close(ledger.total_income(), 80.0));
        assert!(close(spent(&ledger, "Shopping"), 0.0));
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut ledger = Ledger::new();
        ledger.add_item(ItemDraft::expense("Movie", 15.0, "Entertainment", at(5)));
        let before = ledger.view();

        let ghost = ItemDraft::income("Ghost", 1.0, at(6)).into_item(Uuid::new_v4());
        assert!(!ledger.update_item(ghost));
        assert!(ledger.delete_item(Uuid::new_v4()).is_none());
        assert_eq!(ledger.view(), before);
    }

    #[test]
    fn delete_restores_previous_aggregates() {
        let mut ledger = Ledger::new();
        ledger.add_item(ItemDraft::income("Salary", 2500.0, at(1)));
        let before = ledger.view();

        let id = ledger.add_item(ItemDraft::expense("Doctor", 75.0, "Healthcare", at(7)));
        let removed = ledger.delete_item(id).expect("item exists");
        assert_eq!(removed.name, "Doctor");
        assert_eq!(ledger.view(), before);
    }

    #[test]
    fn dangling_category_only_hits_total_expenses() {
        let mut ledger = Ledger::new();
        ledger.add_item(ItemDraft::expense("Mystery", 40.0, "Nonexistent", at(8)));

        assert!(close(ledger.total_expenses(), 40.0));
        let category_sum: f64 = ledger.categories().iter().map(|c| c.spent).sum();
        assert!(close(category_sum, 0.0));
    }

    #[test]
    fn category_update_keeps_spent_and_reindexes_name() {
        let mut ledger = Ledger::new();
        ledger.add_item(ItemDraft::expense("Power", 90.0, "Utilities", at(9)));
        let mut utilities = ledger.category_by_name("Utilities").cloned().unwrap();
        utilities.name = "Bills".into();
        utilities.spent = 0.0;
        assert!(ledger.update_category(utilities));

        assert!(ledger.category_by_name("Utilities").is_none());
        assert!(close(spent(&ledger, "Bills"), 90.0));
    }

    #[test]
    fn category_delete_leaves_items_untouched() {
        let mut ledger = Ledger::new();
        let item_id = ledger.add_item(ItemDraft::expense("Water", 30.0, "Utilities", at(10)));
        let utilities = ledger.category_by_name("Utilities").map(|c| c.id).unwrap();

        assert!(ledger.delete_category(utilities).is_some());
        assert!(ledger.category_by_name("Utilities").is_none());
        assert_eq!(ledger.item(item_id).unwrap().category, "Utilities");
        assert!(close(ledger.total_expenses(), 30.0));
    }

    #[test]
    fn first_category_wins_on_duplicate_names() {
        let mut ledger = Ledger::empty();
        let first = ledger.add_category(CategoryDraft::new("Dup", "#111111", None));
        let second = ledger.add_category(CategoryDraft::new("Dup", "#222222", None));
        ledger.add_item(ItemDraft::expense("Thing", 10.0, "Dup", at(11)));

        assert!(close(ledger.category(first).unwrap().spent, 10.0));
        assert!(close(ledger.category(second).unwrap().spent, 0.0));

        ledger.delete_category(first);
        assert_eq!(ledger.category_by_name("Dup").map(|c| c.id), Some(second));
    }

    #[test]
    fn reset_returns_to_seeded_state() {
        let mut ledger = Ledger::new();
        ledger.add_item(ItemDraft::income("Bonus", 300.0, at(12)));
        ledger.set_monthly_budget(10.0);
        ledger.reset();
        assert_eq!(ledger.item_count(), 0);
        assert!(close(ledger.monthly_budget(), DEFAULT_MONTHLY_BUDGET));
    }
}
