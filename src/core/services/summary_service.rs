//! Read-only analytics over ledger views.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::ledger::{BudgetItem, ItemKind, LedgerView};

/// Spend against a category's ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryUsage {
    pub name: String,
    pub color: String,
    pub spent: f64,
    pub limit: Option<f64>,
    pub percent_used: f64,
    pub over_limit: bool,
}

/// A category's share of total expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub spent: f64,
    pub share: f64,
}

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
}

impl MonthlyTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Expenses as a percentage of the monthly budget; zero without a budget.
    pub fn budget_utilization(view: &LedgerView) -> f64 {
        if view.monthly_budget > 0.0 {
            view.total_expenses / view.monthly_budget * 100.0
        } else {
            0.0
        }
    }

    pub fn category_usage(view: &LedgerView) -> Vec<CategoryUsage> {
        view.categories
            .iter()
            .map(|category| {
                let percent_used = match category.limit {
                    Some(limit) if limit > 0.0 => category.spent / limit * 100.0,
                    _ => 0.0,
                };
                CategoryUsage {
                    name: category.name.clone(),
                    color: category.color.clone(),
                    spent: category.spent,
                    limit: category.limit,
                    percent_used,
                    over_limit: category.is_over_limit(),
                }
            })
            .collect()
    }

    /// Share of `total_expenses` per category, skipping categories with no
    /// spend. Dangling items make the shares sum to less than one.
    pub fn category_breakdown(view: &LedgerView) -> Vec<CategoryShare> {
        view.categories
            .iter()
            .filter(|category| category.spent > 0.0)
            .map(|category| CategoryShare {
                name: category.name.clone(),
                spent: category.spent,
                share: if view.total_expenses > 0.0 {
                    category.spent / view.total_expenses
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Groups items by calendar month, oldest month first.
    pub fn monthly_trend(items: &[BudgetItem]) -> Vec<MonthlyTotals> {
        let mut months: BTreeMap<(i32, u32), MonthlyTotals> = BTreeMap::new();
        for item in items {
            let key = (item.date.year(), item.date.month());
            let entry = months.entry(key).or_insert_with(|| MonthlyTotals {
                year: key.0,
                month: key.1,
                income: 0.0,
                expenses: 0.0,
            });
            match item.kind {
                ItemKind::Income => entry.income += item.amount,
                ItemKind::Expense => entry.expenses += item.amount,
            }
        }
        months.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ItemDraft, Ledger};
    use chrono::{TimeZone, Utc};

    fn sample() -> Ledger {
        let mut ledger = Ledger::new();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        ledger.add_item(ItemDraft::income("Salary", 3000.0, jan));
        ledger.add_item(ItemDraft::expense("Groceries", 250.0, "Food & Dining", jan));
        ledger.add_item(ItemDraft::expense("Concert", 250.0, "Entertainment", feb));
        ledger.add_item(ItemDraft::expense("Unknown", 500.0, "Gadgets", feb));
        ledger
    }

    #[test]
    fn utilization_uses_monthly_budget() {
        let view = sample().view();
        assert_eq!(SummaryService::budget_utilization(&view), 50.0);

        let mut ledger = sample();
        ledger.set_monthly_budget(0.0);
        assert_eq!(SummaryService::budget_utilization(&ledger.view()), 0.0);
    }

    #[test]
    fn usage_flags_over_limit_categories() {
        let usage = SummaryService::category_usage(&sample().view());
        let entertainment = usage.iter().find(|u| u.name == "Entertainment").unwrap();
        assert_eq!(entertainment.percent_used, 125.0);
        assert!(entertainment.over_limit);
        let food = usage.iter().find(|u| u.name == "Food & Dining").unwrap();
        assert_eq!(food.percent_used, 50.0);
        assert!(!food.over_limit);
    }

    #[test]
    fn breakdown_excludes_dangling_spend() {
        let breakdown = SummaryService::category_breakdown(&sample().view());
        assert_eq!(breakdown.len(), 2);
        let total_share: f64 = breakdown.iter().map(|s| s.share).sum();
        assert_eq!(total_share, 0.5);
    }

    #[test]
    fn trend_groups_by_month_in_order() {
        let ledger = sample();
        let trend = SummaryService::monthly_trend(ledger.items());
        assert_eq!(trend.len(), 2);
        assert_eq!((trend[0].year, trend[0].month), (2024, 1));
        assert_eq!(trend[0].net(), 2750.0);
        assert_eq!(trend[1].expenses, 750.0);
    }
}
