//! Validated commands for ledger items.

use uuid::Uuid;

use crate::core::services::{validate_amount, validate_name, ServiceError, ServiceResult};
use crate::ledger::{BudgetItem, ItemDraft, Ledger};

/// Guards the store against malformed input: empty names and negative or
/// non-finite amounts are rejected before the ledger sees them, and unknown
/// ids become errors instead of silent no-ops.
pub struct TransactionService;

impl TransactionService {
    /// Adds a new item and returns its identifier.
    pub fn add(ledger: &mut Ledger, draft: ItemDraft) -> ServiceResult<Uuid> {
        Self::validate(&draft.name, draft.amount)?;
        Ok(ledger.add_item(draft))
    }

    /// Replaces the item carrying `item.id`.
    pub fn update(ledger: &mut Ledger, item: BudgetItem) -> ServiceResult<()> {
        Self::validate(&item.name, item.amount)?;
        if ledger.update_item(item) {
            Ok(())
        } else {
            Err(ServiceError::Invalid("Transaction not found".into()))
        }
    }

    /// Removes the item identified by `id`, returning the removed instance.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<BudgetItem> {
        ledger
            .delete_item(id)
            .ok_or_else(|| ServiceError::Invalid("Transaction not found".into()))
    }

    /// Items ordered newest first for display.
    pub fn list(ledger: &Ledger) -> Vec<&BudgetItem> {
        let mut items: Vec<&BudgetItem> = ledger.items().iter().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        items
    }

    /// Resolves an item from a full id or a unique id prefix.
    pub fn find<'a>(ledger: &'a Ledger, reference: &str) -> ServiceResult<&'a BudgetItem> {
        let needle = reference.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(ServiceError::Invalid("Transaction id required".into()));
        }
        let mut matches = ledger
            .items()
            .iter()
            .filter(|item| item.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(item), None) => Ok(item),
            (Some(_), Some(_)) => Err(ServiceError::Invalid(format!(
                "Transaction id `{reference}` is ambiguous"
            ))),
            (None, _) => Err(ServiceError::Invalid("Transaction not found".into())),
        }
    }

    fn validate(name: &str, amount: f64) -> ServiceResult<()> {
        validate_name("Name", name)?;
        validate_amount("Amount", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn draft(name: &str, amount: f64) -> ItemDraft {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ItemDraft::expense(name, amount, "Shopping", date)
    }

    #[test]
    fn add_rejects_blank_name_and_negative_amount() {
        let mut ledger = Ledger::new();
        let err = TransactionService::add(&mut ledger, draft("  ", 5.0)).unwrap_err();
        assert!(
            matches!(err, ServiceError::Invalid(ref message) if message.contains("empty")),
            "unexpected error: {err:?}"
        );
        let err = TransactionService::add(&mut ledger, draft("Shoes", -5.0)).unwrap_err();
        assert!(
            matches!(err, ServiceError::Invalid(ref message) if message.contains("negative")),
            "unexpected error: {err:?}"
        );
        assert!(TransactionService::add(&mut ledger, draft("Shoes", f64::NAN)).is_err());
        assert_eq!(ledger.item_count(), 0);
    }

    #[test]
    fn update_fails_for_missing_transaction() {
        let mut ledger = Ledger::new();
        let ghost = draft("Ghost", 1.0).into_item(Uuid::new_v4());
        let err = TransactionService::update(&mut ledger, ghost)
            .expect_err("update must fail for unknown id");
        assert!(
            matches!(err, ServiceError::Invalid(ref message) if message.contains("not found")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn remove_returns_deleted_transaction() {
        let mut ledger = Ledger::new();
        let id = TransactionService::add(&mut ledger, draft("Hat", 20.0)).unwrap();
        let removed = TransactionService::remove(&mut ledger, id).unwrap();
        assert_eq!(removed.id, id);
        assert!(ledger.item(id).is_none());
    }

    #[test]
    fn find_accepts_unique_prefix() {
        let mut ledger = Ledger::new();
        let id = TransactionService::add(&mut ledger, draft("Scarf", 12.0)).unwrap();
        let prefix = &id.to_string()[..8];
        let found = TransactionService::find(&ledger, prefix).unwrap();
        assert_eq!(found.id, id);
    }

    #[test]
    fn list_is_newest_first() {
        let mut ledger = Ledger::new();
        let mut older = draft("Older", 1.0);
        older.date = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        TransactionService::add(&mut ledger, older).unwrap();
        TransactionService::add(&mut ledger, draft("Newer", 2.0)).unwrap();

        let names: Vec<&str> = TransactionService::list(&ledger)
            .into_iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }
}
