//! Business logic helpers for category management.

use uuid::Uuid;

use crate::core::services::{validate_amount, validate_name, ServiceError, ServiceResult};
use crate::ledger::{BudgetCategory, CategoryDraft, Ledger};

/// Provides validated operations for [`BudgetCategory`] entities.
pub struct CategoryService;

impl CategoryService {
    /// Adds a new category after checking its name and limit.
    pub fn add(ledger: &mut Ledger, draft: CategoryDraft) -> ServiceResult<Uuid> {
        Self::validate_name(ledger, None, &draft.name)?;
        Self::validate_limit(draft.limit)?;
        Ok(ledger.add_category(draft))
    }

    /// Applies new name, color and limit to an existing category.
    ///
    /// Renaming detaches items filed under the old name; they are not moved.
    pub fn edit(ledger: &mut Ledger, changes: BudgetCategory) -> ServiceResult<()> {
        Self::validate_name(ledger, Some(changes.id), &changes.name)?;
        Self::validate_limit(changes.limit)?;
        if ledger.update_category(changes) {
            Ok(())
        } else {
            Err(ServiceError::Invalid("Category not found".into()))
        }
    }

    /// Removes a category. Items referencing it keep their category name.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<BudgetCategory> {
        ledger
            .delete_category(id)
            .ok_or_else(|| ServiceError::Invalid("Category not found".into()))
    }

    /// Returns a snapshot of all categories.
    pub fn list(ledger: &Ledger) -> Vec<&BudgetCategory> {
        ledger.categories().iter().collect()
    }

    /// Resolves a category by exact name, id, or unique id prefix.
    pub fn find<'a>(ledger: &'a Ledger, reference: &str) -> ServiceResult<&'a BudgetCategory> {
        if let Some(category) = ledger.category_by_name(reference) {
            return Ok(category);
        }
        let needle = reference.trim().to_ascii_lowercase();
        let mut matches = ledger
            .categories()
            .iter()
            .filter(|category| !needle.is_empty() && category.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(category), None) => Ok(category),
            (Some(_), Some(_)) => Err(ServiceError::Invalid(format!(
                "Category `{reference}` is ambiguous"
            ))),
            (None, _) => Err(ServiceError::Invalid(format!(
                "Category `{reference}` not found"
            ))),
        }
    }

    fn validate_name(ledger: &Ledger, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()> {
        validate_name("Category name", candidate)?;
        let normalized = candidate.trim().to_ascii_lowercase();
        let duplicate = ledger.categories().iter().any(|category| {
            let name = category.name.trim().to_ascii_lowercase();
            name == normalized && exclude != Some(category.id)
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "Category `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }

    fn validate_limit(limit: Option<f64>) -> ServiceResult<()> {
        match limit {
            Some(value) => validate_amount("Limit", value),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_duplicates_case_insensitively() {
        let mut ledger = Ledger::new();
        let err = CategoryService::add(
            &mut ledger,
            CategoryDraft::new("food & dining", "#000000", None),
        )
        .expect_err("duplicate fails");
        assert!(
            matches!(err, ServiceError::Invalid(ref message) if message.contains("already exists")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn edit_allows_keeping_own_name() {
        let mut ledger = Ledger::new();
        let mut shopping = CategoryService::find(&ledger, "Shopping").unwrap().clone();
        shopping.limit = Some(650.0);
        CategoryService::edit(&mut ledger, shopping.clone()).unwrap();
        assert_eq!(ledger.category(shopping.id).unwrap().limit, Some(650.0));
    }

    #[test]
    fn negative_limit_rejected() {
        let mut ledger = Ledger::empty();
        let err = CategoryService::add(&mut ledger, CategoryDraft::new("Pets", "#123456", Some(-1.0)))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn remove_unknown_category_fails() {
        let mut ledger = Ledger::empty();
        assert!(CategoryService::remove(&mut ledger, Uuid::new_v4()).is_err());
    }
}
