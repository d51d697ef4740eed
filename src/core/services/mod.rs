pub mod category_service;
pub mod summary_service;
pub mod transaction_service;

pub use category_service::CategoryService;
pub use summary_service::{CategoryShare, CategoryUsage, MonthlyTotals, SummaryService};
pub use transaction_service::TransactionService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}

/// Amounts and limits must be finite magnitudes.
pub(crate) fn validate_amount(label: &str, value: f64) -> ServiceResult<()> {
    if !value.is_finite() {
        return Err(ServiceError::Invalid(format!("{label} must be a number")));
    }
    if value < 0.0 {
        return Err(ServiceError::Invalid(format!(
            "{label} cannot be negative"
        )));
    }
    Ok(())
}

pub(crate) fn validate_name(label: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        Err(ServiceError::Invalid(format!("{label} cannot be empty")))
    } else {
        Ok(())
    }
}
