//! Budget bookkeeping. Every change to `spent_amount` happens inside a
//! transaction holding the budget row lock.

use sqlx::PgPool;
use thiserror::Error;

use crate::error::AppError;
use crate::models::budget::{BudgetCheck, UpdateBudget};
use crate::models::expense::CreateExpense;
use crate::repositories::{budget as budget_repo, expense as expense_repo};
use crate::types::{BudgetId, ExpenseId, ProjectId, UserId};

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("El proyecto no tiene un presupuesto asignado")]
    NoBudget,
    #[error("Presupuesto no encontrado")]
    BudgetNotFound,
    #[error("Gasto no encontrado")]
    ExpenseNotFound,
    #[error("Presupuesto insuficiente: disponible {available}, solicitado {requested}")]
    Insufficient { available: f64, requested: f64 },
    #[error("El monto total no puede ser menor a lo ya gastado ({spent})")]
    BelowSpent { spent: f64 },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::NoBudget | BudgetError::BelowSpent { .. } => {
                AppError::BadRequest(err.to_string())
            }
            BudgetError::BudgetNotFound | BudgetError::ExpenseNotFound => {
                AppError::NotFound(err.to_string())
            }
            BudgetError::Insufficient {
                available,
                requested,
            } => AppError::InsufficientBudget {
                available,
                requested,
            },
            BudgetError::Database(db) => db.into(),
        }
    }
}

/// Returns what would remain after charging `requested`.
pub fn check_availability(total: f64, spent: f64, requested: f64) -> Result<f64, BudgetError> {
    let available = total - spent;
    if requested > available {
        return Err(BudgetError::Insufficient {
            available,
            requested,
        });
    }
    Ok(available - requested)
}

pub fn describe_check(project_id: ProjectId, total: f64, spent: f64, requested: f64) -> BudgetCheck {
    BudgetCheck {
        project_id,
        sufficient: check_availability(total, spent, requested).is_ok(),
        available: total - spent,
        requested,
    }
}

/// Charges the project's budget and inserts the expense atomically.
pub async fn record_expense(
    pool: &PgPool,
    payload: &CreateExpense,
    created_by: UserId,
) -> Result<ExpenseId, BudgetError> {
    let mut tx = pool.begin().await?;

    let (_, total, spent) = budget_repo::lock_amounts_for_project(&mut *tx, payload.project_id)
        .await?
        .ok_or(BudgetError::NoBudget)?;
    check_availability(total, spent, payload.amount)?;

    let id = expense_repo::insert(&mut *tx, payload, created_by).await?;
    budget_repo::adjust_spent(&mut *tx, payload.project_id, payload.amount).await?;
    tx.commit().await?;

    tracing::info!(
        expense_id = %id,
        project_id = %payload.project_id,
        amount = payload.amount,
        "Expense recorded"
    );
    Ok(id)
}

/// Deletes the expense and refunds its amount to the budget.
pub async fn remove_expense(pool: &PgPool, id: ExpenseId) -> Result<(), BudgetError> {
    let mut tx = pool.begin().await?;

    let (project_id, amount) = expense_repo::delete_returning(&mut *tx, id)
        .await?
        .ok_or(BudgetError::ExpenseNotFound)?;
    // Lock before refunding so a concurrent charge sees the final figure.
    budget_repo::lock_amounts_for_project(&mut *tx, project_id).await?;
    budget_repo::adjust_spent(&mut *tx, project_id, -amount).await?;
    tx.commit().await?;

    tracing::info!(expense_id = %id, project_id = %project_id, amount, "Expense removed");
    Ok(())
}

pub async fn update_budget(
    pool: &PgPool,
    id: BudgetId,
    changes: &UpdateBudget,
) -> Result<(), BudgetError> {
    let mut tx = pool.begin().await?;

    let (_, spent) = budget_repo::lock_amounts(&mut *tx, id)
        .await?
        .ok_or(BudgetError::BudgetNotFound)?;
    if let Some(total) = changes.total_amount {
        if total < spent {
            return Err(BudgetError::BelowSpent { spent });
        }
    }

    budget_repo::update(&mut *tx, id, changes).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_within_available_leaves_remainder() {
        assert_eq!(check_availability(1000.0, 850.0, 150.0).unwrap(), 0.0);
        assert_eq!(check_availability(1000.0, 0.0, 400.0).unwrap(), 600.0);
    }

    #[test]
    fn charge_above_available_reports_both_amounts() {
        match check_availability(1000.0, 850.0, 200.0) {
            Err(BudgetError::Insufficient {
                available,
                requested,
            }) => {
                assert_eq!(available, 150.0);
                assert_eq!(requested, 200.0);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn describe_check_flags_shortfall() {
        let check = describe_check(ProjectId(3), 500.0, 100.0, 450.0);
        assert!(!check.sufficient);
        assert_eq!(check.available, 400.0);

        let check = describe_check(ProjectId(3), 500.0, 100.0, 400.0);
        assert!(check.sufficient);
    }

    #[test]
    fn errors_map_to_http_shapes() {
        assert!(matches!(
            AppError::from(BudgetError::Insufficient {
                available: 1.0,
                requested: 2.0
            }),
            AppError::InsufficientBudget { .. }
        ));
        assert!(matches!(
            AppError::from(BudgetError::NoBudget),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(BudgetError::ExpenseNotFound),
            AppError::NotFound(_)
        ));
    }
}
