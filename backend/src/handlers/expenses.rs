use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    handlers::{found, projects::ensure_project, success, touched},
    models::expense::{CategoryTotal, CreateExpense, Expense, UpdateExpense},
    repositories::expense as expense_repo,
    services::{budget as budget_service, session_store::Session},
    state::AppState,
    types::{ExpenseId, ProjectId},
    validation::validated,
};

const EXPENSE_NOT_FOUND: &str = "Gasto no encontrado";

pub async fn list_expenses(State(state): State<AppState>) -> AppResult<Json<Vec<Expense>>> {
    Ok(Json(expense_repo::list(&state.pool).await?))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<ExpenseId>,
) -> AppResult<Json<Expense>> {
    Ok(Json(found(
        expense_repo::find_by_id(&state.pool, id).await?,
        EXPENSE_NOT_FOUND,
    )?))
}

pub async fn list_project_expenses(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> AppResult<Json<Vec<Expense>>> {
    ensure_project(&state, project_id).await?;
    Ok(Json(
        expense_repo::list_by_project(&state.pool, project_id).await?,
    ))
}

pub async fn expense_stats(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> AppResult<Json<Vec<CategoryTotal>>> {
    ensure_project(&state, project_id).await?;
    Ok(Json(
        expense_repo::totals_by_category(&state.pool, project_id).await?,
    ))
}

/// Rejected with 400 and both amounts when the budget cannot cover it.
pub async fn create_expense(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateExpense>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let payload = validated(payload)?;
    ensure_project(&state, payload.project_id).await?;

    let id = budget_service::record_expense(&state.pool, &payload, session.user_id).await?;
    let expense = found(
        expense_repo::find_by_id(&state.pool, id).await?,
        EXPENSE_NOT_FOUND,
    )?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<ExpenseId>,
    Json(payload): Json<UpdateExpense>,
) -> AppResult<Json<Expense>> {
    let payload = validated(payload)?;
    touched(
        expense_repo::update(&state.pool, id, &payload).await?,
        EXPENSE_NOT_FOUND,
    )?;
    let expense = found(
        expense_repo::find_by_id(&state.pool, id).await?,
        EXPENSE_NOT_FOUND,
    )?;
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<ExpenseId>,
) -> AppResult<Json<Value>> {
    budget_service::remove_expense(&state.pool, id).await?;
    Ok(success("Gasto eliminado correctamente"))
}
