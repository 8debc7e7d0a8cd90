use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    handlers::{found, projects::ensure_project, success, touched},
    models::budget::{Budget, BudgetCheck, BudgetStatus, CreateBudget, UpdateBudget},
    repositories::budget as budget_repo,
    services::budget::{describe_check, update_budget as apply_budget_update},
    state::AppState,
    types::{BudgetId, ProjectId},
    validation::validated,
};

const BUDGET_NOT_FOUND: &str = "Presupuesto no encontrado";
const PROJECT_BUDGET_NOT_FOUND: &str = "El proyecto no tiene un presupuesto asignado";

pub async fn list_budgets(State(state): State<AppState>) -> AppResult<Json<Vec<Budget>>> {
    Ok(Json(budget_repo::list(&state.pool).await?))
}

pub async fn get_budget(
    State(state): State<AppState>,
    Path(id): Path<BudgetId>,
) -> AppResult<Json<Budget>> {
    Ok(Json(found(
        budget_repo::find_by_id(&state.pool, id).await?,
        BUDGET_NOT_FOUND,
    )?))
}

pub async fn get_project_budget(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> AppResult<Json<Budget>> {
    Ok(Json(found(
        budget_repo::find_by_project(&state.pool, project_id).await?,
        PROJECT_BUDGET_NOT_FOUND,
    )?))
}

pub async fn budget_status(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> AppResult<Json<BudgetStatus>> {
    let budget = found(
        budget_repo::find_by_project(&state.pool, project_id).await?,
        PROJECT_BUDGET_NOT_FOUND,
    )?;
    Ok(Json(budget.into()))
}

pub async fn check_budget(
    State(state): State<AppState>,
    Path((project_id, amount)): Path<(ProjectId, f64)>,
) -> AppResult<Json<BudgetCheck>> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(AppError::BadRequest("El monto debe ser mayor a 0".into()));
    }
    let budget = found(
        budget_repo::find_by_project(&state.pool, project_id).await?,
        PROJECT_BUDGET_NOT_FOUND,
    )?;
    Ok(Json(describe_check(
        project_id,
        budget.total_amount,
        budget.spent_amount,
        amount,
    )))
}

pub async fn create_budget(
    State(state): State<AppState>,
    Json(payload): Json<CreateBudget>,
) -> AppResult<(StatusCode, Json<Budget>)> {
    let payload = validated(payload)?;
    ensure_project(&state, payload.project_id).await?;
    if budget_repo::find_by_project(&state.pool, payload.project_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "El proyecto ya tiene un presupuesto asignado".into(),
        ));
    }

    let id = budget_repo::create(&state.pool, &payload).await?;
    let budget = found(budget_repo::find_by_id(&state.pool, id).await?, BUDGET_NOT_FOUND)?;
    tracing::info!(budget_id = %id, project_id = %payload.project_id, "Budget created");
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn update_budget(
    State(state): State<AppState>,
    Path(id): Path<BudgetId>,
    Json(payload): Json<UpdateBudget>,
) -> AppResult<Json<Budget>> {
    let payload = validated(payload)?;
    apply_budget_update(&state.pool, id, &payload).await?;
    let budget = found(budget_repo::find_by_id(&state.pool, id).await?, BUDGET_NOT_FOUND)?;
    Ok(Json(budget))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    Path(id): Path<BudgetId>,
) -> AppResult<Json<Value>> {
    touched(budget_repo::delete(&state.pool, id).await?, BUDGET_NOT_FOUND)?;
    Ok(success("Presupuesto eliminado correctamente"))
}
