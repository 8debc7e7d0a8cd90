use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    handlers::{found, projects::PROJECT_NOT_FOUND},
    models::{
        budget::Budget,
        expense::Expense,
        inventory::{Movement, MovementKind, MovementQuery},
        report::{
            ConsolidatedReport, FinancialReport, FinancialTotals, ProductUsage, ProjectFinanceRow,
        },
        resource::Resource,
    },
    repositories::{
        budget as budget_repo, expense as expense_repo, inventory as inventory_repo,
        project as project_repo, report as report_repo, resource as resource_repo,
    },
    state::AppState,
    types::ProjectId,
};

fn financial_totals(
    budget: Option<&Budget>,
    expenses: &[Expense],
    resources: &[Resource],
    products_used: &[ProductUsage],
    movements: &[Movement],
) -> FinancialTotals {
    let (budget_total, budget_spent) = budget
        .map(|b| (b.total_amount, b.spent_amount))
        .unwrap_or((0.0, 0.0));
    let movement_total = |kind: MovementKind| -> f64 {
        movements
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.total_cost)
            .sum()
    };

    FinancialTotals {
        budget_total,
        budget_spent,
        budget_available: budget_total - budget_spent,
        expenses_total: expenses.iter().map(|e| e.amount).sum(),
        resources_total: resources.iter().map(|r| r.total_cost).sum(),
        products_total: products_used.iter().map(|p| p.total_cost).sum(),
        inventory_entries_total: movement_total(MovementKind::Entry),
        inventory_exits_total: movement_total(MovementKind::Exit),
    }
}

pub async fn financial_report(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> AppResult<Json<FinancialReport>> {
    let project = found(
        project_repo::find_by_id(&state.pool, project_id).await?,
        PROJECT_NOT_FOUND,
    )?;

    let budget = budget_repo::find_by_project(&state.pool, project_id).await?;
    let resources = resource_repo::list_by_project(&state.pool, project_id).await?;
    let expenses = expense_repo::list_by_project(&state.pool, project_id).await?;
    let products_used = report_repo::products_used(&state.pool, project_id).await?;
    let expenses_by_category = expense_repo::totals_by_category(&state.pool, project_id).await?;
    let resources_by_kind = resource_repo::totals_by_kind(&state.pool, project_id).await?;
    let inventory_movements = inventory_repo::list(
        &state.pool,
        &MovementQuery {
            project_id: Some(project_id),
            limit: Some(500),
            ..Default::default()
        },
    )
    .await?;

    let totals = financial_totals(
        budget.as_ref(),
        &expenses,
        &resources,
        &products_used,
        &inventory_movements,
    );

    Ok(Json(FinancialReport {
        project,
        budget,
        resources,
        expenses,
        products_used,
        expenses_by_category,
        resources_by_kind,
        inventory_movements,
        totals,
    }))
}

pub async fn finished_projects(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProjectFinanceRow>>> {
    Ok(Json(report_repo::finished_projects(&state.pool).await?))
}

pub async fn consolidated_report(
    State(state): State<AppState>,
) -> AppResult<Json<ConsolidatedReport>> {
    let rows = report_repo::all_projects(&state.pool).await?;
    Ok(Json(ConsolidatedReport::from_rows(rows)))
}
