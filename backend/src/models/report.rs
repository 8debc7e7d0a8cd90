use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::{
    budget::Budget,
    expense::{CategoryTotal, Expense},
    inventory::Movement,
    project::{Project, ProjectStatus},
    resource::{KindTotal, Resource},
};
use crate::types::{ProductId, ProjectId};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductUsage {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit: String,
    pub quantity: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialTotals {
    pub budget_total: f64,
    pub budget_spent: f64,
    pub budget_available: f64,
    pub expenses_total: f64,
    pub resources_total: f64,
    pub products_total: f64,
    pub inventory_entries_total: f64,
    pub inventory_exits_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialReport {
    pub project: Project,
    pub budget: Option<Budget>,
    pub resources: Vec<Resource>,
    pub expenses: Vec<Expense>,
    pub products_used: Vec<ProductUsage>,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub resources_by_kind: Vec<KindTotal>,
    pub inventory_movements: Vec<Movement>,
    pub totals: FinancialTotals,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProjectFinanceRow {
    pub project_id: ProjectId,
    pub project_name: String,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget_total: f64,
    pub budget_spent: f64,
    pub expense_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedReport {
    pub projects: Vec<ProjectFinanceRow>,
    pub project_count: usize,
    pub budget_total: f64,
    pub budget_spent: f64,
    pub budget_available: f64,
    pub percent_spent: f64,
}

impl ConsolidatedReport {
    pub fn from_rows(projects: Vec<ProjectFinanceRow>) -> Self {
        let budget_total: f64 = projects.iter().map(|row| row.budget_total).sum();
        let budget_spent: f64 = projects.iter().map(|row| row.budget_spent).sum();
        Self {
            project_count: projects.len(),
            budget_total,
            budget_spent,
            budget_available: budget_total - budget_spent,
            percent_spent: super::budget::percent(budget_spent, budget_total),
            projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, total: f64, spent: f64) -> ProjectFinanceRow {
        ProjectFinanceRow {
            project_id: ProjectId(id),
            project_name: format!("Proyecto {}", id),
            status: ProjectStatus::InProgress,
            start_date: None,
            end_date: None,
            budget_total: total,
            budget_spent: spent,
            expense_count: 0,
        }
    }

    #[test]
    fn consolidated_totals_sum_all_projects() {
        let report = ConsolidatedReport::from_rows(vec![row(1, 1000.0, 250.0), row(2, 3000.0, 750.0)]);
        assert_eq!(report.project_count, 2);
        assert_eq!(report.budget_total, 4000.0);
        assert_eq!(report.budget_spent, 1000.0);
        assert_eq!(report.budget_available, 3000.0);
        assert_eq!(report.percent_spent, 25.0);
    }

    #[test]
    fn empty_consolidated_report_is_zeroed() {
        let report = ConsolidatedReport::from_rows(Vec::new());
        assert_eq!(report.project_count, 0);
        assert_eq!(report.percent_spent, 0.0);
    }
}
