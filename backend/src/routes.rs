//! Route table. Routers are grouped by access policy and each group gets its
//! gate through `route_layer`, so a handler is never reachable without the
//! policy of the group it was registered in.

use anyhow::Context;
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    docs::ApiDoc,
    handlers::{self, admin},
    middleware::{
        auth::{auth, require_roles, RoleGate},
        log_error_responses,
        rate_limit::create_login_rate_limiter,
        request_id, REQUEST_ID_HEADER,
    },
    models::role::{ADMIN_ONLY, STAFF},
    state::AppState,
};

/// Builds the whole application. Serve it with connect info: the login rate
/// limiter keys on the peer address.
pub fn app_router(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config)?;

    let app = Router::new()
        .merge(public_routes(&state)?)
        .merge(authenticated_routes(&state))
        .merge(staff_routes(&state))
        .merge(admin_routes(&state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum_middleware::from_fn(request_id))
                .layer(axum_middleware::from_fn(log_error_responses)),
        )
        .with_state(state);

    Ok(app)
}

fn public_routes(state: &AppState) -> anyhow::Result<Router<AppState>> {
    let login_limiter = create_login_rate_limiter(&state.config)?;

    Ok(Router::new()
        .merge(SwaggerUi::new("/api/swagger-ui").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::health::health))
        .route(
            "/api/auth/login",
            post(handlers::auth::login).layer(login_limiter),
        )
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", get(handlers::auth::session))
        .route(
            "/api/auth/forgot-password",
            post(handlers::auth::forgot_password),
        ))
}

/// Any valid session.
fn authenticated_routes(state: &AppState) -> Router<AppState> {
    use handlers::{
        budgets, expenses, inventory, milestones, phases, products, projects, providers,
        reports, resources, tasks, tickets, users,
    };

    Router::new()
        // users
        .route("/api/roles", get(users::list_roles))
        .route("/api/users/{id}", get(users::get_user))
        // projects
        .route("/api/projects", get(projects::list_projects).post(projects::create_project))
        .route("/api/projects/categories", get(projects::list_categories))
        .route("/api/projects/search", get(projects::search_projects))
        .route("/api/projects/mine", get(projects::my_projects))
        .route(
            "/api/projects/{id}",
            get(projects::get_project).put(projects::update_project),
        )
        .route("/api/projects/{id}/progress", get(projects::project_progress))
        .route(
            "/api/projects/{id}/phases",
            get(projects::list_project_phases).post(projects::create_project_phase),
        )
        .route(
            "/api/projects/{id}/milestones",
            get(projects::list_project_milestones),
        )
        .route(
            "/api/projects/{id}/milestone-stats",
            get(projects::project_milestone_stats),
        )
        // phases
        .route(
            "/api/phases/{id}",
            get(phases::get_phase)
                .put(phases::update_phase)
                .delete(phases::delete_phase),
        )
        .route(
            "/api/phases/{id}/milestones",
            get(phases::list_phase_milestones).post(phases::create_phase_milestone),
        )
        // milestones
        .route("/api/milestones/mine", get(milestones::my_milestones))
        .route(
            "/api/milestones/{id}",
            get(milestones::get_milestone)
                .put(milestones::update_milestone)
                .delete(milestones::delete_milestone),
        )
        // budgets (reads)
        .route("/api/budgets", get(budgets::list_budgets))
        .route("/api/budgets/{id}", get(budgets::get_budget))
        .route(
            "/api/budgets/project/{project_id}",
            get(budgets::get_project_budget),
        )
        .route("/api/budgets/status/{project_id}", get(budgets::budget_status))
        .route(
            "/api/budgets/check/{project_id}/{amount}",
            get(budgets::check_budget),
        )
        // expenses
        .route(
            "/api/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/api/expenses/{id}",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .route(
            "/api/expenses/project/{project_id}",
            get(expenses::list_project_expenses),
        )
        .route("/api/expenses/stats/{project_id}", get(expenses::expense_stats))
        // resources
        .route(
            "/api/resources",
            get(resources::list_resources).post(resources::create_resource),
        )
        .route(
            "/api/resources/{id}",
            get(resources::get_resource)
                .put(resources::update_resource)
                .delete(resources::delete_resource),
        )
        .route(
            "/api/resources/project/{id}",
            get(resources::list_project_resources),
        )
        .route("/api/resources/phase/{id}", get(resources::list_phase_resources))
        .route(
            "/api/resources/stats/{project_id}",
            get(resources::resource_stats),
        )
        // providers (reads)
        .route("/api/providers", get(providers::list_providers))
        .route("/api/providers/active", get(providers::list_active_providers))
        .route("/api/providers/{id}", get(providers::get_provider))
        // products (reads)
        .route("/api/products", get(products::list_products))
        .route("/api/products/available", get(products::list_available_products))
        .route("/api/products/organic", get(products::list_organic_products))
        .route("/api/products/low-stock", get(products::list_low_stock_products))
        .route("/api/products/total-value", get(products::inventory_total_value))
        .route("/api/products/kind/{kind}", get(products::list_products_by_kind))
        .route(
            "/api/products/provider/{id}",
            get(products::list_provider_products),
        )
        .route("/api/products/{id}", get(products::get_product))
        // inventory
        .route("/api/inventory/entries", post(inventory::register_entry))
        .route("/api/inventory/exits", post(inventory::register_exit))
        .route("/api/inventory/movements", get(inventory::list_movements))
        .route(
            "/api/inventory/summary/{product_id}",
            get(inventory::product_summary),
        )
        .route("/api/inventory/stats", get(inventory::inventory_stats))
        // tickets
        .route(
            "/api/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/api/tickets/{id}",
            get(tickets::get_ticket).put(tickets::update_ticket),
        )
        .route(
            "/api/tickets/{id}/status",
            patch(tickets::update_ticket_status),
        )
        // reports
        .route(
            "/api/reports/financial/{project_id}",
            get(reports::financial_report),
        )
        .route(
            "/api/reports/finished-projects",
            get(reports::finished_projects),
        )
        .route("/api/reports/consolidated", get(reports::consolidated_report))
        // tasks
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/tasks/phase/{id}", get(tasks::list_phase_tasks))
        .route("/api/tasks/project/{id}", get(tasks::list_project_tasks))
        .route(
            "/api/tasks/{id}/assignments",
            get(tasks::list_assignments).post(tasks::create_assignment),
        )
        .route(
            "/api/tasks/assignments/{id}/hours",
            patch(tasks::update_worked_hours),
        )
        .route(
            "/api/tasks/assignments/{id}",
            delete(tasks::delete_assignment),
        )
        .route(
            "/api/tasks/resource-availability/{resource_id}",
            get(tasks::resource_availability),
        )
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), auth))
}

/// Administrators and advisors.
fn staff_routes(state: &AppState) -> Router<AppState> {
    use handlers::{budgets, products, providers};

    Router::new()
        .route("/api/budgets", post(budgets::create_budget))
        .route(
            "/api/budgets/{id}",
            put(budgets::update_budget).delete(budgets::delete_budget),
        )
        .route("/api/providers", post(providers::create_provider))
        .route(
            "/api/providers/{id}",
            put(providers::update_provider).delete(providers::delete_provider),
        )
        .route(
            "/api/providers/{id}/activate",
            patch(providers::activate_provider),
        )
        .route(
            "/api/providers/{id}/deactivate",
            patch(providers::deactivate_provider),
        )
        .route("/api/products", post(products::create_product))
        .route(
            "/api/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            RoleGate::new(state, STAFF),
            require_roles,
        ))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use handlers::{projects, tickets, users};

    Router::new()
        // users
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/api/users/{id}/status", patch(users::update_user_status))
        .route("/api/users/{id}/password", patch(users::change_password))
        .route("/api/users/stats/by-role", get(users::stats_by_role))
        // projects
        .route("/api/projects/{id}", delete(projects::delete_project))
        // tickets
        .route("/api/tickets/stats", get(tickets::ticket_stats))
        .route("/api/tickets/{id}", delete(tickets::delete_ticket))
        .route("/api/tickets/{id}/assign", patch(tickets::assign_ticket))
        // dashboard
        .route("/api/admin/metrics", get(admin::dashboard_metrics))
        .route("/api/admin/activity", get(admin::recent_activity))
        .route("/api/admin/system", get(admin::get_system_info))
        .route("/api/admin/database", get(admin::database_stats))
        .route("/api/admin/sessions", get(admin::session_stats))
        .route(
            "/api/admin/sessions/user/{id}",
            delete(admin::destroy_user_sessions),
        )
        // system logs
        .route("/api/admin/logs", get(admin::list_logs))
        .route("/api/admin/logs/stats", get(admin::log_stats))
        .route("/api/admin/logs/recent", get(admin::recent_logs))
        .route("/api/admin/logs/purge", post(admin::purge_logs))
        .route("/api/admin/logs/{id}", get(admin::get_log))
        .route_layer(axum_middleware::from_fn_with_state(
            RoleGate::new(state, ADMIN_ONLY),
            require_roles,
        ))
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origins = config
        .cors_allow_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(std::time::Duration::from_secs(24 * 60 * 60)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::{test_config, test_state};

    #[tokio::test]
    async fn router_builds_without_overlapping_routes() {
        assert!(app_router(test_state()).is_ok());
    }

    #[test]
    fn invalid_cors_origin_is_rejected() {
        let mut config = test_config();
        config.cors_allow_origins = vec!["bad\norigin".into()];
        assert!(cors_layer(&config).is_err());
    }
}
