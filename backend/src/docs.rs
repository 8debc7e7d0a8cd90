use crate::{
    handlers,
    models::{
        project::{Category, CreateProject, Project, ProjectProgress, UpdateProject},
        role::{Role, RoleCount, RoleRecord},
        user::{
            ChangePassword, CreateUser, ForgotPasswordRequest, LoginRequest, LoginResponse,
            SessionResponse, UpdateUser, UpdateUserStatus, UserResponse,
        },
    },
    services::session_store::SessionUser,
    utils::cookies::SESSION_COOKIE_NAME,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::session,
        handlers::auth::forgot_password,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::update_user_status,
        handlers::users::change_password,
        handlers::users::delete_user,
        handlers::users::stats_by_role,
        handlers::users::list_roles,
        handlers::projects::list_categories,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::project_progress
    ),
    components(
        schemas(
            // auth
            LoginRequest,
            LoginResponse,
            SessionResponse,
            SessionUser,
            ForgotPasswordRequest,
            // users
            Role,
            RoleRecord,
            RoleCount,
            CreateUser,
            UpdateUser,
            UpdateUserStatus,
            ChangePassword,
            UserResponse,
            // projects
            Category,
            Project,
            CreateProject,
            UpdateProject,
            ProjectProgress
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "health", description = "Estado del servicio"),
        (name = "auth", description = "Inicio y cierre de sesión"),
        (name = "users", description = "Gestión de usuarios y roles"),
        (name = "projects", description = "Proyectos agrícolas")
    ),
    security(("SessionCookie" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
        );
    }
}
