//! Rolegate API composition root.

#![forbid(unsafe_code)]

mod actor;
mod api_config;
mod dto;
mod error;
mod handlers;
mod state;

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use rolegate_application::{
    AssignmentRepository, EventPublisher, RbacManager, RbacResolver, RoleRepository,
    UserDirectory,
};
use rolegate_core::AppError;
use rolegate_infrastructure::{
    PostgresRbacRepository, PostgresUserDirectory, TracingEventPublisher,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    let repository = Arc::new(PostgresRbacRepository::new(pool.clone()));
    let roles: Arc<dyn RoleRepository> = repository.clone();
    let assignments: Arc<dyn AssignmentRepository> = repository;
    let directory: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool));
    let publisher: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher::new());

    let app_state = AppState {
        manager: RbacManager::new(roles, assignments.clone(), publisher),
        resolver: RbacResolver::new(assignments, directory),
    };

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/rbac/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/rbac/roles/{role_id}",
            get(handlers::roles::get_role_handler)
                .put(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/rbac/roles/{role_id}/permissions:sync",
            post(handlers::roles::sync_role_permissions_handler),
        )
        .route(
            "/rbac/assign/system",
            post(handlers::assignments::assign_system_role_handler),
        )
        .route(
            "/rbac/assign/custom",
            post(handlers::assignments::assign_custom_role_handler),
        )
        .route(
            "/rbac/assign/project",
            post(handlers::assignments::assign_project_role_handler),
        )
        .route(
            "/rbac/unassign/system",
            post(handlers::assignments::unassign_system_role_handler),
        )
        .route(
            "/rbac/unassign/custom",
            post(handlers::assignments::unassign_custom_role_handler),
        )
        .route(
            "/rbac/unassign/project",
            post(handlers::assignments::unassign_project_role_handler),
        )
        .route(
            "/rbac/effective-permissions",
            get(handlers::resolution::effective_permissions_handler),
        )
        .route(
            "/rbac/permissions",
            get(handlers::permissions::list_permissions_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let host = IpAddr::from_str(&config.host).map_err(|error| {
        AppError::Internal(format!("invalid API_HOST '{}': {error}", config.host))
    })?;
    let address = SocketAddr::from((host, config.port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "rolegate-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
