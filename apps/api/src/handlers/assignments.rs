use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use rolegate_core::{AppError, ProjectId, RoleId, UserId};

use crate::actor::Actor;
use crate::dto::AssignRoleRequest;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn assign_system_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .manager
        .assign_system_role(
            actor,
            UserId::from_uuid(payload.user_id),
            RoleId::from_uuid(payload.role_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_custom_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .manager
        .assign_custom_role(
            actor,
            UserId::from_uuid(payload.user_id),
            RoleId::from_uuid(payload.role_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_project_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    let project_id = required_project_id(payload.project_id)?;

    state
        .manager
        .assign_project_role(
            actor,
            UserId::from_uuid(payload.user_id),
            RoleId::from_uuid(payload.role_id),
            project_id,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_system_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .manager
        .unassign_system_role(
            actor,
            UserId::from_uuid(payload.user_id),
            RoleId::from_uuid(payload.role_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_custom_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .manager
        .unassign_custom_role(
            actor,
            UserId::from_uuid(payload.user_id),
            RoleId::from_uuid(payload.role_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_project_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    let project_id = required_project_id(payload.project_id)?;

    state
        .manager
        .unassign_project_role(
            actor,
            UserId::from_uuid(payload.user_id),
            RoleId::from_uuid(payload.role_id),
            project_id,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn required_project_id(value: Option<Uuid>) -> Result<ProjectId, AppError> {
    value.map(ProjectId::from_uuid).ok_or_else(|| {
        AppError::Validation("project_id is required for project-scope assignments".to_owned())
    })
}
