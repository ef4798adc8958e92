use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use rolegate_application::{NewRole, RoleListQuery, UpdateRole};
use rolegate_core::{NonEmptyString, RoleId};
use rolegate_domain::RoleScope;

use super::parse_permission_codes;
use crate::actor::Actor;
use crate::dto::{
    CreateRoleRequest, RoleListParams, RoleResponse, SyncPermissionsRequest, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 50;

pub async fn create_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let input = NewRole {
        name: NonEmptyString::new(payload.name)?,
        scope: RoleScope::from_str(payload.scope.as_str())?,
        allow_override: payload.allow_override,
        description: payload.description,
    };

    let role = state.manager.create_role(actor, input).await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state.manager.get_role(RoleId::from_uuid(role_id)).await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Query(params): Query<RoleListParams>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let scope = params
        .scope
        .as_deref()
        .map(RoleScope::from_str)
        .transpose()?;

    let roles = state
        .manager
        .list_roles(RoleListQuery {
            scope,
            limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: params.offset.unwrap_or(0),
        })
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let input = UpdateRole {
        name: payload.name.map(NonEmptyString::new).transpose()?,
        allow_override: payload.allow_override,
        description: payload.description,
    };

    let role = state
        .manager
        .update_role(actor, RoleId::from_uuid(role_id), input)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(role_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .manager
        .delete_role(actor, RoleId::from_uuid(role_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn sync_role_permissions_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<SyncPermissionsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let codes = parse_permission_codes(&payload.permission_codes)?;

    let role = state
        .manager
        .sync_role_permissions(actor, RoleId::from_uuid(role_id), codes)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}
