use axum::Json;
use axum::extract::State;

use crate::dto::PermissionCatalogResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<PermissionCatalogResponse>> {
    let permission_codes = state
        .manager
        .list_permission_codes()
        .await?
        .into_iter()
        .map(String::from)
        .collect();

    Ok(Json(PermissionCatalogResponse { permission_codes }))
}
