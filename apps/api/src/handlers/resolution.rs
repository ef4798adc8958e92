use axum::Json;
use axum::extract::{Query, State};

use rolegate_core::{ProjectId, UserId};

use crate::dto::{EffectivePermissionsResponse, ResolveParams};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn effective_permissions_handler(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let effective = state
        .resolver
        .resolve(
            UserId::from_uuid(params.user_id),
            params.project_id.map(ProjectId::from_uuid),
        )
        .await?;

    Ok(Json(EffectivePermissionsResponse::new(
        params.user_id,
        params.project_id,
        &effective,
    )))
}
