use axum::{extract::State, middleware::from_fn_with_state, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::{authorize, create_safe_user, require_roles, CurrentUser, SafeUser},
    error::{ApiError, ApiResponse},
    state::AppState,
    users::Role,
};

/// Admin-only routes. The caller must already be authenticated; the role
/// gate here only checks the attached user.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route_layer(from_fn_with_state(authorize(&[Role::Admin]), require_roles))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
async fn list_users(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
) -> Result<Json<ApiResponse<Vec<SafeUser>>>, ApiError> {
    let users = state
        .users
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    info!(count = users.len(), "listed users");
    Ok(ApiResponse::ok(users.iter().map(create_safe_user).collect()))
}
