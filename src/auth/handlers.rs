use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, SafeUser},
        extractors::{CurrentUser, JsonBody},
        middleware::authenticate,
        services::{login_user, register_user},
        validation::{validate_login, validate_registration},
    },
    error::{ApiError, ApiResponse},
    state::AppState,
};

/// `/register` and `/login` are public; `/logout` and `/me` sit behind the
/// authentication layer.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_me))
        .route_layer(from_fn_with_state(state, authenticate))
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let input = validate_registration(payload)?;
    let response = register_user(&state, input).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(response)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let input = validate_login(payload)?;
    let response = login_user(&state, input).await?;
    Ok(ApiResponse::ok(response))
}

/// Tokens are stateless, so logging out is the client dropping its token.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(CurrentUser(user): CurrentUser) -> Json<ApiResponse<MessageResponse>> {
    info!("user logged out");
    ApiResponse::ok(MessageResponse {
        message: "Logged out successfully",
    })
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<SafeUser>> {
    ApiResponse::ok(user)
}
