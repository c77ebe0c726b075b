use axum::{extract::State, http::Uri, Json};
use serde::Serialize;
use serde_json::{json, Value};
use time::OffsetDateTime;

use crate::{
    auth::{MaybeUser, SafeUser},
    error::{ApiError, ApiResponse},
    state::AppState,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct Welcome {
    pub message: &'static str,
    pub version: &'static str,
    pub documentation: &'static str,
    pub endpoints: Value,
    pub user: Option<SafeUser>,
}

/// API index. Runs behind the optional authentication layer and echoes the
/// caller when a valid token was sent.
pub async fn root(MaybeUser(user): MaybeUser) -> Json<ApiResponse<Welcome>> {
    ApiResponse::ok(Welcome {
        message: "Welcome to Trossets Material Tracker API",
        version: VERSION,
        documentation: "/api-docs",
        endpoints: json!({
            "auth": "/api/auth",
            "materials": "/api/materials",
            "projects": "/api/projects",
            "suppliers": "/api/suppliers",
            "purchases": "/api/purchases",
            "dashboard": "/api/dashboard",
        }),
        user,
    })
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub version: &'static str,
    pub environment: String,
}

pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<Health>> {
    ApiResponse::ok(Health {
        status: "ok",
        timestamp: OffsetDateTime::now_utc(),
        version: VERSION,
        environment: state.config.environment.clone(),
    })
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {} not found", uri.path()))
}
