use axum::{middleware::from_fn_with_state, Router};

use crate::{auth::authenticate, error::ApiError, state::AppState};

pub mod admin;
pub mod dashboard;
pub mod index;
pub mod materials;
pub mod projects;
pub mod purchases;
pub mod suppliers;

pub(crate) fn not_implemented(endpoint: &str) -> ApiError {
    ApiError::NotImplemented(format!("{endpoint} endpoint not implemented yet"))
}

/// Every `/api` route except `/api/auth`, all behind required authentication.
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/materials", materials::materials_routes())
        .nest("/projects", projects::projects_routes())
        .nest("/suppliers", suppliers::suppliers_routes())
        .nest("/purchases", purchases::purchases_routes())
        .nest("/dashboard", dashboard::dashboard_routes())
        .nest("/admin", admin::admin_routes())
        .route_layer(from_fn_with_state(state, authenticate))
}
