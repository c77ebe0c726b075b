use axum::{routing::get, Router};

use super::not_implemented;
use crate::{error::ApiError, state::AppState};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/low-stock", get(low_stock))
        .route("/recent-projects", get(recent_projects))
        .route("/material-usage", get(material_usage))
        .route("/cost-analysis", get(cost_analysis))
}

async fn stats() -> ApiError {
    not_implemented("Dashboard stats")
}

async fn low_stock() -> ApiError {
    not_implemented("Low stock alerts")
}

async fn recent_projects() -> ApiError {
    not_implemented("Recent projects")
}

async fn material_usage() -> ApiError {
    not_implemented("Material usage analytics")
}

async fn cost_analysis() -> ApiError {
    not_implemented("Cost analysis")
}
