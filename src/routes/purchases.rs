use axum::{routing::get, Router};

use super::not_implemented;
use crate::{error::ApiError, state::AppState};

pub fn purchases_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases).post(record_purchase))
        .route(
            "/:id",
            get(get_purchase).put(update_purchase).delete(delete_purchase),
        )
}

async fn list_purchases() -> ApiError {
    not_implemented("Get purchases")
}

async fn record_purchase() -> ApiError {
    not_implemented("Record purchase")
}

async fn get_purchase() -> ApiError {
    not_implemented("Get purchase by ID")
}

async fn update_purchase() -> ApiError {
    not_implemented("Update purchase")
}

async fn delete_purchase() -> ApiError {
    not_implemented("Delete purchase")
}
