use axum::{routing::get, Router};

use super::not_implemented;
use crate::{error::ApiError, state::AppState};

pub fn suppliers_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

async fn list_suppliers() -> ApiError {
    not_implemented("Get suppliers")
}

async fn create_supplier() -> ApiError {
    not_implemented("Create supplier")
}

async fn get_supplier() -> ApiError {
    not_implemented("Get supplier by ID")
}

async fn update_supplier() -> ApiError {
    not_implemented("Update supplier")
}

async fn delete_supplier() -> ApiError {
    not_implemented("Delete supplier")
}
