use axum::{routing::get, Router};

use super::not_implemented;
use crate::{error::ApiError, state::AppState};

pub fn materials_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_materials).post(create_material))
        .route(
            "/:id",
            get(get_material).put(update_material).delete(delete_material),
        )
}

async fn list_materials() -> ApiError {
    not_implemented("Get materials")
}

async fn create_material() -> ApiError {
    not_implemented("Create material")
}

async fn get_material() -> ApiError {
    not_implemented("Get material by ID")
}

async fn update_material() -> ApiError {
    not_implemented("Update material")
}

async fn delete_material() -> ApiError {
    not_implemented("Delete material")
}
