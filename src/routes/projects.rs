use axum::{
    routing::{get, post},
    Router,
};

use super::not_implemented;
use crate::{error::ApiError, state::AppState};

pub fn projects_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/:id/materials", post(add_project_material))
}

async fn list_projects() -> ApiError {
    not_implemented("Get projects")
}

async fn create_project() -> ApiError {
    not_implemented("Create project")
}

async fn get_project() -> ApiError {
    not_implemented("Get project by ID")
}

async fn update_project() -> ApiError {
    not_implemented("Update project")
}

async fn delete_project() -> ApiError {
    not_implemented("Delete project")
}

async fn add_project_material() -> ApiError {
    not_implemented("Add material to project")
}
