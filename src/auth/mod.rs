use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
mod safe_user;
pub mod services;
pub mod validation;

pub use claims::Claims;
pub use dto::{AuthResponse, AuthTokens, SafeUser};
pub use extractors::{CurrentUser, MaybeUser};
pub use jwt::{extract_token_from_header, JwtKeys, TokenError};
pub use middleware::{
    authenticate, authorize, check_roles, optional_authenticate, require_roles, AuthError,
    RequiredRoles,
};
pub use password::{Hasher, PasswordError};
pub use safe_user::create_safe_user;

pub fn router(state: AppState) -> Router<AppState> {
    handlers::auth_routes(state)
}
