use tracing::{info, warn};

use super::{
    dto::{AuthResponse, Credentials, Registration},
    safe_user::create_safe_user,
};
use crate::{
    error::ApiError,
    state::AppState,
    users::{NewUser, Role, StoreError, UserUpdate},
};

const DUPLICATE_EMAIL: &str = "User with this email already exists";
const BAD_CREDENTIALS: &str = "Invalid email or password";

fn store_failure(e: StoreError) -> ApiError {
    match e {
        StoreError::DuplicateEmail => ApiError::Conflict(DUPLICATE_EMAIL.into()),
        other => ApiError::Internal(other.into()),
    }
}

pub async fn register_user(state: &AppState, input: Registration) -> Result<AuthResponse, ApiError> {
    if state
        .users
        .find_by_email(&input.email)
        .await
        .map_err(store_failure)?
        .is_some()
    {
        warn!(email = %input.email, "email already registered");
        return Err(ApiError::Conflict(DUPLICATE_EMAIL.into()));
    }

    let password_hash = state
        .hasher
        .hash_password(input.password)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    // the store's unique constraint still catches a concurrent registration
    let user = state
        .users
        .create(NewUser {
            email: input.email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            role: Role::User,
        })
        .await
        .map_err(store_failure)?;

    let safe_user = create_safe_user(&user);
    let tokens = state
        .keys
        .generate_tokens(&safe_user)
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(AuthResponse {
        user: safe_user,
        tokens,
    })
}

pub async fn login_user(state: &AppState, input: Credentials) -> Result<AuthResponse, ApiError> {
    let user = match state
        .users
        .find_by_email(&input.email)
        .await
        .map_err(store_failure)?
    {
        Some(u) => u,
        None => {
            state
                .hasher
                .compare_password_unknown_account(input.password)
                .await;
            warn!(email = %input.email, "login unknown email");
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
        }
    };

    if !state
        .hasher
        .compare_password(input.password, user.password_hash.clone())
        .await
    {
        warn!(email = %input.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    // record the login
    let user = state
        .users
        .update(user.id, UserUpdate::default())
        .await
        .map_err(store_failure)?;

    let safe_user = create_safe_user(&user);
    let tokens = state
        .keys
        .generate_tokens(&safe_user)
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(AuthResponse {
        user: safe_user,
        tokens,
    })
}
