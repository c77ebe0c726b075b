use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};

use super::{
    dto::SafeUser,
    extractors::CurrentUser,
    jwt::{extract_token_from_header, TokenError},
    safe_user::create_safe_user,
};
use crate::{error::ApiError, state::AppState, users::Role};

const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing access token";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no bearer credential")]
    MissingCredential,
    #[error("malformed Authorization header")]
    InvalidCredentialFormat,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("token subject no longer exists")]
    UnknownUser,
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient permissions")]
    Forbidden,
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Forbidden => ApiError::Forbidden("Insufficient permissions".into()),
            AuthError::Unauthenticated => {
                ApiError::Unauthorized("Authentication required".into())
            }
            // every credential failure looks the same to the caller
            _ => ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.into()),
        }
    }
}

/// Extracts the bearer token, verifies it and loads the user it names.
pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<SafeUser, AuthError> {
    let header = match headers.get(AUTHORIZATION) {
        None => return Err(AuthError::MissingCredential),
        Some(v) => v.to_str().map_err(|_| AuthError::InvalidCredentialFormat)?,
    };
    let token = extract_token_from_header(Some(header)).ok_or(AuthError::InvalidCredentialFormat)?;
    let claims = state.keys.verify_token(token)?;

    match state.users.find_by_id(claims.user_id).await {
        Ok(Some(user)) => Ok(create_safe_user(&user)),
        Ok(None) => Err(AuthError::UnknownUser),
        Err(e) => {
            error!(error = %e, user_id = %claims.user_id, "user lookup failed during authentication");
            Err(AuthError::UnknownUser)
        }
    }
}

/// Required-mode gate: rejects with 401 unless the request carries a valid
/// token for an existing user.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match resolve_user(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        Err(reason) => {
            warn!(%reason, "authentication rejected");
            Err(reason.into())
        }
    }
}

/// Optional-mode gate: attaches the user when the credential checks out and
/// otherwise continues anonymously. Never rejects.
pub async fn optional_authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
        }
        Err(AuthError::MissingCredential) => {}
        Err(reason) => {
            debug!(%reason, "optional authentication failed; continuing anonymously");
        }
    }
    next.run(request).await
}

/// Role set a route requires. Build with [`authorize`] and mount with
/// `middleware::from_fn_with_state(authorize(&[Role::Admin]), require_roles)`
/// inside the authentication layer.
#[derive(Debug, Clone)]
pub struct RequiredRoles(Arc<[Role]>);

pub fn authorize(roles: &[Role]) -> RequiredRoles {
    RequiredRoles(roles.into())
}

pub fn check_roles(required: &[Role], user: Option<&SafeUser>) -> Result<(), AuthError> {
    let user = user.ok_or(AuthError::Unauthenticated)?;
    if required.contains(&user.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

pub async fn require_roles(
    State(required): State<RequiredRoles>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request.extensions().get::<CurrentUser>().map(|u| &u.0);
    if let Err(reason) = check_roles(&required.0, user) {
        warn!(%reason, required = ?required.0, "authorization rejected");
        return Err(reason.into());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Json, Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        auth::extractors::MaybeUser,
        users::{MemoryUserStore, NewUser, UserStore},
    };

    async fn seed_user(store: &MemoryUserStore, email: &str, role: Role) -> SafeUser {
        let user = store
            .create(NewUser {
                email: email.into(),
                password_hash: "unused".into(),
                first_name: "Test".into(),
                last_name: "User".into(),
                role,
            })
            .await
            .unwrap();
        create_safe_user(&user)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    fn get_request(uri: &str, auth: Option<String>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn expired_token(state: &AppState, user: &SafeUser) -> String {
        let now = time::OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = crate::auth::claims::Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            iss: state.config.jwt.issuer.clone(),
            iat: now - 7200,
            exp: now - 3600,
        };
        state.keys.encode(&claims).unwrap()
    }

    fn required_app(state: AppState, called: Arc<AtomicBool>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move |CurrentUser(user): CurrentUser| {
                    let called = called.clone();
                    async move {
                        called.store(true, Ordering::SeqCst);
                        Json(user)
                    }
                }),
            )
            .route_layer(from_fn_with_state(state.clone(), authenticate))
            .with_state(state)
    }

    fn optional_app(state: AppState) -> Router {
        Router::new()
            .route(
                "/maybe",
                get(|MaybeUser(user): MaybeUser| async move {
                    Json(user.map(|u| u.email))
                }),
            )
            .route_layer(from_fn_with_state(state.clone(), optional_authenticate))
            .with_state(state)
    }

    fn admin_app(state: AppState) -> Router {
        Router::new()
            .route("/admin", get(|| async { "welcome" }))
            .route_layer(from_fn_with_state(authorize(&[Role::Admin]), require_roles))
            .route_layer(from_fn_with_state(state.clone(), authenticate))
            .with_state(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn required_without_header_is_unauthorized_and_skips_handler() {
        let state = AppState::fake();
        let called = Arc::new(AtomicBool::new(false));
        let app = required_app(state, called.clone());

        let response = app.oneshot(get_request("/protected", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!called.load(Ordering::SeqCst));
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn required_with_valid_token_attaches_user() {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::with_store(store.clone());
        let user = seed_user(&store, "ada@example.com", Role::User).await;
        let token = state.keys.generate_tokens(&user).unwrap().access_token;
        let called = Arc::new(AtomicBool::new(false));
        let app = required_app(state, called.clone());

        let response = app
            .oneshot(get_request("/protected", Some(bearer(&token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(called.load(Ordering::SeqCst));
        let json = body_json(response).await;
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn required_failures_share_one_response() {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::with_store(store.clone());
        let user = seed_user(&store, "gone@example.com", Role::User).await;
        let stale = state.keys.generate_tokens(&user).unwrap().access_token;
        store.remove(user.id).await;
        let expired = expired_token(&state, &user);

        let headers = [
            None,
            Some("Basic abc".to_string()),
            Some(bearer("not-a-jwt")),
            Some(bearer(&expired)),
            Some(bearer(&stale)),
        ];
        let mut bodies = Vec::new();
        for header in headers {
            let called = Arc::new(AtomicBool::new(false));
            let app = required_app(state.clone(), called.clone());
            let response = app
                .oneshot(get_request("/protected", header))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(!called.load(Ordering::SeqCst));
            bodies.push(body_json(response).await);
        }
        assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn resolve_user_reports_specific_reason() {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::with_store(store.clone());
        let user = seed_user(&store, "ada@example.com", Role::User).await;

        let mut headers = HeaderMap::new();
        assert_eq!(
            resolve_user(&state, &headers).await,
            Err(AuthError::MissingCredential)
        );

        headers.insert(AUTHORIZATION, "Token abc".parse().unwrap());
        assert_eq!(
            resolve_user(&state, &headers).await,
            Err(AuthError::InvalidCredentialFormat)
        );

        headers.insert(AUTHORIZATION, bearer("abc").parse().unwrap());
        assert_eq!(resolve_user(&state, &headers).await, Err(AuthError::InvalidToken));

        headers.insert(AUTHORIZATION, bearer(&expired_token(&state, &user)).parse().unwrap());
        assert_eq!(resolve_user(&state, &headers).await, Err(AuthError::ExpiredToken));

        let ghost = SafeUser {
            id: Uuid::new_v4(),
            ..user.clone()
        };
        let ghost_token = state.keys.generate_tokens(&ghost).unwrap().access_token;
        headers.insert(AUTHORIZATION, bearer(&ghost_token).parse().unwrap());
        assert_eq!(resolve_user(&state, &headers).await, Err(AuthError::UnknownUser));

        let token = state.keys.generate_tokens(&user).unwrap().access_token;
        headers.insert(AUTHORIZATION, bearer(&token).parse().unwrap());
        assert_eq!(resolve_user(&state, &headers).await, Ok(user));
    }

    #[tokio::test]
    async fn optional_with_expired_token_continues_anonymously() {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::with_store(store.clone());
        let user = seed_user(&store, "ada@example.com", Role::User).await;
        let expired = expired_token(&state, &user);

        let response = optional_app(state)
            .oneshot(get_request("/maybe", Some(bearer(&expired))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn optional_never_rejects_and_attaches_valid_user() {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::with_store(store.clone());
        let user = seed_user(&store, "ada@example.com", Role::User).await;
        let token = state.keys.generate_tokens(&user).unwrap().access_token;

        for header in [None, Some("garbage".to_string()), Some(bearer("x.y.z"))] {
            let response = optional_app(state.clone())
                .oneshot(get_request("/maybe", header))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await, serde_json::Value::Null);
        }

        let response = optional_app(state)
            .oneshot(get_request("/maybe", Some(bearer(&token))))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, "ada@example.com");
    }

    #[tokio::test]
    async fn admin_route_forbids_plain_users() {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::with_store(store.clone());
        let user = seed_user(&store, "user@example.com", Role::User).await;
        let admin = seed_user(&store, "admin@example.com", Role::Admin).await;
        let user_token = state.keys.generate_tokens(&user).unwrap().access_token;
        let admin_token = state.keys.generate_tokens(&admin).unwrap().access_token;

        let response = admin_app(state.clone())
            .oneshot(get_request("/admin", Some(bearer(&user_token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = admin_app(state.clone())
            .oneshot(get_request("/admin", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = admin_app(state)
            .oneshot(get_request("/admin", Some(bearer(&admin_token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn check_roles_decisions() {
        let user = SafeUser {
            id: Uuid::new_v4(),
            email: "u@example.com".into(),
            first_name: "U".into(),
            last_name: "Ser".into(),
            role: Role::User,
        };
        assert_eq!(check_roles(&[Role::Admin], None), Err(AuthError::Unauthenticated));
        assert_eq!(check_roles(&[Role::Admin], Some(&user)), Err(AuthError::Forbidden));
        assert_eq!(check_roles(&[Role::User, Role::Admin], Some(&user)), Ok(()));
        assert_eq!(check_roles(&[], Some(&user)), Err(AuthError::Forbidden));
    }

    #[tokio::test]
    async fn role_gate_without_authentication_layer_is_unauthorized() {
        let app: Router = Router::new()
            .route("/admin", get(|| async { "welcome" }))
            .route_layer(from_fn_with_state(authorize(&[Role::Admin]), require_roles));

        let response = app.oneshot(get_request("/admin", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
