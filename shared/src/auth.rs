//! Bearer-token authentication shared by the HTTP services.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{AccessLevel, User};
use crate::store::{StoreError, UserStore};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Administrator access required")]
    Forbidden,

    #[error("Failed to create token: {0}")]
    TokenCreation(String),

    #[error("Failed to look up caller: {0}")]
    Lookup(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::TokenCreation(_) | AuthError::Lookup(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub access_level: AccessLevel,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.access_level == AccessLevel::Admin
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 signing material, cheap to clone into router state.
#[derive(Clone)]
pub struct AuthKeys {
    inner: Arc<Keys>,
}

impl AuthKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            inner: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
        }
    }

    pub fn issue_token(&self, user: &User, ttl: Duration) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            access_level: user.access_level,
            exp: (Utc::now() + ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.inner.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.inner.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                AuthError::InvalidToken
            })
    }
}

/// Validates the bearer token and exposes its [`Claims`] as an extension.
pub async fn auth_middleware(
    State(keys): State<AuthKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let claims = keys.verify(token.trim())?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Must run inside [`auth_middleware`]. The caller's access level is read
/// from the store, so a demoted or deleted admin loses access at once.
pub async fn require_admin<S>(
    State(store): State<Arc<S>>,
    Extension(claims): Extension<Claims>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    S: UserStore,
{
    let user = match store.get_user(&claims.sub).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            warn!("Token for unknown user {} used on {}", claims.sub, req.uri());
            return Err(AuthError::InvalidToken);
        }
        Err(e) => return Err(AuthError::Lookup(e.to_string())),
    };

    if !user.is_admin() {
        warn!(
            "User {} attempted admin route {} {}",
            claims.sub,
            req.method(),
            req.uri()
        );
        return Err(AuthError::Forbidden);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::demo_users;
    use crate::store::memory::InMemoryUserStore;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn admin_only(store: Arc<InMemoryUserStore>) -> Router {
        let keys = AuthKeys::new(b"secret");
        Router::new()
            .route("/admin", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                store,
                require_admin::<InMemoryUserStore>,
            ))
            .layer(middleware::from_fn_with_state(keys, auth_middleware))
    }

    fn request_as(user: &User) -> Request {
        let token = AuthKeys::new(b"secret")
            .issue_token(user, Duration::hours(1))
            .unwrap();
        http::Request::builder()
            .uri("/admin")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn admin_check_uses_the_stored_access_level() {
        let store = Arc::new(InMemoryUserStore::with_demo_users());
        let app = admin_only(Arc::clone(&store));
        let admin = demo_users().remove(0);

        let response = app.clone().oneshot(request_as(&admin)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut demoted = store.get_user("1").await.unwrap();
        demoted.access_level = AccessLevel::User;
        store.update_user(demoted).await.unwrap();

        let response = app.clone().oneshot(request_as(&admin)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        store.delete_user(&admin.id).await.unwrap();
        let response = app.oneshot(request_as(&admin)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn issued_token_verifies() {
        let keys = AuthKeys::new(b"secret");
        let admin = &demo_users()[0];

        let token = keys.issue_token(admin, Duration::hours(1)).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, "1");
        assert!(claims.is_admin());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = AuthKeys::new(b"one")
            .issue_token(&demo_users()[1], Duration::hours(1))
            .unwrap();

        assert!(matches!(
            AuthKeys::new(b"two").verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = AuthKeys::new(b"secret");
        let token = keys
            .issue_token(&demo_users()[1], Duration::hours(-2))
            .unwrap();

        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken)));
    }
}
