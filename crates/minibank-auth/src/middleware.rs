//! Account authorization middleware for Axum

use axum::{
    extract::{Path, Request, State, rejection::PathRejection},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use minibank_db::{Account, AccountStore};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AuthError, DenyReason};
use crate::jwt::TokenService;

/// Header carrying the bearer token
pub const TOKEN_HEADER: &str = "x-jwt-token";

/// Account that passed the guard, available to handlers via request extensions
#[derive(Debug, Clone)]
pub struct AuthorizedAccount(pub Account);

/// Binds a bearer token to the account named in the request path
#[derive(Clone)]
pub struct AccessGuard {
    tokens: Arc<TokenService>,
    store: Arc<dyn AccountStore>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn AccountStore>) -> Self {
        Self { tokens, store }
    }

    /// Decide whether `token` grants access to the account with id `raw_id`
    pub async fn authorize(&self, token: Option<&str>, raw_id: &str) -> Result<Account, AuthError> {
        let token = token.ok_or(AuthError::PermissionDenied(DenyReason::MissingToken))?;

        let claims = self.tokens.validate(token).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::PermissionDenied(DenyReason::InvalidToken)
        })?;

        let id: i64 = raw_id
            .parse()
            .map_err(|_| AuthError::PermissionDenied(DenyReason::MalformedId))?;

        let account = self.store.get_account_by_id(id).await.map_err(|e| {
            debug!("Account lookup for id {} failed: {}", id, e);
            AuthError::PermissionDenied(DenyReason::AccountUnavailable)
        })?;

        if account.number != claims.account_number {
            return Err(AuthError::PermissionDenied(DenyReason::ClaimMismatch));
        }

        Ok(account)
    }
}

/// Extract bearer token from authorization header
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::PermissionDenied(DenyReason::MissingToken))
}

/// Token from `x-jwt-token`, falling back to `Authorization: Bearer`
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| extract_bearer_token(h).ok())
        })?
        .trim();

    (!token.is_empty()).then(|| token.to_string())
}

/// Account guard middleware
///
/// Must be installed with `route_layer` on routes with a single `{id}` path
/// parameter. On success the resolved account is added to request
/// extensions as [`AuthorizedAccount`]; every failure yields the same
/// permission-denied response.
pub async fn account_guard(
    State(guard): State<AccessGuard>,
    path: Result<Path<String>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let raw_id = path.map(|Path(id)| id).unwrap_or_default();
    let token = extract_token(request.headers());

    let account = guard
        .authorize(token.as_deref(), &raw_id)
        .await
        .inspect_err(|e| debug!("Access to account '{}' denied: {}", raw_id, e))?;

    debug!("Authorized account {} for {}", account.id, request.uri().path());

    request.extensions_mut().insert(AuthorizedAccount(account));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use minibank_db::{DbError, MemoryStore, NewAccount};
    use tower::ServiceExt;

    /// Store whose every call fails like a dropped connection
    struct FailingStore;

    #[async_trait]
    impl AccountStore for FailingStore {
        async fn create_account(&self, _: NewAccount) -> Result<Account, DbError> {
            Err(DbError::Connection(sqlx::Error::PoolClosed))
        }
        async fn get_account_by_id(&self, _: i64) -> Result<Account, DbError> {
            Err(DbError::Connection(sqlx::Error::PoolClosed))
        }
        async fn get_account_by_username(&self, _: &str) -> Result<Account, DbError> {
            Err(DbError::Connection(sqlx::Error::PoolClosed))
        }
        async fn get_account_by_number(&self, _: i64) -> Result<Option<Account>, DbError> {
            Err(DbError::Connection(sqlx::Error::PoolClosed))
        }
        async fn update_account(&self, _: &Account) -> Result<(), DbError> {
            Err(DbError::Connection(sqlx::Error::PoolClosed))
        }
        async fn delete_account(&self, _: i64) -> Result<(), DbError> {
            Err(DbError::Connection(sqlx::Error::PoolClosed))
        }
        async fn get_accounts(&self) -> Result<Vec<Account>, DbError> {
            Err(DbError::Connection(sqlx::Error::PoolClosed))
        }
    }

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new("guard-test-secret", Duration::hours(1)).unwrap())
    }

    async fn seed(store: &MemoryStore, username: &str, number: i64) -> Account {
        store
            .create_account(NewAccount {
                first_name: username.to_string(),
                last_name: "Test".to_string(),
                username: username.to_string(),
                email: format!("{}@example.com", username),
                number,
                password_hash: String::new(),
                balance: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap()
    }

    async fn fixture() -> (AccessGuard, Arc<TokenService>, Account, Account) {
        let store = Arc::new(MemoryStore::new());
        let alice = seed(&store, "alice", 11111).await;
        let bob = seed(&store, "bob", 22222).await;
        let tokens = tokens();
        (AccessGuard::new(tokens.clone(), store), tokens, alice, bob)
    }

    fn denied(result: Result<Account, AuthError>) -> DenyReason {
        match result {
            Err(AuthError::PermissionDenied(reason)) => reason,
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_owner_is_allowed() {
        let (guard, tokens, alice, _) = fixture().await;
        let token = tokens.issue(&alice).unwrap();

        let account = guard.authorize(Some(&token), &alice.id.to_string()).await.unwrap();
        assert_eq!(account.id, alice.id);
    }

    #[tokio::test]
    async fn test_missing_token_is_denied() {
        let (guard, _, alice, _) = fixture().await;

        let reason = denied(guard.authorize(None, &alice.id.to_string()).await);
        assert_eq!(reason, DenyReason::MissingToken);
    }

    #[tokio::test]
    async fn test_invalid_token_is_denied() {
        let (guard, _, alice, _) = fixture().await;

        let reason = denied(guard.authorize(Some("garbage"), &alice.id.to_string()).await);
        assert_eq!(reason, DenyReason::InvalidToken);

        let foreign = TokenService::new("other-secret", Duration::hours(1))
            .unwrap()
            .issue(&alice)
            .unwrap();
        let reason = denied(guard.authorize(Some(&foreign), &alice.id.to_string()).await);
        assert_eq!(reason, DenyReason::InvalidToken);
    }

    #[tokio::test]
    async fn test_expired_token_is_denied() {
        let (guard, _, alice, _) = fixture().await;
        let expired = TokenService::new("guard-test-secret", Duration::seconds(-60))
            .unwrap()
            .issue(&alice)
            .unwrap();

        let reason = denied(guard.authorize(Some(&expired), &alice.id.to_string()).await);
        assert_eq!(reason, DenyReason::InvalidToken);
    }

    #[tokio::test]
    async fn test_malformed_id_is_denied() {
        let (guard, tokens, alice, _) = fixture().await;
        let token = tokens.issue(&alice).unwrap();

        for raw in ["abc", "", "1.5", "99999999999999999999"] {
            let reason = denied(guard.authorize(Some(&token), raw).await);
            assert_eq!(reason, DenyReason::MalformedId, "id {:?}", raw);
        }
    }

    #[tokio::test]
    async fn test_unknown_account_is_denied() {
        let (guard, tokens, alice, _) = fixture().await;
        let token = tokens.issue(&alice).unwrap();

        let reason = denied(guard.authorize(Some(&token), "4040").await);
        assert_eq!(reason, DenyReason::AccountUnavailable);
    }

    #[tokio::test]
    async fn test_store_failure_is_denied() {
        let tokens = tokens();
        let guard = AccessGuard::new(tokens.clone(), Arc::new(FailingStore));
        let token = tokens
            .issue(&Account {
                id: 1,
                first_name: String::new(),
                last_name: String::new(),
                username: "alice".to_string(),
                email: String::new(),
                number: 11111,
                password_hash: String::new(),
                balance: 0,
                created_at: Utc::now(),
            })
            .unwrap();

        let reason = denied(guard.authorize(Some(&token), "1").await);
        assert_eq!(reason, DenyReason::AccountUnavailable);
    }

    #[tokio::test]
    async fn test_other_accounts_token_is_denied() {
        let (guard, tokens, alice, bob) = fixture().await;
        let bobs_token = tokens.issue(&bob).unwrap();

        let reason = denied(guard.authorize(Some(&bobs_token), &alice.id.to_string()).await);
        assert_eq!(reason, DenyReason::ClaimMismatch);
    }

    #[test]
    fn test_extract_token_prefers_custom_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer from-bearer".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("from-bearer"));

        headers.insert(TOKEN_HEADER, "from-header".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(extract_token(&headers), None);

        headers.insert(TOKEN_HEADER, "  ".parse().unwrap());
        assert_eq!(extract_token(&headers), None);
    }

    async fn whoami(Extension(AuthorizedAccount(account)): Extension<AuthorizedAccount>) -> String {
        account.username
    }

    fn app(guard: AccessGuard) -> Router {
        Router::new()
            .route("/account/{id}", get(whoami))
            .route_layer(from_fn_with_state(guard, account_guard))
    }

    async fn call(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_middleware_passes_account_to_handler() {
        let (guard, tokens, alice, _) = fixture().await;
        let token = tokens.issue(&alice).unwrap();

        let uri = format!("/account/{}", alice.id);
        let (status, body) = call(app(guard), &uri, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice");
    }

    #[tokio::test]
    async fn test_middleware_denials_are_uniform() {
        let (guard, tokens, alice, bob) = fixture().await;
        let bobs_token = tokens.issue(&bob).unwrap();
        let alices_token = tokens.issue(&alice).unwrap();

        let cases = [
            (format!("/account/{}", alice.id), None),
            (format!("/account/{}", alice.id), Some("garbage".to_string())),
            ("/account/not-a-number".to_string(), Some(alices_token.clone())),
            ("/account/4040".to_string(), Some(alices_token)),
            (format!("/account/{}", alice.id), Some(bobs_token)),
        ];

        for (uri, token) in cases {
            let (status, body) = call(app(guard.clone()), &uri, token.as_deref()).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
            assert_eq!(body, r#"{"error":"permission denied"}"#, "{}", uri);
        }
    }
}
