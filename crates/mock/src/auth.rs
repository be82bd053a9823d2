//! Bearer authentication middleware for the mock API

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::store::SharedStore;

/// Extension that holds the authenticated caller
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub token: String,
}

/// Resolve an `Authorization` header to the caller
pub fn auth_extractor(
    store: &SharedStore,
    auth_header: Option<&str>,
) -> Result<AuthenticatedUser, (StatusCode, &'static str)> {
    let token = auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or((StatusCode::UNAUTHORIZED, "Please authenticate."))?;

    let user_id = store
        .read()
        .authenticate(token)
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Please authenticate."))?;

    Ok(AuthenticatedUser {
        user_id,
        token: token.to_string(),
    })
}

/// Middleware that rejects the request before any handler runs
pub async fn require_auth(
    State(store): State<SharedStore>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_extractor(&store, auth_header) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err((status, msg)) => (status, Json(serde_json::json!({ "error": msg }))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Store, UserInput};

    #[test]
    fn rejects_missing_malformed_and_unknown_tokens() {
        let store = Store::shared();
        for header in [None, Some("Token abc"), Some("Bearer "), Some("Bearer invalid-token")] {
            let err = auth_extractor(&store, header).unwrap_err();
            assert_eq!(err.0, StatusCode::UNAUTHORIZED, "header {:?}", header);
        }
    }

    #[test]
    fn accepts_a_live_session() {
        let store = Store::shared();
        let (user, token) = store
            .write()
            .register(UserInput {
                first_name: Some("A".into()),
                last_name: Some("B".into()),
                email: Some("ab@example.com".into()),
                password: Some("longenough".into()),
            })
            .unwrap();

        let header = format!("Bearer {}", token);
        let caller = auth_extractor(&store, Some(&header)).unwrap();
        assert_eq!(caller.user_id, user.id);
        assert_eq!(caller.token, token);
    }
}
