//! Authenticated HTTP client for the Contact List REST API
//!
//! Every call resolves to an [`ApiResponse`] whatever the status code, so
//! negative scenarios can assert on 400/401/404 directly. Only a failure to
//! complete the exchange at all surfaces as [`E2eError::Transport`].

use std::time::Duration;

use contactlist_common::{
    AuthPayload, Credentials, E2eError, E2eResult, SessionToken, User, UserFixture, UserUpdate,
};
use futures::future::join_all;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// One request in a fan-out
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Fail with an assertion error unless the status is `expected`
    pub fn expect_status(&self, expected: u16) -> E2eResult<&Self> {
        if self.status() == expected {
            Ok(self)
        } else {
            Err(E2eError::assertion(
                format!("status of {} (body {:?})", self.label(), snippet(&self.text())),
                expected,
                self.status(),
            ))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            E2eError::assertion(
                format!("body of {}", self.label()),
                std::any::type_name::<T>(),
                e.to_string(),
            )
        })
    }

    pub fn json_value(&self) -> E2eResult<Value> {
        self.json()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Value at a dotted path such as `user._id`, if the body is JSON and has it
    pub fn field(&self, path: &str) -> Option<Value> {
        let root: Value = serde_json::from_slice(&self.body).ok()?;
        path.split('.')
            .try_fold(&root, |node, key| node.get(key))
            .cloned()
    }

    pub fn has_field(&self, path: &str) -> bool {
        self.field(path).is_some()
    }

    /// String value at `path`, as an assertion failure when missing
    pub fn str_field(&self, path: &str) -> E2eResult<String> {
        match self.field(path) {
            Some(Value::String(s)) => Ok(s),
            other => Err(E2eError::assertion(
                format!("{} in body of {}", path, self.label()),
                "a string",
                other,
            )),
        }
    }
}

fn snippet(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(120)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}

/// Thin wrapper over `reqwest::Client` bound to one base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> E2eResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request, attaching `Authorization: Bearer` only when a token is given
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&SessionToken>,
    ) -> E2eResult<ApiResponse> {
        let header = token.map(SessionToken::bearer);
        self.request_with_header(method, path, body, header.as_deref())
            .await
    }

    /// Issue a request with a raw `Authorization` header value
    pub async fn request_with_header(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        authorization: Option<&str>,
    ) -> E2eResult<ApiResponse> {
        let mut req = self.http.request(method.clone(), self.url(path));
        if let Some(value) = authorization {
            req = req.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        debug!(%method, path, status = status.as_u16(), "api call");

        Ok(ApiResponse {
            method,
            path: path.to_string(),
            status,
            body: bytes.to_vec(),
        })
    }

    /// Dispatch independent requests concurrently; results keep input order
    pub async fn request_all(
        &self,
        endpoints: &[Endpoint],
        authorization: Option<&str>,
    ) -> Vec<E2eResult<ApiResponse>> {
        join_all(endpoints.iter().map(|e| {
            self.request_with_header(e.method.clone(), &e.path, e.body.as_ref(), authorization)
        }))
        .await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &T,
        token: Option<&SessionToken>,
    ) -> E2eResult<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.request(method, path, Some(&body), token).await
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn register<T: Serialize + ?Sized>(&self, user: &T) -> E2eResult<ApiResponse> {
        self.send_json(Method::POST, "/users", user, None).await
    }

    pub async fn login(&self, credentials: &Credentials) -> E2eResult<ApiResponse> {
        self.send_json(Method::POST, "/users/login", credentials, None)
            .await
    }

    pub async fn me(&self, token: Option<&SessionToken>) -> E2eResult<ApiResponse> {
        self.request(Method::GET, "/users/me", None, token).await
    }

    pub async fn update_me(
        &self,
        token: Option<&SessionToken>,
        update: &UserUpdate,
    ) -> E2eResult<ApiResponse> {
        self.send_json(Method::PATCH, "/users/me", update, token).await
    }

    pub async fn delete_me(&self, token: Option<&SessionToken>) -> E2eResult<ApiResponse> {
        self.request(Method::DELETE, "/users/me", None, token).await
    }

    pub async fn logout(&self, token: Option<&SessionToken>) -> E2eResult<ApiResponse> {
        self.request(Method::POST, "/users/logout", None, token).await
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    pub async fn create_contact<T: Serialize + ?Sized>(
        &self,
        token: Option<&SessionToken>,
        contact: &T,
    ) -> E2eResult<ApiResponse> {
        self.send_json(Method::POST, "/contacts", contact, token).await
    }

    pub async fn list_contacts(&self, token: Option<&SessionToken>) -> E2eResult<ApiResponse> {
        self.request(Method::GET, "/contacts", None, token).await
    }

    pub async fn get_contact(
        &self,
        token: Option<&SessionToken>,
        id: &str,
    ) -> E2eResult<ApiResponse> {
        self.request(Method::GET, &format!("/contacts/{}", id), None, token)
            .await
    }

    pub async fn update_contact<T: Serialize + ?Sized>(
        &self,
        token: Option<&SessionToken>,
        id: &str,
        contact: &T,
    ) -> E2eResult<ApiResponse> {
        self.send_json(Method::PUT, &format!("/contacts/{}", id), contact, token)
            .await
    }

    pub async fn delete_contact(
        &self,
        token: Option<&SessionToken>,
        id: &str,
    ) -> E2eResult<ApiResponse> {
        self.request(Method::DELETE, &format!("/contacts/{}", id), None, token)
            .await
    }
}

/// A logged-in user
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user: User,
}

impl Session {
    /// Register `fixture` and expect 201
    pub async fn register(api: &ApiClient, fixture: &UserFixture) -> E2eResult<Self> {
        let resp = api.register(fixture).await?;
        resp.expect_status(201)?;
        Ok(resp.json::<AuthPayload>()?.into())
    }

    /// Log in and expect 200
    pub async fn login(api: &ApiClient, credentials: &Credentials) -> E2eResult<Self> {
        let resp = api.login(credentials).await?;
        resp.expect_status(200)?;
        Ok(resp.json::<AuthPayload>()?.into())
    }

    pub fn token(&self) -> Option<&SessionToken> {
        Some(&self.token)
    }

    /// Delete the account behind this session; never fails the caller
    pub async fn cleanup(&self, api: &ApiClient) {
        match api.delete_me(Some(&self.token)).await {
            Ok(resp) if resp.is_success() => {
                debug!(user = %self.user.email, "deleted test user")
            }
            Ok(resp) => debug!(
                user = %self.user.email,
                status = resp.status(),
                "test user already gone"
            ),
            Err(e) => warn!(user = %self.user.email, "cleanup failed: {}", e),
        }
    }
}

impl From<AuthPayload> for Session {
    fn from(payload: AuthPayload) -> Self {
        Self {
            token: payload.token,
            user: payload.user,
        }
    }
}
