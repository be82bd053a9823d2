//! REST surface of the mock application

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::auth::{require_auth, AuthenticatedUser};
use crate::store::{ContactInput, SharedStore, StoreError, UserInput};

/// Build the router serving every Contact List endpoint
pub fn router(store: SharedStore) -> Router {
    let protected = Router::new()
        .route("/users/me", get(me_handler).patch(update_me_handler).delete(delete_me_handler))
        .route("/users/logout", post(logout_handler))
        .route("/contacts", get(list_contacts_handler).post(create_contact_handler))
        .route(
            "/contacts/:id",
            get(get_contact_handler)
                .put(replace_contact_handler)
                .delete(delete_contact_handler),
        )
        .route_layer(middleware::from_fn_with_state(store.clone(), require_auth));

    Router::new()
        .route("/users", post(register_handler))
        .route("/users/login", post(login_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        match self {
            StoreError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "_message": "Validation failed", "message": message })),
            )
                .into_response(),
            StoreError::EmailInUse => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": self.to_string() })),
            )
                .into_response(),
            StoreError::BadCredentials => StatusCode::UNAUTHORIZED.into_response(),
            StoreError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            StoreError::InvalidId => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            StoreError::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

// ============================================================================
// Users
// ============================================================================

async fn register_handler(
    State(store): State<SharedStore>,
    Json(input): Json<UserInput>,
) -> Result<impl IntoResponse, StoreError> {
    let (user, token) = store.write().register(input)?;
    debug!(user_id = %user.id, "registered user");
    Ok((StatusCode::CREATED, Json(json!({ "user": user, "token": token }))))
}

async fn login_handler(
    State(store): State<SharedStore>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StoreError> {
    let (user, token) = store.write().login(&req.email, &req.password)?;
    Ok(Json(json!({ "user": user, "token": token })))
}

async fn me_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, StoreError> {
    let user = store.read().user(&caller.user_id)?;
    Ok(Json(user))
}

async fn update_me_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(input): Json<UserInput>,
) -> Result<impl IntoResponse, StoreError> {
    let user = store.write().update_user(&caller.user_id, input)?;
    Ok(Json(user))
}

async fn delete_me_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, StoreError> {
    store.write().delete_user(&caller.user_id)?;
    debug!(user_id = %caller.user_id, "deleted user");
    Ok(StatusCode::OK)
}

async fn logout_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, StoreError> {
    store.write().logout(&caller.token)?;
    Ok(StatusCode::OK)
}

// ============================================================================
// Contacts
// ============================================================================

async fn list_contacts_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    Json(store.read().list_contacts(&caller.user_id))
}

async fn create_contact_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(input): Json<ContactInput>,
) -> Result<impl IntoResponse, StoreError> {
    let contact = store.write().create_contact(&caller.user_id, input)?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn get_contact_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    let contact = store.read().contact(&caller.user_id, &id)?;
    Ok(Json(contact))
}

async fn replace_contact_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(input): Json<ContactInput>,
) -> Result<impl IntoResponse, StoreError> {
    let contact = store.write().replace_contact(&caller.user_id, &id, input)?;
    Ok(Json(contact))
}

async fn delete_contact_handler(
    State(store): State<SharedStore>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    store.write().delete_contact(&caller.user_id, &id)?;
    Ok((StatusCode::OK, "Contact deleted"))
}
