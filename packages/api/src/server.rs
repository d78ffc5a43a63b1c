//! # HTTP handlers
//!
//! [`router`] wires the authentication and REST proxy endpoints. It expects a
//! `tower_sessions::SessionManagerLayer` to be layered on top by the binary.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /api/auth/sign-in` | [`sign_in`]: resolve handoff cookies, store the identity, expire the consumed cookies |
//! | `GET /api/auth/me` | [`current_user`] |
//! | `POST /api/auth/stop-impersonating` | [`stop_impersonating`] |
//! | `POST /api/auth/sign-out` | [`sign_out`] |
//! | `GET /api/rest/{*path}` | [`rest_get`] |
//! | `POST`/`PATCH /api/rest/{*path}` | [`rest_write`] |
//! | `DELETE /api/rest/{*path}` | [`rest_delete`] |

use axum::extract::{Path, RawQuery, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use jsonapi::{resource_payload, FlattenedDocument};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;

use crate::auth::{resolve_identity, Resolution, SessionData, SESSION_IDENTITY_KEY};
use crate::error::ApiError;
use crate::models::UserInfo;
use crate::rest::RestClient;
use crate::settings::Settings;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub rest: RestClient,
}

impl AppState {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        Ok(Self {
            rest: RestClient::new(&settings.rest.url)?,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/me", get(current_user))
        .route("/api/auth/stop-impersonating", post(stop_impersonating))
        .route("/api/auth/sign-out", post(sign_out))
        .route(
            "/api/rest/{*path}",
            get(rest_get)
                .post(rest_write)
                .patch(rest_write)
                .delete(rest_delete),
        )
        .with_state(state)
}

/// Identity established by the single-sign-on provider.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(rename = "apiToken")]
    pub api_token: String,
    #[serde(rename = "userID")]
    pub user_id: String,
}

/// camelCase resource sent by the frontend for create/update.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Value,
}

/// Resolve the signed-in identity against the handoff cookies of this request.
pub async fn sign_in(
    session: Session,
    headers: HeaderMap,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cookie_header = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    let Resolution {
        identity,
        cookies_to_clear,
    } = resolve_identity(&request.api_token, &request.user_id, &cookie_header);

    tracing::info!(
        "Signed in user {} (impersonating: {}, handoff cookies: {})",
        identity.user_id,
        identity.impersonating,
        cookies_to_clear.len()
    );

    let data = SessionData::new(identity);
    session.cycle_id().await?;
    session.insert(SESSION_IDENTITY_KEY, &data).await?;

    let clear_headers = AppendHeaders(
        cookies_to_clear
            .into_iter()
            .map(|cookie| (SET_COOKIE, cookie.to_string())),
    );
    Ok((clear_headers, Json(data.user_info())))
}

/// The signed-in user, or `null`.
pub async fn current_user(session: Session) -> Result<Json<Option<UserInfo>>, ApiError> {
    let data: Option<SessionData> = session.get(SESSION_IDENTITY_KEY).await?;
    Ok(Json(data.map(|d| d.user_info())))
}

/// Return to the impersonator's own identity.
pub async fn stop_impersonating(session: Session) -> Result<Json<UserInfo>, ApiError> {
    let mut data = require_session(&session).await?;
    if data.identity.stop_impersonating() {
        tracing::info!("User {} stopped impersonating", data.identity.user_id);
        session.insert(SESSION_IDENTITY_KEY, &data).await?;
    }
    Ok(Json(data.user_info()))
}

pub async fn sign_out(session: Session) -> Result<StatusCode, ApiError> {
    session.flush().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rest_get(
    State(state): State<AppState>,
    session: Session,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<FlattenedDocument>, ApiError> {
    let data = require_session(&session).await?;
    let document = state
        .rest
        .get(&path, query.as_deref(), &data.identity.api_token)
        .await?;
    Ok(Json(document))
}

pub async fn rest_write(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    Json(request): Json<WriteRequest>,
) -> Result<Json<FlattenedDocument>, ApiError> {
    let data = require_session(&session).await?;
    let payload = resource_payload(&request.kind, request.id.as_deref(), &request.attributes);
    let document = state
        .rest
        .send(
            method,
            &path,
            query.as_deref(),
            &data.identity.api_token,
            Some(&payload),
        )
        .await?;
    Ok(Json(document))
}

pub async fn rest_delete(
    State(state): State<AppState>,
    session: Session,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<FlattenedDocument>, ApiError> {
    let data = require_session(&session).await?;
    let document = state
        .rest
        .send(
            Method::DELETE,
            &path,
            query.as_deref(),
            &data.identity.api_token,
            None,
        )
        .await?;
    Ok(Json(document))
}

async fn require_session(session: &Session) -> Result<SessionData, ApiError> {
    session
        .get::<SessionData>(SESSION_IDENTITY_KEY)
        .await?
        .ok_or(ApiError::Unauthenticated)
}
