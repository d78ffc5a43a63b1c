//! # REST backend client
//!
//! [`RestClient`] talks JSON:API to the CRM's REST backend on behalf of a
//! signed-in user. Every request carries the session's API token as a bearer
//! token; every successful response body is parsed as a [`jsonapi::Document`]
//! and flattened into the camelCase shape the frontend expects.
//!
//! Paths are relative to the configured base URL (`contacts`,
//! `account_lists/42/donations`). Each `/`-separated piece is appended to the
//! base as one percent-encoded segment, so scheme prefixes, `%2e%2e` and `\`
//! stay literal and a request can never leave the base URL. Literal `.` and
//! `..` segments are rejected.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::Method;
use jsonapi::{Document, FlattenedDocument};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::ApiError;

pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

#[derive(Clone, Debug)]
pub struct RestClient {
    http: Client,
    base: Url,
}

impl RestClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    /// Absolute URL for `path` with an optional raw query string.
    pub fn endpoint(&self, path: &str, query: Option<&str>) -> Result<Url, ApiError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.iter().any(|s| matches!(*s, "." | "..")) {
            return Err(ApiError::InvalidPath(path.to_string()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidPath(path.to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    /// `GET` a document and flatten it.
    pub async fn get(
        &self,
        path: &str,
        query: Option<&str>,
        api_token: &str,
    ) -> Result<FlattenedDocument, ApiError> {
        self.send(Method::GET, path, query, api_token, None).await
    }

    /// Send a request with an optional JSON:API payload and flatten the
    /// response. An empty response body flattens to `{ "data": null }`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        api_token: &str,
        payload: Option<&Value>,
    ) -> Result<FlattenedDocument, ApiError> {
        let url = self.endpoint(path, query)?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(api_token)
            .header(ACCEPT, JSON_API_MEDIA_TYPE);
        if let Some(payload) = payload {
            request = request
                .header(CONTENT_TYPE, JSON_API_MEDIA_TYPE)
                .body(payload.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::warn!("REST {} {} failed with {}", method, url.path(), status);
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(Document::from_slice(&body)?.flatten())
    }
}
