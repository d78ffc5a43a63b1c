//! # API crate: authentication and REST proxy for the partner CRM
//!
//! The web binary serves everything defined here. The identity logic is plain
//! Rust and always compiled; the HTTP side (settings, REST client, handlers) sits
//! behind the `server` feature.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | none | Handoff-cookie identity resolution, impersonation, session data |
//! | [`models`] | none | Client-safe projections (`UserInfo`) |
//! | `error` | `server` | `ApiError` and its mapping to JSON responses |
//! | `rest` | `server` | JSON:API backend client that flattens every response |
//! | `server` | `server` | axum router and handlers |
//! | `settings` | `server` | Layered configuration (`config.toml`, `CRM_*` env vars) |
//!
//! ## Sign-in flow
//!
//! 1. The single-sign-on exchange (external) yields a base API token and user id.
//! 2. The frontend posts them to `POST /api/auth/sign-in`.
//! 3. [`auth::resolve_identity`] merges them with any handoff cookies on the
//!    request (`accountConflictUserId`, `token`, `impersonate`).
//! 4. The resolved identity is stored in the session and each consumed cookie is
//!    expired with a `Set-Cookie` header.
//! 5. Later `/api/rest/*` calls use the session's API token against the backend.

pub mod auth;
#[cfg(feature = "server")]
pub mod error;
pub mod models;
#[cfg(feature = "server")]
pub mod rest;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod settings;

pub use auth::{resolve_identity, ResolvedIdentity};
#[cfg(feature = "server")]
pub use error::ApiError;
pub use models::UserInfo;
