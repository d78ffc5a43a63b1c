//! # Handoff cookies and identity resolution
//!
//! After single sign-on, the user's identity normally comes straight from the
//! provider: a base API token and a user id. An external hand-off flow can
//! override that identity for the next request by setting short-lived cookies:
//!
//! | Cookie | Effect |
//! |--------|--------|
//! | `accountConflictUserId` | replaces the user id |
//! | `token` | replaces the API token |
//! | `impersonate` | the current token becomes the impersonator's, this value becomes the active token |
//!
//! [`resolve_identity`] applies them in that order and returns the resulting
//! [`ResolvedIdentity`] together with one [`ClearCookie`] per consumed cookie,
//! so the response can expire them and they are not reprocessed.
//!
//! Absent or unparseable cookies are simply not present: resolution never fails.

use std::fmt;

use cookie::Cookie;
use serde::{Deserialize, Serialize};

pub const ACCOUNT_CONFLICT_USER_ID_COOKIE: &str = "accountConflictUserId";
pub const TOKEN_COOKIE: &str = "token";
pub const IMPERSONATE_COOKIE: &str = "impersonate";

/// The identity a request acts as.
///
/// `impersonating` is true exactly when `impersonator_api_token` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    pub api_token: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub impersonator_api_token: String,
    pub impersonating: bool,
}

impl ResolvedIdentity {
    /// A plain, non-impersonating identity.
    pub fn new(api_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            user_id: user_id.into(),
            impersonator_api_token: String::new(),
            impersonating: false,
        }
    }

    /// Drop impersonation and go back to the impersonator's own token.
    /// Returns `false` (and changes nothing) when not impersonating.
    pub fn stop_impersonating(&mut self) -> bool {
        if !self.impersonating {
            return false;
        }
        self.api_token = std::mem::take(&mut self.impersonator_api_token);
        self.impersonating = false;
        true
    }
}

/// A `Set-Cookie` value that immediately expires a handoff cookie:
/// `<name>=; HttpOnly; path=/; Max-Age=0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearCookie {
    name: String,
}

impl ClearCookie {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ClearCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=; HttpOnly; path=/; Max-Age=0", self.name)
    }
}

/// Output of [`resolve_identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identity: ResolvedIdentity,
    pub cookies_to_clear: Vec<ClearCookie>,
}

/// Handoff cookie values found in a `Cookie` header.
#[derive(Debug, Default)]
struct HandoffCookies {
    account_conflict_user_id: Option<String>,
    token: Option<String>,
    impersonate: Option<String>,
}

impl HandoffCookies {
    fn parse(raw_cookie_header: &str) -> Self {
        let mut found = Self::default();
        for cookie in Cookie::split_parse(raw_cookie_header).flatten() {
            let slot = match cookie.name() {
                ACCOUNT_CONFLICT_USER_ID_COOKIE => &mut found.account_conflict_user_id,
                TOKEN_COOKIE => &mut found.token,
                IMPERSONATE_COOKIE => &mut found.impersonate,
                _ => continue,
            };
            // first occurrence wins
            if slot.is_none() {
                *slot = Some(decode_value(cookie.value_trimmed()));
            }
        }
        found
    }
}

/// Percent-decode a cookie value, keeping the raw text when it does not decode
/// to UTF-8.
fn decode_value(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Merge the base identity with any handoff cookies in `raw_cookie_header`.
///
/// Clear directives come out in the order `impersonate`,
/// `accountConflictUserId`, `token`, each only when that cookie was present.
pub fn resolve_identity(
    base_api_token: &str,
    base_user_id: &str,
    raw_cookie_header: &str,
) -> Resolution {
    let cookies = HandoffCookies::parse(raw_cookie_header);

    let mut api_token = base_api_token.to_string();
    let mut user_id = base_user_id.to_string();
    let mut impersonator_api_token = String::new();
    let mut consumed = Vec::new();

    if let Some(value) = cookies.account_conflict_user_id {
        user_id = value;
        consumed.push(ACCOUNT_CONFLICT_USER_ID_COOKIE);
    }
    if let Some(value) = cookies.token {
        api_token = value;
        consumed.push(TOKEN_COOKIE);
    }
    if let Some(value) = cookies.impersonate {
        impersonator_api_token = std::mem::replace(&mut api_token, value);
        consumed.insert(0, IMPERSONATE_COOKIE);
    }

    let impersonating = !impersonator_api_token.is_empty();

    Resolution {
        identity: ResolvedIdentity {
            api_token,
            user_id,
            impersonator_api_token,
            impersonating,
        },
        cookies_to_clear: consumed.into_iter().map(ClearCookie::new).collect(),
    }
}
