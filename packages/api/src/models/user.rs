//! # Signed-in user as seen by the frontend
//!
//! [`UserInfo`] is the projection of a session that may cross to the browser.
//! It carries the effective user id and whether the session is an
//! impersonation, never the API tokens behind them. Field names follow the
//! frontend's conventions (`userID`, `impersonating`).

use serde::{Deserialize, Serialize};

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub impersonating: bool,
}
