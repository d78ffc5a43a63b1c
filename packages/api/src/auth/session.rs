//! Session data types.

use serde::{Deserialize, Serialize};

use super::handoff::ResolvedIdentity;
use crate::models::UserInfo;

/// Key for storing the resolved identity in the session.
pub const SESSION_IDENTITY_KEY: &str = "identity";

/// Session data stored in the session store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub identity: ResolvedIdentity,
}

impl SessionData {
    pub fn new(identity: ResolvedIdentity) -> Self {
        Self { identity }
    }

    /// Client-safe view of the session; API tokens stay on the server.
    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            user_id: self.identity.user_id.clone(),
            impersonating: self.identity.impersonating,
        }
    }
}
