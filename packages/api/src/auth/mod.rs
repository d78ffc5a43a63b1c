//! Authentication: handoff-cookie identity resolution and session data.

mod handoff;
mod session;

pub use handoff::{
    resolve_identity, ClearCookie, Resolution, ResolvedIdentity, ACCOUNT_CONFLICT_USER_ID_COOKIE,
    IMPERSONATE_COOKIE, TOKEN_COOKIE,
};
pub use session::{SessionData, SESSION_IDENTITY_KEY};
