use serde::{Deserialize, Serialize};

/// Per-visitor authentication record carried across the login round-trip.
///
/// Loaded from the session store when a request starts, mutated by at most one
/// protocol operation, and flushed back when the request ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Access token returned by the authorization server, if any.
    pub token: Option<String>,
    /// Anti-forgery state, present only while an authorization is in flight.
    pub auth_state: Option<String>,
    /// Page the visitor was on when authentication was triggered.
    pub page_before_login: Option<String>,
}

impl AuthSession {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn has_pending_authorization(&self) -> bool {
        self.auth_state.is_some()
    }
}
