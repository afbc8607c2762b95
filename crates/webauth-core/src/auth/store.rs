use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Session-storage key holding the access token.
pub const KEY_TOKEN: &str = "token";
/// Session-storage key holding the pending anti-forgery state.
pub const KEY_AUTH_STATE: &str = "authState";
/// Session-storage key holding the pre-login return URL.
pub const KEY_PAGE_BEFORE_LOGIN: &str = "pageBeforeLogin";
/// Session-storage key for the application user id, cleared on logout.
pub const KEY_USER_ID: &str = "userId";
/// Name of the long-lived browser cookie mirroring the token.
pub const TOKEN_COOKIE: &str = "token";

/// Request-scoped persistence the coordinator reads at initialize and writes
/// at flush: a per-visitor session map plus its browser-cookie sibling.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn insert(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    /// Value of a cookie sent by the browser with the current request.
    fn cookie(&self, name: &str) -> Option<String>;
    /// Emit a `Set-Cookie` directive on the response.
    fn set_cookie(&mut self, cookie: SetCookie);
    /// Ambient attribute policy applied to cookies this application sets.
    fn cookie_policy(&self) -> CookiePolicy;
}

/// Attributes the surrounding application configures for its session cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            path: "/".to_owned(),
            domain: None,
            secure: false,
            http_only: false,
        }
    }
}

/// A full cookie directive: value, absolute expiry, and policy attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl SetCookie {
    /// Cookie persisted for one year from now.
    pub fn persistent(name: &str, value: &str, policy: &CookiePolicy) -> Self {
        Self::with_expiry(name, value, Utc::now() + Duration::days(365), policy)
    }

    /// Already-expired cookie, instructing the browser to drop its copy.
    pub fn expired(name: &str, policy: &CookiePolicy) -> Self {
        Self::with_expiry(name, "", Utc::now() - Duration::hours(1), policy)
    }

    fn with_expiry(
        name: &str,
        value: &str,
        expires: DateTime<Utc>,
        policy: &CookiePolicy,
    ) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            expires,
            path: policy.path.clone(),
            domain: policy.domain.clone(),
            secure: policy.secure,
            http_only: policy.http_only,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires <= Utc::now()
    }
}

/// In-process store backing tests and single-process embeddings.
///
/// Every emitted cookie directive is recorded so callers can assert on the
/// exact `Set-Cookie` traffic of a request.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: HashMap<String, String>,
    cookies: HashMap<String, String>,
    issued: Vec<SetCookie>,
    policy: CookiePolicy,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CookiePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Seed a cookie as if the browser had sent it with the request.
    pub fn put_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_owned(), value.to_owned());
    }

    /// Cookie directives emitted so far, oldest first.
    pub fn issued_cookies(&self) -> &[SetCookie] {
        &self.issued
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.session.get(key).cloned()
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.session.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.session.remove(key);
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn set_cookie(&mut self, cookie: SetCookie) {
        if cookie.is_expired() {
            self.cookies.remove(&cookie.name);
        } else {
            self.cookies
                .insert(cookie.name.clone(), cookie.value.clone());
        }
        self.issued.push(cookie);
    }

    fn cookie_policy(&self) -> CookiePolicy {
        self.policy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trip() {
        let mut store = MemorySessionStore::new();
        store.insert(KEY_TOKEN, "abc");
        assert_eq!(store.get(KEY_TOKEN).as_deref(), Some("abc"));
        store.remove(KEY_TOKEN);
        assert_eq!(store.get(KEY_TOKEN), None);
    }

    #[test]
    fn persistent_cookie_is_stored_and_recorded() {
        let mut store = MemorySessionStore::new();
        let cookie = SetCookie::persistent(TOKEN_COOKIE, "abc", &store.cookie_policy());
        assert!(!cookie.is_expired());
        store.set_cookie(cookie);
        assert_eq!(store.cookie(TOKEN_COOKIE).as_deref(), Some("abc"));
        assert_eq!(store.issued_cookies().len(), 1);
    }

    #[test]
    fn expired_cookie_clears_browser_copy() {
        let mut store = MemorySessionStore::new();
        store.put_cookie(TOKEN_COOKIE, "abc");
        store.set_cookie(SetCookie::expired(TOKEN_COOKIE, &store.cookie_policy()));
        assert_eq!(store.cookie(TOKEN_COOKIE), None);
        let issued = store.issued_cookies().last().unwrap();
        assert!(issued.is_expired());
        assert!(issued.value.is_empty());
    }

    #[test]
    fn cookie_carries_policy_attributes() {
        let policy = CookiePolicy {
            path: "/app".to_owned(),
            domain: Some("example.com".to_owned()),
            secure: true,
            http_only: true,
        };
        let cookie = SetCookie::persistent(TOKEN_COOKIE, "abc", &policy);
        assert_eq!(cookie.path, "/app");
        assert_eq!(cookie.domain.as_deref(), Some("example.com"));
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }
}
