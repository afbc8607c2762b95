use url::Url;

use super::store::{
    SessionStore, SetCookie, KEY_AUTH_STATE, KEY_PAGE_BEFORE_LOGIN, KEY_TOKEN, KEY_USER_ID,
    TOKEN_COOKIE,
};
use super::{utils, AuthError, AuthSession, OAuthClient, Redirect};

/// Request-scoped coordinator for the authorization-code round trip.
///
/// One instance per incoming request: [`initialize`](Self::initialize) loads
/// the visitor's record from the store, at most one protocol operation runs,
/// and [`flush`](Self::flush) writes mutated state back at request end. The
/// instance is never shared; cross-request races for the same visitor are
/// governed by the backing store.
pub struct WebAuth<S> {
    store: S,
    oauth: OAuthClient,
    app_url: Url,
    session: AuthSession,
}

impl<S> WebAuth<S>
where
    S: SessionStore,
{
    pub fn new(store: S, oauth: OAuthClient, app_url: Url) -> Self {
        Self {
            store,
            oauth,
            app_url,
            session: AuthSession::default(),
        }
    }

    /// Load the visitor's record: token from the session, falling back to the
    /// browser cookie, plus any pending state and pre-login page. Reads only.
    pub fn initialize(&mut self) {
        self.session.token = self
            .store
            .get(KEY_TOKEN)
            .or_else(|| self.store.cookie(TOKEN_COOKIE));
        self.session.page_before_login = self.store.get(KEY_PAGE_BEFORE_LOGIN);
        self.session.auth_state = self.store.get(KEY_AUTH_STATE);
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Send the visitor to the authorization server.
    ///
    /// Remembers the page being requested so the visitor returns there after
    /// login, and materializes the anti-forgery state lazily: an in-flight
    /// authorization keeps its pending state rather than minting a new one.
    pub fn redirect_to_authorization(&mut self, request_uri: &str) -> Result<Redirect, AuthError> {
        let mut page = self.app_url.as_str().trim_end_matches('/').to_owned();
        page.push_str(request_uri);
        self.session.page_before_login = Some(page);

        let state = self
            .session
            .auth_state
            .get_or_insert_with(utils::random_state);
        let url = self.oauth.authorization_url(state)?;
        Ok(Redirect::to(url))
    }

    /// Check a callback state against the pending one.
    ///
    /// A match consumes the state: it is cleared from memory and removed from
    /// session storage, so a replayed callback fails. A mismatch (or no
    /// pending authorization) leaves everything untouched; the caller must
    /// not proceed to the code exchange.
    pub fn validate_state(&mut self, candidate: &str) -> bool {
        if self.session.auth_state.as_deref() == Some(candidate) {
            self.session.auth_state = None;
            self.store.remove(KEY_AUTH_STATE);
            return true;
        }
        false
    }

    /// Exchange the callback code for an access token.
    ///
    /// A declined exchange (anything but 201 from the token endpoint) leaves
    /// the token untouched and reports no error; callers detect the absence
    /// of a token. Transport and parse failures abort the request.
    pub async fn exchange_code_for_token(&mut self, code: &str) -> Result<(), AuthError> {
        if let Some(token) = self.oauth.exchange_code(code).await? {
            self.session.token = Some(token);
        }
        Ok(())
    }

    /// Return the visitor to the page they came from, or the application root.
    ///
    /// Consumes `page_before_login` so a later unrelated flow cannot pick up
    /// a stale URL.
    pub fn redirect_to_previous_page(&mut self) -> Redirect {
        let target = self
            .session
            .page_before_login
            .take()
            .unwrap_or_else(|| self.app_url.to_string());
        Redirect::to(target)
    }

    /// Drop the visitor's authentication and send them back.
    ///
    /// Clears the in-memory token, expires the token cookie, and removes the
    /// user and token session keys before redirecting.
    pub fn logout(&mut self) -> Redirect {
        tracing::debug!("logging out visitor");
        self.session.token = None;
        let expired = SetCookie::expired(TOKEN_COOKIE, &self.store.cookie_policy());
        self.store.set_cookie(expired);
        self.store.remove(KEY_USER_ID);
        self.store.remove(KEY_TOKEN);
        self.redirect_to_previous_page()
    }

    /// Write mutated state back to the store at request end.
    ///
    /// The token, if present, goes to session storage and is consumed; the
    /// 1-year fallback cookie is seeded only when the browser holds no token
    /// cookie yet, so a token set through another path is never overwritten.
    /// Absent fields leave their storage entries untouched.
    pub fn flush(&mut self) {
        if let Some(token) = self.session.token.take() {
            if self.store.cookie(TOKEN_COOKIE).is_none() {
                let cookie = SetCookie::persistent(TOKEN_COOKIE, &token, &self.store.cookie_policy());
                self.store.set_cookie(cookie);
            }
            self.store.insert(KEY_TOKEN, &token);
        }

        if let Some(state) = &self.session.auth_state {
            self.store.insert(KEY_AUTH_STATE, state);
        }
        if let Some(page) = &self.session.page_before_login {
            self.store.insert(KEY_PAGE_BEFORE_LOGIN, page);
        }
    }
}
