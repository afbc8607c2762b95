use url::Url;

use super::store::SessionStore;
use super::{AuthError, Redirect, WebAuth};

/// Parameters extracted from the authorization server's callback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: Option<String>,
}

impl CallbackParams {
    /// Extract `code` and `state` from the callback URL.
    ///
    /// A provider `error=` parameter wins over everything else; a callback
    /// without a code is rejected.
    pub fn from_url(url: &Url) -> Result<Self, AuthError> {
        let mut code: Option<String> = None;
        let mut state: Option<String> = None;
        let mut error: Option<String> = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(err) = error {
            return Err(AuthError::AccessDenied(err));
        }

        let code = code.ok_or(AuthError::MissingAuthorizationCode)?;
        Ok(Self { code, state })
    }
}

/// Consume the provider callback: validate the state, exchange the code, and
/// send the visitor back to the page they came from.
///
/// The embedding application routes the callback request here and must treat
/// an error as a rejected login; the exchange never runs on a state mismatch.
pub async fn complete_authorization<S>(
    auth: &mut WebAuth<S>,
    code: &str,
    state: &str,
) -> Result<Redirect, AuthError>
where
    S: SessionStore,
{
    if !auth.validate_state(state) {
        return Err(AuthError::StateMismatch);
    }
    auth.exchange_code_for_token(code).await?;
    Ok(auth.redirect_to_previous_page())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemorySessionStore, OAuthClient, KEY_AUTH_STATE, KEY_PAGE_BEFORE_LOGIN};
    use crate::config::WebAuthConfig;
    use httpmock::prelude::*;

    fn webauth(server_url: &str, store: MemorySessionStore) -> WebAuth<MemorySessionStore> {
        let oauth = OAuthClient::new(WebAuthConfig::new(server_url, "client-id").unwrap()).unwrap();
        WebAuth::new(store, oauth, Url::parse("https://app.example.com/").unwrap())
    }

    #[test]
    fn params_from_callback_url() {
        let url = Url::parse("https://app.example.com/auth/return?code=abc&state=beef").unwrap();
        let params = CallbackParams::from_url(&url).unwrap();
        assert_eq!(params.code, "abc");
        assert_eq!(params.state.as_deref(), Some("beef"));
    }

    #[test]
    fn provider_error_is_rejected() {
        let url =
            Url::parse("https://app.example.com/auth/return?error=access_denied&code=abc").unwrap();
        let err = CallbackParams::from_url(&url).unwrap_err();
        assert!(matches!(err, AuthError::AccessDenied(reason) if reason == "access_denied"));
    }

    #[test]
    fn missing_code_is_rejected() {
        let url = Url::parse("https://app.example.com/auth/return?state=beef").unwrap();
        let err = CallbackParams::from_url(&url).unwrap_err();
        assert!(matches!(err, AuthError::MissingAuthorizationCode));
    }

    #[tokio::test]
    async fn callback_completes_login() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(201)
                .json_body_obj(&serde_json::json!({ "access_token": "abc123" }));
        });

        let mut store = MemorySessionStore::new();
        store.insert(KEY_AUTH_STATE, "deadbeef42");
        store.insert(KEY_PAGE_BEFORE_LOGIN, "https://app.example.com/orders");
        let mut auth = webauth(&server.base_url(), store);
        auth.initialize();

        let redirect = complete_authorization(&mut auth, "code123", "deadbeef42")
            .await
            .unwrap();
        mock.assert();
        assert_eq!(redirect.location(), "https://app.example.com/orders");
        assert_eq!(auth.token(), Some("abc123"));
    }

    #[tokio::test]
    async fn forged_state_never_reaches_the_exchange() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(201)
                .json_body_obj(&serde_json::json!({ "access_token": "abc123" }));
        });

        let mut store = MemorySessionStore::new();
        store.insert(KEY_AUTH_STATE, "deadbeef42");
        let mut auth = webauth(&server.base_url(), store);
        auth.initialize();

        let err = complete_authorization(&mut auth, "code123", "forged")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch));
        mock.assert_hits(0);
        assert_eq!(auth.token(), None);
    }
}
