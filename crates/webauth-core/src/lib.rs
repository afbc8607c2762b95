//! Client side of the OAuth2 authorization-code flow for web applications:
//! redirect to the authorization server, validate the callback state, exchange
//! the code for an access token, and persist it across the session and a
//! long-lived fallback cookie.

pub mod auth;
pub mod config;
