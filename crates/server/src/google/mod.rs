//! Google OAuth 2.0 client.
//!
//! # OAuth Flow
//!
//! 1. Generate authorization URL with `authorization_url()`
//! 2. Redirect the player to Google's account chooser
//! 3. Google redirects back with an authorization code
//! 4. Exchange the code for an access token with `exchange_code()`
//! 5. Fetch the player's profile with `fetch_profile()`

mod types;

pub use types::*;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::GoogleOAuthConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors that can occur when talking to Google.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the request.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

/// Client for Google's OAuth and userinfo endpoints.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
}

impl GoogleClient {
    /// Create a new Google OAuth client.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            inner: Arc::new(GoogleClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    /// Get the OAuth client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// Generate the authorization URL for player login.
    ///
    /// Requests the `email` and `profile` scopes and always shows the
    /// account chooser.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL Google redirects to
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=email%20profile&\
            prompt=select_account&\
            state={}",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Arguments
    ///
    /// * `code` - The authorization code from the OAuth callback
    /// * `redirect_uri` - The same redirect URI used in the authorization request
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleAccessToken, GoogleError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleError::OAuth(format!("Token exchange failed: {text}")));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(GoogleAccessToken {
            access_token: token_response.access_token,
            expires_in: token_response.expires_in,
        })
    }

    /// Fetch the profile of the player the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Google rejects the token.
    pub async fn fetch_profile(
        &self,
        token: &GoogleAccessToken,
    ) -> Result<GoogleProfile, GoogleError> {
        let response = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleError::OAuth(format!(
                "Userinfo request failed ({status}): {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> GoogleClient {
        GoogleClient::new(&GoogleOAuthConfig {
            client_id: "1234.apps.googleusercontent.com".to_owned(),
            client_secret: SecretString::from("k3Yx9mQ2vT8pL5wR7nB4"),
        })
    }

    #[test]
    fn test_authorization_url_targets_google() {
        let url = client().authorization_url("https://tetribass.test/auth/google/callback", "abc");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    }

    #[test]
    fn test_authorization_url_parameters() {
        let url = client().authorization_url("https://tetribass.test/auth/google/callback", "s t");
        let parsed = url::Url::parse(&url).expect("valid url");
        let params: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(params["client_id"], "1234.apps.googleusercontent.com");
        assert_eq!(params["response_type"], "code");
        assert_eq!(
            params["redirect_uri"],
            "https://tetribass.test/auth/google/callback"
        );
        assert_eq!(params["scope"], "email profile");
        assert_eq!(params["prompt"], "select_account");
        assert_eq!(params["state"], "s t");
    }

    #[test]
    fn test_client_id() {
        assert_eq!(client().client_id(), "1234.apps.googleusercontent.com");
    }
}
