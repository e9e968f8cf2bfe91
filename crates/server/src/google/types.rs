//! Google OAuth wire types.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    #[allow(dead_code)]
    pub token_type: String,
}

/// Access token returned by the token endpoint.
#[derive(Debug, Clone)]
pub struct GoogleAccessToken {
    /// Bearer token for the userinfo endpoint.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: Option<i64>,
}

/// Profile returned by the userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account identifier.
    pub sub: String,
    /// Primary email address.
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Full display name.
    pub name: Option<String>,
    /// Profile picture URL.
    pub picture: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_userinfo() {
        let json = r#"{
            "sub": "110169484474386276334",
            "name": "Ada Lovelace",
            "given_name": "Ada",
            "picture": "https://lh3.googleusercontent.com/a/abc",
            "email": "ada@example.com",
            "email_verified": true
        }"#;

        let profile: GoogleProfile = serde_json::from_str(json).expect("valid json");
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(profile.name.as_deref(), Some("Ada Lovelace"));
        assert!(profile.email_verified);
    }

    #[test]
    fn test_profile_optional_fields() {
        let profile: GoogleProfile =
            serde_json::from_str(r#"{"sub": "1"}"#).expect("valid json");
        assert_eq!(profile.email, None);
        assert_eq!(profile.picture, None);
        assert!(!profile.email_verified);
    }
}
