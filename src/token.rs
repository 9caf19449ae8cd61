use serde::{Deserialize, Serialize};

use crate::error::{Result, TumblrError};

/// An OAuth 1.0a token with its secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Token sent as `oauth_token`
    #[serde(rename = "oauth_token")]
    pub token: String,

    /// Secret used in the signing key
    #[serde(rename = "oauth_token_secret")]
    pub secret: String,
}

impl TokenPair {
    /// Create a new TokenPair
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        TokenPair {
            token: token.into(),
            secret: secret.into(),
        }
    }

    /// Parse the form-encoded body returned by the token endpoints,
    /// e.g. `oauth_token=abc&oauth_token_secret=def&oauth_callback_confirmed=true`
    pub fn from_form(body: &str) -> Result<Self> {
        let mut token = None;
        let mut secret = None;
        for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
            match key.as_ref() {
                "oauth_token" => token = Some(value.into_owned()),
                "oauth_token_secret" => secret = Some(value.into_owned()),
                _ => {}
            }
        }
        match (token, secret) {
            (Some(token), Some(secret)) if !token.is_empty() => Ok(TokenPair { token, secret }),
            _ => Err(TumblrError::Auth(format!(
                "token endpoint returned no oauth_token/oauth_token_secret: {}",
                body.trim()
            ))),
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Where a session stands in the OAuth handshake.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TokenState {
    #[default]
    Unauthenticated,
    /// Step 1 done: waiting for the user to come back from the authorize page
    RequestTokenIssued(TokenPair),
    /// Step 3 done: requests may be signed
    Authorized(TokenPair),
}

impl TokenState {
    /// Numeric code persisted in the session store
    pub fn code(&self) -> u8 {
        match self {
            TokenState::Unauthenticated => 0,
            TokenState::RequestTokenIssued(_) => 1,
            TokenState::Authorized(_) => 2,
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, TokenState::Authorized(_))
    }

    /// The access token, only when authorized
    pub fn access_token(&self) -> Option<&TokenPair> {
        match self {
            TokenState::Authorized(pair) => Some(pair),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_form() {
        let pair = TokenPair::from_form("oauth_token=abc&oauth_token_secret=d%2Bf&oauth_callback_confirmed=true\n")
            .unwrap();
        assert_eq!(pair.token, "abc");
        assert_eq!(pair.secret, "d+f");
    }

    #[test]
    fn test_token_from_form_rejects_error_bodies() {
        let err = TokenPair::from_form("oauth_problem=signature_invalid").unwrap_err();
        assert!(matches!(err, TumblrError::Auth(_)));
        assert!(TokenPair::from_form("").is_err());
    }

    #[test]
    fn test_token_state() {
        let pair = TokenPair::new("t", "s");
        assert_eq!(TokenState::default().code(), 0);
        assert_eq!(TokenState::RequestTokenIssued(pair.clone()).code(), 1);
        assert!(TokenState::RequestTokenIssued(pair.clone()).access_token().is_none());

        let authorized = TokenState::Authorized(pair.clone());
        assert_eq!(authorized.code(), 2);
        assert!(authorized.is_authorized());
        assert_eq!(authorized.access_token(), Some(&pair));
    }

    #[test]
    fn test_token_serialization() {
        let json = serde_json::to_string(&TokenPair::new("t", "s")).unwrap();
        assert!(json.contains("oauth_token"));
        assert!(json.contains("oauth_token_secret"));
    }
}
