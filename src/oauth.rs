//! OAuth 1.0a request signing.
//!
//! Signature generation is done by `oauth1-request`; this module only feeds
//! it the request's method, URL and parameters and stores the resulting
//! `Authorization` header on the [`HttpRequest`].

use oauth1_request as oauth;
use url::Url;

use crate::client::Credentials;
use crate::error::Result;
use crate::token::TokenPair;
use crate::transport::HttpRequest;

/// A request carrying an OAuth `Authorization` header.
pub type SignedRequest = HttpRequest;

/// Protocol parameters that only appear during the handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandshakeParams<'a> {
    /// `oauth_callback`, sent with the request-token call
    pub callback: Option<&'a str>,
    /// `oauth_verifier`, sent with the access-token call
    pub verifier: Option<&'a str>,
}

/// Signs requests with HMAC-SHA1 using the consumer credentials and,
/// when given, a request or access token.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    credentials: Credentials,
}

impl OAuthSigner {
    pub fn new(credentials: Credentials) -> Self {
        OAuthSigner { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Attach the token/secret to a request and sign it
    pub fn sign(&self, request: HttpRequest, token: &str, secret: &str) -> Result<SignedRequest> {
        self.authorize(request, Some(&TokenPair::new(token, secret)), HandshakeParams::default())
    }

    /// Sign a request, replacing any `Authorization` header it already has.
    ///
    /// Query pairs and form fields are signed; only the `oauth_*`
    /// parameters go into the header.
    pub fn authorize(
        &self,
        mut request: HttpRequest,
        token: Option<&TokenPair>,
        handshake: HandshakeParams<'_>,
    ) -> Result<SignedRequest> {
        let mut url = Url::parse(&request.url)?;
        let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        params.extend(request.form.iter().cloned());
        // ParameterList wants its pairs in ascending order
        params.sort();
        url.set_query(None);
        url.set_fragment(None);

        let client = oauth::Credentials::new(
            self.credentials.consumer_key.as_str(),
            self.credentials.consumer_secret.as_str(),
        );
        let mut builder = oauth::Builder::new(client, oauth::HMAC_SHA1);
        builder.token(token.map(|t| oauth::Credentials::new(t.token.as_str(), t.secret.as_str())));
        builder.callback(handshake.callback);
        builder.verifier(handshake.verifier);

        let header = builder.authorize(
            request.method.as_str(),
            url.as_str(),
            &oauth::ParameterList::new(&mut params[..]),
        );

        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        request.headers.push(("Authorization".to_string(), header));

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> OAuthSigner {
        OAuthSigner::new(Credentials::new("ck", "cs"))
    }

    /// Split an `OAuth k="v", ...` header into its pairs
    fn header_params(header: &str) -> Vec<(String, String)> {
        header
            .trim_start_matches("OAuth ")
            .split(',')
            .filter_map(|part| {
                let (k, v) = part.trim().split_once('=')?;
                Some((k.to_string(), v.trim_matches('"').to_string()))
            })
            .collect()
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_signed_header_fields() {
        let request = HttpRequest::post(
            "http://api.tumblr.com/v2/blog/example.tumblr.com/post?x=1",
            vec![("body".to_string(), "Ladies + Gentlemen".to_string())],
        );
        let signed = signer()
            .authorize(request, Some(&TokenPair::new("at", "as")), HandshakeParams::default())
            .unwrap();

        let header = signed.header("Authorization").unwrap();
        assert!(header.starts_with("OAuth "));
        let params = header_params(header);
        assert_eq!(param(&params, "oauth_consumer_key"), Some("ck"));
        assert_eq!(param(&params, "oauth_token"), Some("at"));
        assert_eq!(param(&params, "oauth_signature_method"), Some("HMAC-SHA1"));
        assert!(param(&params, "oauth_nonce").is_some());
        assert!(param(&params, "oauth_timestamp").is_some());
        assert!(param(&params, "oauth_signature").map_or(false, |s| !s.is_empty()));
        // form fields and query pairs are signed but not echoed in the header
        assert!(param(&params, "body").is_none());
        assert!(param(&params, "x").is_none());

        // the request itself is untouched apart from the header
        assert_eq!(signed.url, "http://api.tumblr.com/v2/blog/example.tumblr.com/post?x=1");
        assert_eq!(signed.form.len(), 1);
    }

    #[test]
    fn test_sign_replaces_existing_authorization() {
        let mut request = HttpRequest::get("http://api.tumblr.com/v2/user/info");
        request
            .headers
            .push(("authorization".to_string(), "Bearer stale".to_string()));

        let signed = signer().sign(request, "t", "s").unwrap();
        let auth: Vec<_> = signed
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth.len(), 1);
        assert!(auth[0].1.contains("oauth_token=\"t\""));
    }

    #[test]
    fn test_handshake_params_are_signed() {
        let request = HttpRequest::post("http://www.tumblr.com/oauth/request_token", Vec::new());
        let handshake = HandshakeParams {
            callback: Some("http://example.com/cb"),
            verifier: None,
        };
        let signed = signer().authorize(request, None, handshake).unwrap();

        let params = header_params(signed.header("Authorization").unwrap());
        assert_eq!(param(&params, "oauth_callback"), Some("http%3A%2F%2Fexample.com%2Fcb"));
        assert!(param(&params, "oauth_token").is_none());
        assert!(param(&params, "oauth_verifier").is_none());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let request = HttpRequest::get("not a url");
        assert!(signer().sign(request, "t", "s").is_err());
    }
}
