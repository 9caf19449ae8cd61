//! OAuth 1.0a handshake state.
//!
//! The handshake spans an HTTP redirect: step 1 sends the user to the
//! provider's authorize page, and step 3 runs when the provider sends them
//! back. The intermediate token therefore lives in a [`SessionStore`] that the
//! host application keeps alive across that boundary (a web session, a file,
//! a database row). [`MemoryStore`] covers single-process use and tests.

use std::collections::HashMap;

use url::Url;

use crate::client::{Credentials, ACCESS_TOKEN_URL, AUTHORIZE_URL, REQUEST_TOKEN_URL};
use crate::error::{Result, TumblrError};
use crate::oauth::{HandshakeParams, OAuthSigner, SignedRequest};
use crate::token::{TokenPair, TokenState};
use crate::transport::{HttpRequest, Transport};

/// Store key holding the state code (`0`, `1` or `2`)
pub const STATE_KEY: &str = "tumblr_oauth_state";
/// Store key holding the request or access token
pub const TOKEN_KEY: &str = "tumblr_oauth_token";
/// Store key holding the matching secret
pub const SECRET_KEY: &str = "tumblr_oauth_secret";

/// Key-value persistence for handshake state.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-process [`SessionStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Where to send the user after step 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectInstruction {
    /// Authorize URL with `oauth_token` attached
    pub location: String,
}

/// Outcome of [`AuthSession::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Stop handling the current interaction and redirect the user
    Redirect(RedirectInstruction),
    /// Requests may now be signed with this access token
    Authorized(TokenPair),
}

/// OAuth credentials plus persisted handshake state.
pub struct AuthSession {
    signer: OAuthSigner,
    store: Box<dyn SessionStore>,
    callback_url: Option<String>,
}

impl AuthSession {
    /// Create a session backed by an in-memory store
    pub fn new(credentials: Credentials) -> Self {
        Self::with_store(credentials, Box::new(MemoryStore::new()))
    }

    /// Create a session backed by a caller-supplied store
    pub fn with_store(credentials: Credentials, store: Box<dyn SessionStore>) -> Self {
        AuthSession {
            signer: OAuthSigner::new(credentials),
            store,
            callback_url: None,
        }
    }

    /// Send `oauth_callback` with the request-token call
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Restore an access token obtained earlier
    pub fn with_access_token(mut self, token: TokenPair) -> Self {
        self.persist(TokenState::Authorized(token));
        self
    }

    pub fn credentials(&self) -> &Credentials {
        self.signer.credentials()
    }

    /// Read the current state back from the store.
    /// Incomplete or unknown entries read as `Unauthenticated`.
    pub fn token_state(&self) -> TokenState {
        let pair = || {
            Some(TokenPair::new(
                self.store.get(TOKEN_KEY)?,
                self.store.get(SECRET_KEY)?,
            ))
        };
        match self.store.get(STATE_KEY).as_deref() {
            Some("1") => pair().map(TokenState::RequestTokenIssued),
            Some("2") => pair().map(TokenState::Authorized),
            _ => None,
        }
        .unwrap_or_default()
    }

    /// Drop all handshake state
    pub fn reset(&mut self) {
        self.persist(TokenState::Unauthenticated);
    }

    fn persist(&mut self, state: TokenState) {
        self.store.set(STATE_KEY, state.code().to_string());
        match state {
            TokenState::Unauthenticated => {
                self.store.remove(TOKEN_KEY);
                self.store.remove(SECRET_KEY);
            }
            TokenState::RequestTokenIssued(pair) | TokenState::Authorized(pair) => {
                self.store.set(TOKEN_KEY, pair.token);
                self.store.set(SECRET_KEY, pair.secret);
            }
        }
    }

    /// Step 1: obtain a request token and return the authorize redirect
    pub fn begin_handshake(&mut self, transport: &dyn Transport) -> Result<RedirectInstruction> {
        let handshake = HandshakeParams {
            callback: self.callback_url.as_deref(),
            verifier: None,
        };
        let request = self
            .signer
            .authorize(HttpRequest::post(REQUEST_TOKEN_URL, Vec::new()), None, handshake)?;
        let pair = exchange(transport, &request, "request token")?;

        let location = Url::parse_with_params(AUTHORIZE_URL, &[("oauth_token", pair.token.as_str())])?.to_string();
        log::debug!("[tumblr] request token issued, redirecting to {}", location);

        self.persist(TokenState::RequestTokenIssued(pair));
        Ok(RedirectInstruction { location })
    }

    /// Step 3: exchange the token the provider sent back for an access token
    pub fn complete_handshake(&mut self, transport: &dyn Transport, returned_token: &str) -> Result<TokenPair> {
        self.exchange_access_token(transport, returned_token, None)
    }

    /// Step 3 with the `oauth_verifier` the provider appends to the callback
    pub fn complete_handshake_with_verifier(
        &mut self,
        transport: &dyn Transport,
        returned_token: &str,
        verifier: &str,
    ) -> Result<TokenPair> {
        self.exchange_access_token(transport, returned_token, Some(verifier))
    }

    fn exchange_access_token(
        &mut self,
        transport: &dyn Transport,
        returned_token: &str,
        verifier: Option<&str>,
    ) -> Result<TokenPair> {
        let request_secret = match self.token_state() {
            TokenState::RequestTokenIssued(pair) => pair.secret,
            other => {
                return Err(TumblrError::Auth(format!(
                    "no request token issued (state {})",
                    other.code()
                )))
            }
        };
        if returned_token.is_empty() {
            return Err(TumblrError::Auth("provider returned an empty oauth_token".to_string()));
        }

        let handshake = HandshakeParams {
            callback: None,
            verifier,
        };
        let request = self.signer.authorize(
            HttpRequest::post(ACCESS_TOKEN_URL, Vec::new()),
            Some(&TokenPair::new(returned_token, request_secret)),
            handshake,
        )?;
        let pair = exchange(transport, &request, "access token")?;
        log::debug!("[tumblr] access token obtained");

        self.persist(TokenState::Authorized(pair.clone()));
        Ok(pair)
    }

    /// Drive the handshake from wherever it stands.
    ///
    /// `callback_token` is the `oauth_token` the provider appended when it
    /// redirected back, if this interaction is that redirect. A session stuck
    /// at step 1 without a callback token starts over.
    pub fn authorize(&mut self, transport: &dyn Transport, callback_token: Option<&str>) -> Result<HandshakeStep> {
        match (self.token_state(), callback_token) {
            (TokenState::Authorized(pair), _) => Ok(HandshakeStep::Authorized(pair)),
            (TokenState::RequestTokenIssued(_), Some(token)) => {
                self.complete_handshake(transport, token).map(HandshakeStep::Authorized)
            }
            (TokenState::RequestTokenIssued(_), None) => {
                log::debug!("[tumblr] abandoned handshake, starting over");
                self.reset();
                self.begin_handshake(transport).map(HandshakeStep::Redirect)
            }
            (TokenState::Unauthenticated, _) => self.begin_handshake(transport).map(HandshakeStep::Redirect),
        }
    }

    /// Attach an OAuth signature for the given token/secret
    pub fn sign(&self, request: HttpRequest, token: &str, secret: &str) -> Result<SignedRequest> {
        self.signer.sign(request, token, secret)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("credentials", self.credentials())
            .field("state", &self.token_state().code())
            .finish()
    }
}

/// Call a token endpoint and parse its form-encoded answer
fn exchange(transport: &dyn Transport, request: &HttpRequest, what: &str) -> Result<TokenPair> {
    let response = transport
        .send(request)
        .map_err(|e| TumblrError::Auth(format!("{} request failed: {}", what, e)))?;
    if !(200..300).contains(&response.status) {
        return Err(TumblrError::Auth(format!(
            "{} request rejected with HTTP {}: {}",
            what,
            response.status,
            response.body.trim()
        )));
    }
    TokenPair::from_form(&response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpMethod, HttpResponse};
    use std::sync::Mutex;

    /// Replays canned responses and records what was sent
    struct Scripted {
        responses: Mutex<Vec<HttpResponse>>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<(u16, &str)>) -> Self {
            Scripted {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .rev()
                        .map(|(status, body)| HttpResponse {
                            status,
                            body: body.to_string(),
                        })
                        .collect(),
                ),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Scripted {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.sent.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| TumblrError::http(0, "unexpected request".to_string(), None))
        }
    }

    fn session() -> AuthSession {
        AuthSession::new(Credentials::new("ck", "cs"))
    }

    #[test]
    fn test_full_handshake() {
        let transport = Scripted::new(vec![
            (200, "oauth_token=req&oauth_token_secret=reqsecret&oauth_callback_confirmed=true"),
            (200, "oauth_token=acc&oauth_token_secret=accsecret"),
        ]);
        let mut session = session().with_callback_url("http://example.com/cb");

        let redirect = session.begin_handshake(&transport).unwrap();
        assert_eq!(redirect.location, "http://www.tumblr.com/oauth/authorize?oauth_token=req");
        assert_eq!(
            session.token_state(),
            TokenState::RequestTokenIssued(TokenPair::new("req", "reqsecret"))
        );

        let pair = session
            .complete_handshake_with_verifier(&transport, "req", "verif")
            .unwrap();
        assert_eq!(pair, TokenPair::new("acc", "accsecret"));
        assert_eq!(session.token_state(), TokenState::Authorized(pair));

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url, REQUEST_TOKEN_URL);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert!(sent[0].header("Authorization").unwrap().contains("oauth_callback="));
        assert_eq!(sent[1].url, ACCESS_TOKEN_URL);
        let auth = sent[1].header("Authorization").unwrap();
        assert!(auth.contains("oauth_token=\"req\""));
        assert!(auth.contains("oauth_verifier=\"verif\""));
    }

    #[test]
    fn test_complete_requires_request_token() {
        let transport = Scripted::new(Vec::new());
        let err = session().complete_handshake(&transport, "req").unwrap_err();
        assert!(matches!(err, TumblrError::Auth(_)));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rejected_request_token() {
        let transport = Scripted::new(vec![(401, "oauth_signature does not match expected value")]);
        let mut session = session();
        let err = session.begin_handshake(&transport).unwrap_err();
        assert!(matches!(err, TumblrError::Auth(_)));
        assert_eq!(session.token_state(), TokenState::Unauthenticated);
    }

    #[test]
    fn test_failed_exchange_keeps_request_token() {
        let transport = Scripted::new(vec![
            (200, "oauth_token=req&oauth_token_secret=reqsecret"),
            (400, "oauth_problem=token_rejected"),
        ]);
        let mut session = session();
        session.begin_handshake(&transport).unwrap();
        assert!(session.complete_handshake(&transport, "req").is_err());
        assert_eq!(session.token_state().code(), 1);
    }

    #[test]
    fn test_authorize_steps() {
        let transport = Scripted::new(vec![
            (200, "oauth_token=req1&oauth_token_secret=s1"),
            (200, "oauth_token=req2&oauth_token_secret=s2"),
            (200, "oauth_token=acc&oauth_token_secret=accsecret"),
        ]);
        let mut session = session();

        let step = session.authorize(&transport, None).unwrap();
        assert!(matches!(step, HandshakeStep::Redirect(_)));

        // user came back without a token: start over
        let step = session.authorize(&transport, None).unwrap();
        match step {
            HandshakeStep::Redirect(r) => assert!(r.location.ends_with("oauth_token=req2")),
            other => panic!("expected redirect, got {:?}", other),
        }

        let step = session.authorize(&transport, Some("req2")).unwrap();
        assert_eq!(step, HandshakeStep::Authorized(TokenPair::new("acc", "accsecret")));

        // already authorized: no further round trips
        let step = session.authorize(&transport, None).unwrap();
        assert!(matches!(step, HandshakeStep::Authorized(_)));
        assert_eq!(transport.sent.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_store_round_trip_and_reset() {
        let mut session = session().with_access_token(TokenPair::new("t", "s"));
        assert!(session.token_state().is_authorized());
        session.reset();
        assert_eq!(session.token_state(), TokenState::Unauthenticated);
    }

    #[test]
    fn test_incomplete_store_reads_unauthenticated() {
        let mut store = MemoryStore::new();
        store.set(STATE_KEY, "2".to_string());
        store.set(TOKEN_KEY, "t".to_string());
        let session = AuthSession::with_store(Credentials::new("ck", "cs"), Box::new(store));
        assert_eq!(session.token_state(), TokenState::Unauthenticated);
    }
}
