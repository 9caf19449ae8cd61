use std::collections::BTreeMap;
use url::Url;

use crate::client::{Config, Credentials, API_URL};
use crate::error::{Result, TumblrError};
use crate::response::ApiResponse;
use crate::session::{AuthSession, HandshakeStep, RedirectInstruction};
use crate::token::{TokenPair, TokenState};
use crate::transport::{HttpMethod, HttpRequest, ReqwestTransport, Transport};

/// Query or form parameters
pub type Params = BTreeMap<String, String>;

/// How an endpoint authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `api_key` query parameter, unsigned
    ApiKey,
    /// OAuth 1.0a signed with the session's access token
    OAuth,
}

/// One API call described as data, before it is rendered to a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// Path below the API base URL, e.g. `/blog/staff.tumblr.com/info`
    pub path: String,
    pub query_params: Params,
    pub post_params: Option<Params>,
    pub requires_auth: bool,
}

impl RequestSpec {
    pub fn new(path: impl Into<String>, auth: AuthMode) -> Self {
        RequestSpec {
            path: path.into(),
            query_params: Params::new(),
            post_params: None,
            requires_auth: auth == AuthMode::OAuth,
        }
    }

    /// Merge parameters into the query string
    pub fn with_query(mut self, params: Option<&Params>) -> Self {
        if let Some(params) = params {
            self.query_params
                .extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self
    }

    /// Set one query parameter
    pub fn with_query_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query_params.insert(key.to_string(), value.into());
        self
    }

    /// Send these parameters as a POST body
    pub fn with_post(mut self, params: Params) -> Self {
        self.post_params = Some(params);
        self
    }

    /// GET unless there is a non-empty POST body
    pub fn method(&self) -> HttpMethod {
        match self.post_params {
            Some(ref params) if !params.is_empty() => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }

    /// Render the full URI against the API base URL
    pub fn uri(&self, api_url: &str) -> Result<String> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            api_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        ))?;
        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query_params.iter());
        }
        Ok(url.to_string())
    }
}

/// Client for the Tumblr API v2.
///
/// Owns the [`AuthSession`] and the [`Transport`]; endpoint groups such as
/// [`Blog`](crate::Blog) borrow it, so many of them can share one client.
///
/// `ApiClient` is `Send + Sync`. Handshake steps take `&mut self`, so a client
/// shared between threads goes behind a `Mutex` while it authorizes.
pub struct ApiClient {
    transport: Box<dyn Transport>,
    session: AuthSession,
    config: Config,
}

impl ApiClient {
    /// Create a client with the default configuration and reqwest transport
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Result<Self> {
        Self::with_config(Credentials::new(consumer_key, consumer_secret), Config::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(credentials: Credentials, config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(ApiClient {
            transport: Box::new(transport),
            session: AuthSession::new(credentials),
            config,
        })
    }

    /// Create a client around an existing session and transport
    pub fn with_transport(session: AuthSession, transport: Box<dyn Transport>) -> Self {
        ApiClient {
            transport,
            session,
            config: Config::default(),
        }
    }

    /// Replace the configuration
    pub fn with_settings(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AuthSession {
        &mut self.session
    }

    pub fn token_state(&self) -> TokenState {
        self.session.token_state()
    }

    /// OAuth step 1, see [`AuthSession::begin_handshake`]
    pub fn begin_handshake(&mut self) -> Result<RedirectInstruction> {
        self.session.begin_handshake(self.transport.as_ref())
    }

    /// OAuth step 3, see [`AuthSession::complete_handshake`]
    pub fn complete_handshake(&mut self, returned_token: &str) -> Result<TokenPair> {
        self.session.complete_handshake(self.transport.as_ref(), returned_token)
    }

    /// OAuth step 3 with `oauth_verifier`
    pub fn complete_handshake_with_verifier(&mut self, returned_token: &str, verifier: &str) -> Result<TokenPair> {
        self.session
            .complete_handshake_with_verifier(self.transport.as_ref(), returned_token, verifier)
    }

    /// Drive the handshake, see [`AuthSession::authorize`]
    pub fn authorize(&mut self, callback_token: Option<&str>) -> Result<HandshakeStep> {
        self.session.authorize(self.transport.as_ref(), callback_token)
    }

    /// Set whether non-success meta statuses are raised as errors
    pub fn throw_response_errors(&mut self, throw: bool) {
        self.config.throw_response_errors = throw;
    }

    /// Replace the meta statuses counted as success
    pub fn set_success_statuses(&mut self, statuses: impl IntoIterator<Item = i64>) {
        self.config.success_statuses = statuses.into_iter().collect();
    }

    /// The consumer key, used as `api_key` for public endpoints
    pub fn api_key(&self) -> &str {
        &self.session.credentials().consumer_key
    }

    pub fn api_url(&self) -> &str {
        API_URL
    }

    /// Render a [`RequestSpec`] and send it
    pub fn execute(&self, spec: &RequestSpec) -> Result<ApiResponse> {
        let uri = spec.uri(self.api_url())?;
        self.request(&uri, spec.requires_auth, spec.post_params.as_ref())
    }

    /// Render a [`RequestSpec`], send it and hand a successful response to `callback`
    pub fn execute_with<T>(&self, spec: &RequestSpec, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        self.execute(spec).map(callback)
    }

    /// Make a request to an API URI and return the decoded response
    ///
    /// # Arguments
    /// * `uri` - Full URI including query string
    /// * `requires_auth` - Sign with the session's access token
    /// * `post_params` - Form body; `None` or empty sends a GET
    pub fn request(&self, uri: &str, requires_auth: bool, post_params: Option<&Params>) -> Result<ApiResponse> {
        // Check credentials before anything touches the network
        let access = if requires_auth {
            match self.session.token_state() {
                TokenState::Authorized(pair) => Some(pair),
                _ => return Err(TumblrError::Auth("missing credentials".to_string())),
            }
        } else {
            None
        };

        let mut request = match post_params {
            Some(params) if !params.is_empty() => HttpRequest::post(
                uri,
                params.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            ),
            _ => HttpRequest::get(uri),
        };

        if let Some(pair) = access {
            request = self.session.sign(request, &pair.token, &pair.secret)?;
        }

        let http_response = self.transport.send(&request)?;
        let response = ApiResponse::parse(http_response.status, http_response.body)?;

        if !response.is_success(&self.config.success_statuses) {
            if self.config.throw_response_errors {
                log::warn!(
                    "[tumblr] {} {} failed: status {} {}",
                    request.method.as_str(),
                    uri,
                    response.meta.status,
                    response.meta.msg
                );
                return Err(TumblrError::from_response(response));
            }
            log::debug!(
                "[tumblr] {} {} returned status {}, passing through",
                request.method.as_str(),
                uri,
                response.meta.status
            );
        }

        Ok(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .field("config", &self.config)
            .finish()
    }
}

/// Error out on an empty required argument
pub(crate) fn require(value: &str, message: &str) -> Result<()> {
    if value.is_empty() {
        return Err(TumblrError::Validation(message.to_string()));
    }
    Ok(())
}
