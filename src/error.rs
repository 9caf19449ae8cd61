use crate::response::ApiResponse;
use thiserror::Error;

/// Broad classification of a [`TumblrError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing client setup (hostname, credentials)
    Config,
    /// Missing or invalid call argument, raised before any network call
    Validation,
    /// OAuth handshake or token problem
    Auth,
    /// Malformed or unsuccessful API response
    Response,
    /// HTTP, JSON or URL plumbing failure
    Transport,
}

/// Main error type for Tumblr API operations
#[derive(Debug, Error)]
pub enum TumblrError {
    /// Required setup is missing
    #[error("configuration error: {0}")]
    Config(String),

    /// A required argument was not supplied
    #[error("validation error: {0}")]
    Validation(String),

    /// OAuth handshake or credentials problem
    #[error("auth error: {0}")]
    Auth(String),

    /// The body did not decode to a JSON value
    #[error("no response returned")]
    NoResponse,

    /// The API answered with a non-success meta status
    #[error("status: {status}, msg: {message}{}", errors_suffix(.errors))]
    Api {
        status: i64,
        message: String,
        errors: Option<String>,
        response: Box<ApiResponse>,
    },

    /// HTTP transport error without a usable body
    #[error("HTTP error {status}: {body}")]
    Http {
        status: u16,
        body: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl TumblrError {
    /// Create an API error from a response whose meta status is not a success
    pub fn from_response(response: ApiResponse) -> Self {
        TumblrError::Api {
            status: response.meta.status,
            message: response.meta.msg.clone(),
            errors: response.errors_detail(),
            response: Box::new(response),
        }
    }

    /// Create a new HTTP error
    pub fn http(status: u16, body: String, source: Option<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        TumblrError::Http { status, body, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TumblrError::Config(_) => ErrorKind::Config,
            TumblrError::Validation(_) => ErrorKind::Validation,
            TumblrError::Auth(_) => ErrorKind::Auth,
            TumblrError::NoResponse | TumblrError::Api { .. } => ErrorKind::Response,
            TumblrError::Http { .. }
            | TumblrError::Json(_)
            | TumblrError::Reqwest(_)
            | TumblrError::UrlParse(_) => ErrorKind::Transport,
        }
    }

    /// Check if this error comes from a malformed or unsuccessful response
    pub fn is_response_error(&self) -> bool {
        self.kind() == ErrorKind::Response
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, TumblrError::Api { status: 404, .. })
    }

    /// Get the meta status for API errors, or the HTTP status for transport errors
    pub fn status_code(&self) -> Option<i64> {
        match self {
            TumblrError::Api { status, .. } => Some(*status),
            TumblrError::Http { status, .. } => Some(*status as i64),
            _ => None,
        }
    }
}

fn errors_suffix(errors: &Option<String>) -> String {
    match errors {
        Some(errors) => format!(", errors: {}", errors),
        None => String::new(),
    }
}

/// Result type for Tumblr operations
pub type Result<T> = std::result::Result<T, TumblrError>;
