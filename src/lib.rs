//! # tumblr - Tumblr API v2 client for Rust
//!
//! Object-oriented access to the Tumblr API v2 blog, user and tag-search
//! methods. Public methods authenticate with the application's API key,
//! private ones with OAuth 1.0a.
//!
//! ## Features
//!
//! - One request layer for both authentication schemes
//! - OAuth 1.0a handshake with pluggable state persistence
//! - HMAC-SHA1 request signing
//! - Uniform `{meta, response}` handling, raising or passing through
//!   non-success statuses
//! - Every method has a `_with` form that maps the response through a
//!   callback of any return type
//!
//! ## Basic Usage
//!
//! ```no_run
//! use tumblr::{ApiClient, Blog, Params};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("consumer_key", "consumer_secret")?;
//!
//!     let blog = Blog::with_hostname(&client, "staff.tumblr.com");
//!     let info = blog.get_info()?;
//!     println!("Status: {}", info.meta.status);
//!
//!     let title = blog.get_info_with(|r| r.get_string("blog/title"))?;
//!     println!("Title: {:?}", title);
//!
//!     let mut params = Params::new();
//!     params.insert("limit".to_string(), "5".to_string());
//!     let photos = blog.get_posts(Some("photo"), Some(&params))?;
//!     println!("{}", photos.raw_body);
//!     Ok(())
//! }
//! ```
//!
//! ## OAuth
//!
//! The handshake crosses a browser redirect, so it runs in two interactions.
//! Persist the session state between them with a [`SessionStore`].
//!
//! ```no_run
//! use tumblr::{ApiClient, HandshakeStep, User};
//!
//! # fn callback_token() -> Option<String> { None }
//! let mut client = ApiClient::new("consumer_key", "consumer_secret")?;
//!
//! match client.authorize(callback_token().as_deref())? {
//!     HandshakeStep::Redirect(redirect) => {
//!         // send the user to redirect.location and stop here
//!         println!("Location: {}", redirect.location);
//!     }
//!     HandshakeStep::Authorized(_) => {
//!         let dashboard = User::new(&client).get_dashboard(None)?;
//!         println!("{}", dashboard.meta.msg);
//!     }
//! }
//! # Ok::<(), tumblr::TumblrError>(())
//! ```

pub mod api;
pub mod blog;
pub mod client;
pub mod error;
pub mod oauth;
pub mod response;
pub mod session;
pub mod tagged;
pub mod token;
pub mod transport;
pub mod user;

// Re-export main types for convenience
pub use api::{ApiClient, AuthMode, Params, RequestSpec};
pub use blog::Blog;
pub use client::{Config, Credentials, API_URL};
pub use error::{ErrorKind, Result, TumblrError};
pub use oauth::{HandshakeParams, OAuthSigner, SignedRequest};
pub use response::{ApiResponse, Meta};
pub use session::{AuthSession, HandshakeStep, MemoryStore, RedirectInstruction, SessionStore};
pub use tagged::Tagged;
pub use token::{TokenPair, TokenState};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use user::User;

// Re-export serde_json for convenience
pub use serde_json::json;
