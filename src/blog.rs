//! Blog methods: `/blog/{base-hostname}/...`

use std::convert::identity;

use crate::api::{require, ApiClient, AuthMode, Params, RequestSpec};
use crate::error::{Result, TumblrError};
use crate::response::ApiResponse;

/// Post listings only the blog owner may read.
const PRIVATE_POST_TYPES: [&str; 3] = ["queue", "draft", "submission"];

/// Blog endpoint group bound to one target blog.
#[derive(Debug, Clone)]
pub struct Blog<'a> {
    client: &'a ApiClient,
    base_hostname: Option<String>,
}

impl<'a> Blog<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Blog {
            client,
            base_hostname: None,
        }
    }

    /// Create a Blog already targeting `base_hostname`, e.g. `staff.tumblr.com`
    pub fn with_hostname(client: &'a ApiClient, base_hostname: impl Into<String>) -> Self {
        let mut blog = Blog::new(client);
        blog.set_base_hostname(base_hostname);
        blog
    }

    /// Set the target blog. An empty hostname unsets it.
    pub fn set_base_hostname(&mut self, base_hostname: impl Into<String>) {
        let base_hostname = base_hostname.into();
        self.base_hostname = Some(base_hostname).filter(|h| !h.is_empty());
    }

    pub fn base_hostname(&self) -> Option<&str> {
        self.base_hostname.as_deref()
    }

    /// Retrieve blog info. GET, API key.
    pub fn get_info(&self) -> Result<ApiResponse> {
        self.get_info_with(identity)
    }

    /// [`get_info`](Self::get_info), returning `callback`'s result
    pub fn get_info_with<T>(&self, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        self.client
            .execute_with(&self.prepare("/info", None, AuthMode::ApiKey)?, callback)
    }

    /// Retrieve the blog's likes. GET, API key.
    pub fn get_likes(&self, params: Option<&Params>) -> Result<ApiResponse> {
        self.get_likes_with(params, identity)
    }

    pub fn get_likes_with<T>(&self, params: Option<&Params>, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        self.client
            .execute_with(&self.prepare("/likes", params, AuthMode::ApiKey)?, callback)
    }

    /// Retrieve the blog's followers. GET, OAuth.
    pub fn get_followers(&self, params: Option<&Params>) -> Result<ApiResponse> {
        self.get_followers_with(params, identity)
    }

    pub fn get_followers_with<T>(&self, params: Option<&Params>, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        self.client
            .execute_with(&self.prepare("/followers", params, AuthMode::OAuth)?, callback)
    }

    /// Retrieve posts, optionally of one type (`text`, `photo`, ...).
    /// `queue`, `draft` and `submission` list private posts and need OAuth.
    pub fn get_posts(&self, post_type: Option<&str>, params: Option<&Params>) -> Result<ApiResponse> {
        self.get_posts_with(post_type, params, identity)
    }

    pub fn get_posts_with<T>(
        &self,
        post_type: Option<&str>,
        params: Option<&Params>,
        callback: impl FnOnce(ApiResponse) -> T,
    ) -> Result<T> {
        self.client
            .execute_with(&self.posts_spec(post_type, params)?, callback)
    }

    /// Retrieve a published post by ID. GET, API key.
    pub fn get_post(&self, id: &str) -> Result<ApiResponse> {
        self.get_post_with(id, identity)
    }

    pub fn get_post_with<T>(&self, id: &str, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        require(id, "ID is required")?;
        let mut params = Params::new();
        params.insert("id".to_string(), id.to_string());
        self.get_posts_with(None, Some(&params), callback)
    }

    /// Create a new post. POST, OAuth.
    /// Only `post_type` is checked here, the API validates the rest.
    pub fn add_post(&self, post_type: &str, params: Option<&Params>) -> Result<ApiResponse> {
        self.add_post_with(post_type, params, identity)
    }

    pub fn add_post_with<T>(
        &self,
        post_type: &str,
        params: Option<&Params>,
        callback: impl FnOnce(ApiResponse) -> T,
    ) -> Result<T> {
        require(post_type, "type is required")?;
        let form = merged(("type", post_type), params);
        self.client
            .execute_with(&self.prepare("/post", None, AuthMode::OAuth)?.with_post(form), callback)
    }

    /// Edit a post. POST, OAuth.
    pub fn edit_post(&self, id: &str, params: Option<&Params>) -> Result<ApiResponse> {
        self.edit_post_with(id, params, identity)
    }

    pub fn edit_post_with<T>(
        &self,
        id: &str,
        params: Option<&Params>,
        callback: impl FnOnce(ApiResponse) -> T,
    ) -> Result<T> {
        require(id, "ID is required")?;
        let form = merged(("id", id), params);
        self.client
            .execute_with(&self.prepare("/post/edit", None, AuthMode::OAuth)?.with_post(form), callback)
    }

    /// Delete a post. POST, OAuth.
    pub fn delete_post(&self, id: &str) -> Result<ApiResponse> {
        self.delete_post_with(id, identity)
    }

    pub fn delete_post_with<T>(&self, id: &str, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        require(id, "ID is required")?;
        let form = merged(("id", id), None);
        self.client
            .execute_with(&self.prepare("/post/delete", None, AuthMode::OAuth)?.with_post(form), callback)
    }

    /// Reblog a post, with an optional comment. POST, OAuth.
    pub fn reblog_post(&self, id: &str, reblog_key: &str, comment: Option<&str>) -> Result<ApiResponse> {
        self.reblog_post_with(id, reblog_key, comment, identity)
    }

    pub fn reblog_post_with<T>(
        &self,
        id: &str,
        reblog_key: &str,
        comment: Option<&str>,
        callback: impl FnOnce(ApiResponse) -> T,
    ) -> Result<T> {
        if id.is_empty() || reblog_key.is_empty() {
            return Err(TumblrError::Validation("ID and reblog_key are required".to_string()));
        }
        let mut form = merged(("id", id), None);
        form.insert("reblog_key".to_string(), reblog_key.to_string());
        if let Some(comment) = comment {
            form.insert("comment".to_string(), comment.to_string());
        }
        self.client
            .execute_with(&self.prepare("/post/reblog", None, AuthMode::OAuth)?.with_post(form), callback)
    }

    fn posts_spec(&self, post_type: Option<&str>, params: Option<&Params>) -> Result<RequestSpec> {
        match post_type.filter(|t| !t.is_empty()) {
            Some(post_type) => {
                let auth = if PRIVATE_POST_TYPES.contains(&post_type) {
                    AuthMode::OAuth
                } else {
                    AuthMode::ApiKey
                };
                self.prepare(&format!("/posts/{}", post_type), params, auth)
            }
            None => self.prepare("/posts", params, AuthMode::ApiKey),
        }
    }

    /// Build the request for a blog path; fails before anything else without a hostname
    fn prepare(&self, path: &str, params: Option<&Params>, auth: AuthMode) -> Result<RequestSpec> {
        let hostname = self
            .base_hostname
            .as_deref()
            .ok_or_else(|| TumblrError::Config("base hostname not set".to_string()))?;

        let mut spec = RequestSpec::new(
            format!("/blog/{}/{}", hostname, path.trim_matches('/')),
            auth,
        )
        .with_query(params);
        if auth == AuthMode::ApiKey {
            spec = spec.with_query_param("api_key", self.client.api_key());
        }
        Ok(spec)
    }
}

/// Identifying field first, caller parameters on top
fn merged(first: (&str, &str), params: Option<&Params>) -> Params {
    let mut form = Params::new();
    form.insert(first.0.to_string(), first.1.to_string());
    if let Some(params) = params {
        form.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    form
}
