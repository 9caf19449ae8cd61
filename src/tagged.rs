//! Tag search: `/tagged`

use std::convert::identity;

use crate::api::{require, ApiClient, AuthMode, Params, RequestSpec};
use crate::error::Result;
use crate::response::ApiResponse;

/// Tagged endpoint group.
#[derive(Debug, Clone)]
pub struct Tagged<'a> {
    client: &'a ApiClient,
}

impl<'a> Tagged<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Tagged { client }
    }

    /// Get posts with a tag. GET, API key.
    pub fn get_posts(&self, tag: &str, params: Option<&Params>) -> Result<ApiResponse> {
        self.get_posts_with(tag, params, identity)
    }

    /// [`get_posts`](Self::get_posts), returning `callback`'s result
    pub fn get_posts_with<T>(
        &self,
        tag: &str,
        params: Option<&Params>,
        callback: impl FnOnce(ApiResponse) -> T,
    ) -> Result<T> {
        self.client.execute_with(&self.posts_spec(tag, params)?, callback)
    }

    fn posts_spec(&self, tag: &str, params: Option<&Params>) -> Result<RequestSpec> {
        require(tag, "tag is required")?;
        Ok(RequestSpec::new("/tagged", AuthMode::ApiKey)
            .with_query(params)
            .with_query_param("tag", tag)
            .with_query_param("api_key", self.client.api_key()))
    }
}
