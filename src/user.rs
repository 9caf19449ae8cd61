//! User methods: `/user/...`, all signed with the session's access token.

use std::convert::identity;

use crate::api::{require, ApiClient, AuthMode, Params, RequestSpec};
use crate::error::{Result, TumblrError};
use crate::response::ApiResponse;

/// User endpoint group for the authorized account.
#[derive(Debug, Clone)]
pub struct User<'a> {
    client: &'a ApiClient,
}

impl<'a> User<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        User { client }
    }

    /// Get the user's information. GET.
    pub fn get_info(&self) -> Result<ApiResponse> {
        self.get_info_with(identity)
    }

    /// [`get_info`](Self::get_info), returning `callback`'s result
    pub fn get_info_with<T>(&self, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        self.client.execute_with(&spec("/info", None), callback)
    }

    /// Retrieve the user's dashboard. GET.
    pub fn get_dashboard(&self, params: Option<&Params>) -> Result<ApiResponse> {
        self.get_dashboard_with(params, identity)
    }

    pub fn get_dashboard_with<T>(&self, params: Option<&Params>, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        self.client.execute_with(&spec("/dashboard", params), callback)
    }

    /// Retrieve the user's likes. GET.
    pub fn get_likes(&self, params: Option<&Params>) -> Result<ApiResponse> {
        self.get_likes_with(params, identity)
    }

    pub fn get_likes_with<T>(&self, params: Option<&Params>, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        self.client.execute_with(&spec("/likes", params), callback)
    }

    /// Retrieve the blogs the user follows. GET.
    pub fn get_following(&self, params: Option<&Params>) -> Result<ApiResponse> {
        self.get_following_with(params, identity)
    }

    pub fn get_following_with<T>(&self, params: Option<&Params>, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        self.client.execute_with(&spec("/following", params), callback)
    }

    /// Follow a blog. POST.
    pub fn follow_blog(&self, url: &str) -> Result<ApiResponse> {
        self.follow_blog_with(url, identity)
    }

    pub fn follow_blog_with<T>(&self, url: &str, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        require(url, "url is required")?;
        self.client
            .execute_with(&spec("/follow", None).with_post(form(&[("url", url)])), callback)
    }

    /// Unfollow a blog. POST.
    pub fn unfollow_blog(&self, url: &str) -> Result<ApiResponse> {
        self.unfollow_blog_with(url, identity)
    }

    pub fn unfollow_blog_with<T>(&self, url: &str, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        require(url, "url is required")?;
        self.client
            .execute_with(&spec("/unfollow", None).with_post(form(&[("url", url)])), callback)
    }

    /// Like a post. POST.
    pub fn like_post(&self, id: &str, reblog_key: &str) -> Result<ApiResponse> {
        self.like_post_with(id, reblog_key, identity)
    }

    pub fn like_post_with<T>(&self, id: &str, reblog_key: &str, callback: impl FnOnce(ApiResponse) -> T) -> Result<T> {
        check_post_ref(id, reblog_key)?;
        let form = form(&[("id", id), ("reblog_key", reblog_key)]);
        self.client.execute_with(&spec("/like", None).with_post(form), callback)
    }

    /// Unlike a post. POST.
    pub fn unlike_post(&self, id: &str, reblog_key: &str) -> Result<ApiResponse> {
        self.unlike_post_with(id, reblog_key, identity)
    }

    pub fn unlike_post_with<T>(
        &self,
        id: &str,
        reblog_key: &str,
        callback: impl FnOnce(ApiResponse) -> T,
    ) -> Result<T> {
        check_post_ref(id, reblog_key)?;
        let form = form(&[("id", id), ("reblog_key", reblog_key)]);
        self.client.execute_with(&spec("/unlike", None).with_post(form), callback)
    }
}

fn spec(path: &str, params: Option<&Params>) -> RequestSpec {
    RequestSpec::new(format!("/user/{}", path.trim_matches('/')), AuthMode::OAuth).with_query(params)
}

fn form(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn check_post_ref(id: &str, reblog_key: &str) -> Result<()> {
    if id.is_empty() || reblog_key.is_empty() {
        return Err(TumblrError::Validation("ID and reblog_key are required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpMethod;

    #[test]
    fn test_spec_paths() {
        let mut params = Params::new();
        params.insert("offset".to_string(), "20".to_string());
        let spec = spec("/dashboard", Some(&params));
        assert_eq!(spec.path, "/user/dashboard");
        assert!(spec.requires_auth);
        assert_eq!(
            spec.uri("http://api.tumblr.com/v2").unwrap(),
            "http://api.tumblr.com/v2/user/dashboard?offset=20"
        );
    }

    #[test]
    fn test_post_ref_validation() {
        assert!(check_post_ref("1", "k").is_ok());
        assert!(matches!(check_post_ref("", "k"), Err(TumblrError::Validation(_))));
        assert!(matches!(check_post_ref("1", ""), Err(TumblrError::Validation(_))));
    }

    #[test]
    fn test_follow_spec_posts_form() {
        let spec = spec("/follow", None).with_post(form(&[("url", "staff.tumblr.com")]));
        assert_eq!(spec.method(), HttpMethod::Post);
        assert!(spec.query_params.is_empty());
    }
}
