//! HTTP transport described as plain data.
//!
//! The client builds [`HttpRequest`] values and hands them to a [`Transport`],
//! which performs the round trip and returns the status and body. A transport
//! must return the body for non-2xx statuses as well: the API sends structured
//! JSON errors with 4xx codes.

use reqwest::blocking::Client;
use reqwest::Method;

use crate::client::{create_rest_client, Config};
use crate::error::Result;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Full URL including the query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form fields sent as `application/x-www-form-urlencoded`
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            form,
        }
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Executes one HTTP round trip.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(ReqwestTransport {
            client: create_rest_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self.client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method == HttpMethod::Post {
            builder = builder.form(&request.form);
        }

        let start = std::time::Instant::now();
        let http_response = builder.send()?;
        let status = http_response.status();

        // reqwest does not fail on 4xx/5xx, so the error body is still readable here
        let body = http_response.text()?;

        log::debug!(
            "[tumblr] {} {} => {:?} (status: {})",
            request.method.as_str(),
            request.url,
            start.elapsed(),
            status
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
