//! HTTP requests and responses as plain data.
//!
//! The core renders [`HttpRequest`] values and interprets [`HttpResponse`]
//! values. Executing the round-trip is the transport's job, which keeps
//! everything here deterministic.

use crate::encoding::{encode_path, encode_query};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Timeout applied when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP method used by the OData interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Read
    Get,
    /// Create, or invoke an action such as `Post`
    Post,
    /// Partial update
    Patch,
    /// Physical removal
    Delete,
}

impl HttpMethod {
    /// Upper-case method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic authentication credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// 1C user name
    pub username: String,
    /// Password, never printed by `Debug`
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Options shared by every request of a connection.
///
/// Setters replace the previous value of the same leaf; headers are keyed
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Basic authentication
    pub auth: Option<Credentials>,
    /// Proxy URL, e.g. `http://proxy:3128`
    pub proxy: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            auth: None,
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RequestOptions {
    /// Set or replace a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            slot.1 = value;
        } else {
            self.headers.push((name, value));
        }
    }

    /// Set basic authentication.
    pub fn set_auth(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.auth = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
    }

    /// Route requests through `scheme://host:port`, `https` when `secured`.
    pub fn set_proxy(&mut self, host: &str, port: u16, secured: bool) {
        let scheme = if secured { "https" } else { "http" };
        self.proxy = Some(format!("{scheme}://{host}:{port}"));
    }

    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A fully rendered request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Method
    pub method: HttpMethod,
    /// Absolute URL including the encoded query string
    pub url: String,
    /// JSON body for writes
    pub body: Option<Value>,
    /// Headers, auth, proxy and timeout
    pub options: RequestOptions,
}

impl HttpRequest {
    /// Render a request for `path` relative to `base_url`.
    ///
    /// `base_url` must end with `/`; `path` is percent-encoded and `params`
    /// become the query string.
    #[must_use]
    pub fn new(
        method: HttpMethod,
        base_url: &str,
        path: &str,
        params: &[(String, String)],
        options: RequestOptions,
    ) -> Self {
        let mut url = format!("{base_url}{}", encode_path(path.trim_start_matches('/')));
        if !params.is_empty() {
            url.push('?');
            url.push_str(&encode_query(params));
        }

        Self {
            method,
            url,
            body: None,
            options,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response returned by the transport.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Reason phrase. Transports may synthesize it from the status code, in
    /// which case a non-standard status carries an empty phrase.
    pub reason: String,
    /// Response headers in arrival order; names may repeat
    pub headers: Vec<(String, String)>,
    /// Raw body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// First value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// All values of a header, matched case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
