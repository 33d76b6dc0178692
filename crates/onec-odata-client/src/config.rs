//! Connection configuration.

use onec_odata_core::http::DEFAULT_TIMEOUT;
use onec_odata_core::RequestOptions;
use std::time::Duration;

/// Proxy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy host
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Connect to the proxy over HTTPS
    pub secured: bool,
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Root of the published interface, e.g.
    /// <http://localhost/base/odata/standard.odata/>
    pub base_url: String,
    /// 1C user name for basic authentication
    pub username: Option<String>,
    /// Password for basic authentication
    pub password: Option<String>,
    /// Optional proxy
    pub proxy: Option<ProxyConfig>,
    /// Request timeout
    pub timeout: Duration,
    /// Extra headers sent with every request
    pub headers: Vec<(String, String)>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/base/odata/standard.odata/".to_string(),
            username: None,
            password: None,
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
        }
    }
}

impl ConnectionConfig {
    /// Shared request options described by this configuration.
    ///
    /// Authentication is only set when a user name is present; a missing
    /// password is sent as empty.
    #[must_use]
    pub fn request_options(&self) -> RequestOptions {
        let mut options = RequestOptions {
            timeout: self.timeout,
            ..RequestOptions::default()
        };

        if let Some(username) = &self.username {
            options.set_auth(username.as_str(), self.password.clone().unwrap_or_default());
        }

        if let Some(proxy) = &self.proxy {
            options.set_proxy(&proxy.host, proxy.port, proxy.secured);
        }

        for (name, value) in &self.headers {
            options.set_header(name.as_str(), value.as_str());
        }

        options
    }
}
