//! HTTP transport behind the containers.
//!
//! A [`Transport`] executes one rendered [`HttpRequest`]. Every HTTP status,
//! including 4xx and 5xx, comes back as `Ok`; only failures that produce no
//! response at all are errors.

use async_trait::async_trait;
use onec_odata_core::{HttpMethod, HttpRequest, HttpResponse};
use reqwest::{Client, Method, Proxy, StatusCode};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Executes rendered requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever the server answered.
    ///
    /// The status line's reason phrase is not guaranteed to be the one the
    /// server sent; [`ReqwestTransport`] derives it from the status code.
    ///
    /// # Errors
    ///
    /// Returns error if no response was received or its body could not be
    /// read.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
///
/// Proxies are a client-level setting in `reqwest`, so one client is built
/// per distinct proxy URL and reused afterwards.
pub struct ReqwestTransport {
    client: Client,
    proxied: Mutex<HashMap<String, Client>>,
}

impl ReqwestTransport {
    /// Create a transport with a direct (unproxied) client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(None)?,
            proxied: Mutex::new(HashMap::new()),
        })
    }

    fn client_for(&self, proxy: Option<&str>) -> Result<Client, TransportError> {
        let Some(proxy) = proxy else {
            return Ok(self.client.clone());
        };

        let mut proxied = self.proxied.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = proxied.get(proxy) {
            return Ok(client.clone());
        }

        let client = build_client(Some(proxy))?;
        tracing::debug!(proxy, "Built proxied HTTP client");
        proxied.insert(proxy.to_string(), client.clone());
        Ok(client)
    }
}

fn build_client(proxy: Option<&str>) -> Result<Client, TransportError> {
    let mut builder = Client::builder().use_rustls_tls();

    if let Some(proxy) = proxy {
        let proxy = Proxy::all(proxy)
            .map_err(|e| TransportError::Init(format!("invalid proxy {proxy}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| TransportError::Init(e.to_string()))
}

/// Canonical phrase for `status`, empty for non-standard codes.
///
/// HTTP/2 has no reason phrase and `reqwest` does not expose the HTTP/1.1
/// one, so the phrase is derived from the code.
fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let options = &request.options;
        let client = self.client_for(options.proxy.as_deref())?;

        let mut builder = client
            .request(to_method(request.method), &request.url)
            .timeout(options.timeout);

        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(auth) = &options.auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: reason_phrase(status),
            headers,
            body: body.to_vec(),
        })
    }
}

/// Errors that can occur in the transport.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// Request failed before a response arrived
    #[error("request error: {0}")]
    Request(String),
    /// Response body could not be read
    #[error("body read error: {0}")]
    Body(String),
}
