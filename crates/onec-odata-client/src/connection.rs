//! Connection to one published 1C infobase.

use crate::config::ConnectionConfig;
use crate::container::EntityContainer;
use crate::transport::{ReqwestTransport, Transport, TransportError};
use arc_swap::ArcSwap;
use onec_odata_core::{resolve, EntityPathError, RequestOptions};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// State shared by a connection and all of its containers.
pub(crate) struct Session {
    pub(crate) base_url: String,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) options: ArcSwap<RequestOptions>,
}

/// Entry point: base URL, shared request options and a lazy container cache.
///
/// Option setters take effect for every later request, including requests
/// from containers created before the change.
pub struct Connection {
    session: Arc<Session>,
    containers: HashMap<String, EntityContainer>,
}

impl Connection {
    /// Connect to `base_url` with default options over `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client cannot be
    /// created.
    pub fn new(base_url: &str) -> Result<Self, ConnectionError> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(base_url, Arc::new(transport))
    }

    /// Connect to `base_url` through a custom transport.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid.
    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConnectionError> {
        Self::build(base_url, transport, RequestOptions::default())
    }

    /// Connect using a [`ConnectionConfig`] over `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client cannot be
    /// created.
    pub fn from_config(config: &ConnectionConfig) -> Result<Self, ConnectionError> {
        let transport = ReqwestTransport::new()?;
        Self::from_config_with_transport(config, Arc::new(transport))
    }

    /// Connect using a [`ConnectionConfig`] through a custom transport.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid.
    pub fn from_config_with_transport(
        config: &ConnectionConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConnectionError> {
        Self::build(&config.base_url, transport, config.request_options())
    }

    fn build(
        base_url: &str,
        transport: Arc<dyn Transport>,
        options: RequestOptions,
    ) -> Result<Self, ConnectionError> {
        let base_url = normalize_base_url(base_url)?;
        tracing::debug!(base_url, "OData connection created");

        Ok(Self {
            session: Arc::new(Session {
                base_url,
                transport,
                options: ArcSwap::from_pointee(options),
            }),
            containers: HashMap::new(),
        })
    }

    /// Base URL, always ending with `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.session.base_url
    }

    /// Snapshot of the shared request options.
    #[must_use]
    pub fn options(&self) -> RequestOptions {
        RequestOptions::clone(&self.session.options.load())
    }

    /// Use basic authentication.
    pub fn set_auth(&self, username: &str, password: &str) {
        self.update_options(|options| options.set_auth(username, password));
    }

    /// Route requests through a proxy.
    pub fn set_proxy(&self, host: &str, port: u16, secured: bool) {
        self.update_options(|options| options.set_proxy(host, port, secured));
    }

    /// Override the request timeout.
    pub fn set_timeout(&self, timeout: Duration) {
        self.update_options(|options| options.timeout = timeout);
    }

    /// Set or replace a header sent with every request.
    pub fn set_header(&self, name: &str, value: &str) {
        self.update_options(|options| options.set_header(name, value));
    }

    fn update_options(&self, apply: impl FnOnce(&mut RequestOptions)) {
        let mut next = RequestOptions::clone(&self.session.options.load());
        apply(&mut next);
        self.session.options.store(Arc::new(next));
    }

    /// Container for a `Category/Object` path, created on first use.
    ///
    /// Containers are cached by the exact path string, so a later call with
    /// the same path returns the same container.
    ///
    /// # Errors
    ///
    /// Returns [`EntityPathError`] if the path cannot be resolved; nothing
    /// is cached in that case.
    pub fn container(&mut self, path: &str) -> Result<&mut EntityContainer, EntityPathError> {
        match self.containers.entry(path.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let name = resolve(path)?;
                tracing::debug!(path, entity = %name, "Entity container created");
                Ok(entry.insert(EntityContainer::new(Arc::clone(&self.session), name)))
            }
        }
    }

    /// Whether a container for `path` has been created.
    #[must_use]
    pub fn has_container(&self, path: &str) -> bool {
        self.containers.contains_key(path)
    }
}

/// Validate `base_url` and make sure it ends with `/`.
///
/// Entity paths are appended to the base, so a query or fragment is
/// rejected.
fn normalize_base_url(base_url: &str) -> Result<String, ConnectionError> {
    let invalid = |reason: String| ConnectionError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if parsed.query().is_some() {
        return Err(invalid("query string not allowed".to_string()));
    }
    if parsed.fragment().is_some() {
        return Err(invalid("fragment not allowed".to_string()));
    }

    if base_url.ends_with('/') {
        Ok(base_url.to_string())
    } else {
        Ok(format!("{base_url}/"))
    }
}

/// Errors that can occur while creating a connection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    /// Base URL could not be parsed
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// URL as given
        url: String,
        /// Parser message
        reason: String,
    },
    /// HTTP client could not be created
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use onec_odata_core::{HttpRequest, HttpResponse};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(HttpResponse {
                status: 200,
                reason: "OK".to_string(),
                headers: Vec::new(),
                body: br#"{"value":[]}"#.to_vec(),
            })
        }
    }

    fn connection(recorder: &Arc<Recorder>) -> Connection {
        Connection::with_transport("http://host/base/odata/standard.odata", recorder.clone())
            .unwrap()
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let recorder = Arc::new(Recorder::default());
        assert_eq!(
            connection(&recorder).base_url(),
            "http://host/base/odata/standard.odata/"
        );

        let conn = Connection::with_transport("http://host/odata/", recorder).unwrap();
        assert_eq!(conn.base_url(), "http://host/odata/");
    }

    #[test]
    fn invalid_base_url_rejected() {
        let recorder = Arc::new(Recorder::default());
        for url in ["", "host/odata", "http://"] {
            let result = Connection::with_transport(url, recorder.clone());
            assert!(
                matches!(result, Err(ConnectionError::InvalidBaseUrl { .. })),
                "{url:?}"
            );
        }
    }

    #[test]
    fn base_url_with_query_or_fragment_rejected() {
        let recorder = Arc::new(Recorder::default());
        for url in [
            "http://host/odata/standard.odata?sys=1",
            "http://host/odata/standard.odata/?",
            "http://host/odata/standard.odata#top",
        ] {
            let result = Connection::with_transport(url, recorder.clone());
            assert!(
                matches!(result, Err(ConnectionError::InvalidBaseUrl { .. })),
                "{url:?}"
            );
        }
    }

    #[test]
    fn containers_are_cached_by_path() {
        let recorder = Arc::new(Recorder::default());
        let mut conn = connection(&recorder);

        conn.container("Справочник/Номенклатура")
            .unwrap()
            .select(["Ref_Key"]);
        assert!(conn.has_container("Справочник/Номенклатура"));

        let again = conn.container("Справочник/Номенклатура").unwrap();
        assert_eq!(again.wire_name(), "Catalog_Номенклатура");
        assert!(!again.pending_query().is_empty());

        let other = conn.container("Документ/Заказ").unwrap();
        assert!(other.pending_query().is_empty());
    }

    #[test]
    fn unresolvable_path_is_not_cached() {
        let recorder = Arc::new(Recorder::default());
        let mut conn = connection(&recorder);

        assert!(matches!(
            conn.container("Каталог/Номенклатура"),
            Err(EntityPathError::UnknownCategory(_))
        ));
        assert!(!conn.has_container("Каталог/Номенклатура"));
    }

    #[test]
    fn option_setters_merge() {
        let recorder = Arc::new(Recorder::default());
        let conn = connection(&recorder);

        conn.set_auth("user", "one");
        conn.set_auth("admin", "two");
        conn.set_proxy("proxy.local", 3128, true);
        conn.set_timeout(Duration::from_secs(10));
        conn.set_header("X-Trace", "abc");

        let options = conn.options();
        let auth = options.auth.as_ref().unwrap();
        assert_eq!(auth.username, "admin");
        assert_eq!(auth.password, "two");
        assert_eq!(options.proxy.as_deref(), Some("https://proxy.local:3128"));
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.header("Accept"), Some("application/json"));
        assert_eq!(options.header("x-trace"), Some("abc"));
    }

    #[test]
    fn later_options_reach_existing_containers() {
        let recorder = Arc::new(Recorder::default());
        let mut conn = connection(&recorder);
        conn.container("Справочник/Валюты").unwrap();

        conn.set_auth("admin", "secret");
        conn.set_timeout(Duration::from_secs(5));

        let container = conn.container("Справочник/Валюты").unwrap();
        tokio_test::block_on(container.get(None)).unwrap();

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let options = &requests[0].options;
        assert_eq!(options.auth.as_ref().unwrap().username, "admin");
        assert_eq!(options.timeout, Duration::from_secs(5));
    }
}
