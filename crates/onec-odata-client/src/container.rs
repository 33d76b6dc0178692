//! Entity container: reads, writes and document actions on one collection.
//!
//! Query directives configured on a container are consumed by the next
//! operation. They apply to every request that operation makes, including
//! the read that follows a successful write, and the container starts the
//! following operation with an empty query.

use crate::connection::Session;
use crate::transport::TransportError;
use onec_odata_core::guid::{self, GuidError};
use onec_odata_core::{
    EntityName, HttpMethod, HttpRequest, IntoFields, ODataResponse, Query, RequestOptions,
    SortDirection,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Operations on one resolved entity collection.
pub struct EntityContainer {
    session: Arc<Session>,
    name: EntityName,
    wire_name: String,
    pending: Query,
    timeout: Option<Duration>,
    last_response: Option<ODataResponse>,
}

impl EntityContainer {
    pub(crate) fn new(session: Arc<Session>, name: EntityName) -> Self {
        let wire_name = name.wire_name();
        Self {
            session,
            name,
            wire_name,
            pending: Query::new(),
            timeout: None,
            last_response: None,
        }
    }

    /// Resolved entity name.
    #[must_use]
    pub fn name(&self) -> &EntityName {
        &self.name
    }

    /// Entity set name on the wire.
    #[must_use]
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Query that the next operation will use.
    #[must_use]
    pub fn pending_query(&self) -> &Query {
        &self.pending
    }

    /// Append properties to `$select`.
    pub fn select(&mut self, fields: impl IntoFields) -> &mut Self {
        self.pending.select(fields);
        self
    }

    /// Append navigation properties to `$expand`.
    pub fn expand(&mut self, fields: impl IntoFields) -> &mut Self {
        self.pending.expand(fields);
        self
    }

    /// Append `$filter` predicates.
    pub fn filter(&mut self, predicates: impl IntoFields) -> &mut Self {
        self.pending.filter(predicates);
        self
    }

    /// Replace `$orderby`.
    pub fn order_by(&mut self, field: &str, direction: SortDirection) -> &mut Self {
        self.pending.order_by(field, direction);
        self
    }

    /// Set `$top`.
    pub fn top(&mut self, quantity: u32) -> &mut Self {
        self.pending.top(quantity);
        self
    }

    /// Set `$skip`.
    pub fn offset(&mut self, quantity: u32) -> &mut Self {
        self.pending.skip(quantity);
        self
    }

    /// Keep OData metadata in read responses.
    pub fn metadata(&mut self) -> &mut Self {
        self.pending.metadata();
        self
    }

    /// Override the connection timeout for requests from this container.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the collection, or one entity when `guid` is given.
    ///
    /// With a `guid` the first returned entity is unwrapped. `None` means
    /// the server answered with an error status or returned nothing.
    ///
    /// # Errors
    ///
    /// Returns error if `guid` is malformed (before any request) or no
    /// response was received.
    pub async fn get(&mut self, guid: Option<&str>) -> Result<Option<Value>, ContainerError> {
        guid::ensure_valid(guid)?;
        let query = self.take_query();
        self.fetch(guid, &query).await
    }

    /// Create an entity and return it as stored by the server.
    ///
    /// # Errors
    ///
    /// Returns error if `data` cannot be serialized or no response was
    /// received.
    pub async fn create<T>(&mut self, data: &T) -> Result<Option<Value>, ContainerError>
    where
        T: Serialize + ?Sized,
    {
        self.update(data, None).await
    }

    /// Create (`guid` absent, POST) or patch (`guid` present, PATCH) an
    /// entity, then read it back.
    ///
    /// `None` means the write failed or the key of the created entity could
    /// not be determined.
    ///
    /// # Errors
    ///
    /// Returns error if `guid` is malformed (before any request), `data`
    /// cannot be serialized, or no response was received.
    pub async fn update<T>(
        &mut self,
        data: &T,
        guid: Option<&str>,
    ) -> Result<Option<Value>, ContainerError>
    where
        T: Serialize + ?Sized,
    {
        guid::ensure_valid(guid)?;
        let body =
            serde_json::to_value(data).map_err(|e| ContainerError::Serialize(e.to_string()))?;
        let query = self.take_query();
        self.write(body, guid, &query).await
    }

    /// Set the deletion mark.
    ///
    /// # Errors
    ///
    /// Same as [`EntityContainer::update`].
    pub async fn delete(&mut self, guid: &str) -> Result<Option<Value>, ContainerError> {
        self.update(&json!({ "DeletionMark": true }), Some(guid)).await
    }

    /// Clear the deletion mark.
    ///
    /// # Errors
    ///
    /// Same as [`EntityContainer::update`].
    pub async fn undelete(&mut self, guid: &str) -> Result<Option<Value>, ContainerError> {
        self.update(&json!({ "DeletionMark": false }), Some(guid)).await
    }

    /// Remove the entity from the infobase with HTTP DELETE.
    ///
    /// # Errors
    ///
    /// Returns error if `guid` is malformed (before any request) or no
    /// response was received.
    pub async fn delete_permanently(&mut self, guid: &str) -> Result<bool, ContainerError> {
        guid::ensure_valid(Some(guid))?;
        let query = self.take_query();
        let request = self.build_request(
            HttpMethod::Delete,
            &self.entity_path(Some(guid)),
            query.to_params(HttpMethod::Delete),
        );
        self.execute(request).await
    }

    /// Post a document, then read it back.
    ///
    /// `operational` selects the operational posting mode.
    ///
    /// # Errors
    ///
    /// Returns error if `guid` is malformed (before any request) or no
    /// response was received.
    pub async fn post(
        &mut self,
        guid: &str,
        operational: bool,
    ) -> Result<Option<Value>, ContainerError> {
        guid::ensure_valid(Some(guid))?;
        let query = self.take_query();
        let mut params = query.to_params(HttpMethod::Post);
        params.push((
            "PostingModeOperational".to_string(),
            operational.to_string(),
        ));
        self.action(guid, "Post", params, &query).await
    }

    /// Cancel posting of a document, then read it back.
    ///
    /// # Errors
    ///
    /// Returns error if `guid` is malformed (before any request) or no
    /// response was received.
    pub async fn unpost(&mut self, guid: &str) -> Result<Option<Value>, ContainerError> {
        guid::ensure_valid(Some(guid))?;
        let query = self.take_query();
        let params = query.to_params(HttpMethod::Post);
        self.action(guid, "Unpost", params, &query).await
    }

    /// Status code of the last response.
    #[must_use]
    pub fn response_code(&self) -> Option<u16> {
        self.last_response.as_ref().map(ODataResponse::status)
    }

    /// Reason phrase of the last response.
    ///
    /// With [`ReqwestTransport`](crate::ReqwestTransport) this is the
    /// canonical phrase for the status code, empty for non-standard codes.
    #[must_use]
    pub fn response_phrase(&self) -> Option<&str> {
        self.last_response.as_ref().map(ODataResponse::reason)
    }

    /// `odata.error.code` of the last response.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        self.last_response.as_ref()?.error_code()
    }

    /// `odata.error.message.value` of the last response.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.last_response.as_ref()?.error_message()
    }

    /// Last interpreted response.
    #[must_use]
    pub fn last_response(&self) -> Option<&ODataResponse> {
        self.last_response.as_ref()
    }

    fn take_query(&mut self) -> Query {
        std::mem::take(&mut self.pending)
    }

    fn entity_path(&self, guid: Option<&str>) -> String {
        match guid {
            Some(guid) => format!("{}(guid'{guid}')", self.wire_name),
            None => self.wire_name.clone(),
        }
    }

    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: Vec<(String, String)>,
    ) -> HttpRequest {
        let mut options = RequestOptions::clone(&self.session.options.load());
        if let Some(timeout) = self.timeout {
            options.timeout = timeout;
        }
        HttpRequest::new(method, &self.session.base_url, path, &params, options)
    }

    async fn fetch(
        &mut self,
        guid: Option<&str>,
        query: &Query,
    ) -> Result<Option<Value>, ContainerError> {
        let request = self.build_request(
            HttpMethod::Get,
            &self.entity_path(guid),
            query.to_params(HttpMethod::Get),
        );

        if !self.execute(request).await? {
            return Ok(None);
        }

        let values = self
            .last_response
            .as_ref()
            .map_or(Value::Null, ODataResponse::values);
        Ok(unwrap_values(values, guid.is_some()))
    }

    async fn write(
        &mut self,
        body: Value,
        guid: Option<&str>,
        query: &Query,
    ) -> Result<Option<Value>, ContainerError> {
        let method = if guid.is_some() {
            HttpMethod::Patch
        } else {
            HttpMethod::Post
        };
        let request = self
            .build_request(method, &self.entity_path(guid), query.to_params(method))
            .with_body(body);

        if !self.execute(request).await? {
            return Ok(None);
        }

        let affected = match guid {
            Some(guid) => Some(guid.to_string()),
            None => self
                .last_response
                .as_ref()
                .and_then(ODataResponse::last_created_id),
        };

        match affected {
            Some(key) if guid::is_valid(Some(&key)) => self.fetch(Some(&key), query).await,
            Some(key) => {
                tracing::warn!(
                    entity = %self.wire_name,
                    key,
                    "Location header carries a malformed key"
                );
                Ok(None)
            }
            None => {
                tracing::warn!(entity = %self.wire_name, "Created entity key not reported");
                Ok(None)
            }
        }
    }

    async fn action(
        &mut self,
        guid: &str,
        action: &str,
        params: Vec<(String, String)>,
        query: &Query,
    ) -> Result<Option<Value>, ContainerError> {
        let path = format!("{}/{action}", self.entity_path(Some(guid)));
        let request = self.build_request(HttpMethod::Post, &path, params);

        if self.execute(request).await? {
            self.fetch(Some(guid), query).await
        } else {
            Ok(None)
        }
    }

    /// Send `request`, remember the response and report whether it was 2xx.
    async fn execute(&mut self, request: HttpRequest) -> Result<bool, ContainerError> {
        tracing::debug!(method = %request.method, url = %request.url, "OData request");

        self.last_response = None;
        let response = ODataResponse::new(self.session.transport.send(&request).await?);
        let success = response.is_success();

        if success {
            tracing::debug!(status = response.status(), "OData response");
        } else {
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                status = response.status(),
                error_code = ?response.error_code(),
                error_message = ?response.error_message(),
                "OData request failed"
            );
        }

        self.last_response = Some(response);
        Ok(success)
    }
}

/// Reduce decoded values to the operation result.
///
/// Empty results become `None`; with `single`, the first element of an
/// array is returned.
fn unwrap_values(values: Value, single: bool) -> Option<Value> {
    match values {
        Value::Null => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if single => items.into_iter().next(),
        other => Some(other),
    }
}

/// Errors raised by container operations.
///
/// HTTP error statuses are not errors; see
/// [`EntityContainer::response_code`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContainerError {
    /// A key was not a well-formed GUID
    #[error(transparent)]
    InvalidGuidFormat(#[from] GuidError),
    /// No response was received
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Request body could not be serialized
    #[error("serialization error: {0}")]
    Serialize(String),
}
