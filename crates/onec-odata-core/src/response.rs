//! Interpretation of OData responses.
//!
//! 1C answers in three shapes:
//!
//! - collections wrapped as `{"value": [...]}`
//! - a single object carrying its `Ref_Key`
//! - an error envelope `{"odata.error": {"code": ..., "message": {"value": ...}}}`,
//!   sometimes with a status that looks successful
//!
//! Creation responses report the new key only in the `Location` header.

use crate::http::HttpResponse;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn location_guid() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"guid'(.*?)'").expect("Location pattern is valid"))
}

/// An interpreted response with a lazily decoded body.
#[derive(Debug)]
pub struct ODataResponse {
    inner: HttpResponse,
    body: OnceLock<Option<Value>>,
}

impl ODataResponse {
    /// Wrap a transport response.
    #[must_use]
    pub fn new(inner: HttpResponse) -> Self {
        Self {
            inner,
            body: OnceLock::new(),
        }
    }

    /// Status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.inner.status
    }

    /// Reason phrase as reported by the transport.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.inner.reason
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.inner.status)
    }

    /// First value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.header(name)
    }

    /// The underlying transport response.
    #[must_use]
    pub fn raw(&self) -> &HttpResponse {
        &self.inner
    }

    /// Decoded JSON body, parsed on first access.
    ///
    /// Empty or non-JSON bodies decode to `None`.
    pub fn body(&self) -> Option<&Value> {
        self.body
            .get_or_init(|| {
                if self.inner.body.is_empty() {
                    return None;
                }
                match serde_json::from_slice(&self.inner.body) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::debug!(
                            status = self.inner.status,
                            error = %e,
                            "Response body is not JSON"
                        );
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Read one top-level field of the decoded body.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body().and_then(|body| body.get(name))
    }

    /// Entities carried by the response.
    ///
    /// A `value` envelope yields its content, an object with `Ref_Key` is
    /// wrapped into a one-element array, and anything else is returned as
    /// decoded. A missing body yields `Value::Null`.
    #[must_use]
    pub fn values(&self) -> Value {
        let Some(body) = self.body() else {
            return Value::Null;
        };

        if let Some(value) = body.get("value") {
            return value.clone();
        }

        if body.get("Ref_Key").is_some() {
            return Value::Array(vec![body.clone()]);
        }

        body.clone()
    }

    /// `odata.error.code`, rendered as a string whether 1C sent a string or
    /// a number.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        match self.body()?.get("odata.error")?.get("code")? {
            Value::String(code) => Some(code.clone()),
            Value::Number(code) => Some(code.to_string()),
            _ => None,
        }
    }

    /// `odata.error.message.value`.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.body()?
            .get("odata.error")?
            .get("message")?
            .get("value")?
            .as_str()
            .map(str::to_string)
    }

    /// GUID of the entity just created, taken from the `Location` header.
    #[must_use]
    pub fn last_created_id(&self) -> Option<String> {
        let location = self
            .inner
            .header_values("Location")
            .collect::<Vec<_>>()
            .join(" ");
        location_guid()
            .captures(&location)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl From<HttpResponse> for ODataResponse {
    fn from(inner: HttpResponse) -> Self {
        Self::new(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> ODataResponse {
        ODataResponse::new(HttpResponse {
            status,
            reason: "OK".to_string(),
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        })
    }

    fn with_location(location: &str) -> ODataResponse {
        ODataResponse::new(HttpResponse {
            status: 201,
            reason: "Created".to_string(),
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        })
    }

    #[test]
    fn collection_envelope_unwrapped() {
        let r = response(200, r#"{"value":[{"a":1}]}"#);
        assert_eq!(r.values(), json!([{"a": 1}]));
    }

    #[test]
    fn singleton_wrapped_into_list() {
        let r = response(200, r#"{"Ref_Key":"x"}"#);
        assert_eq!(r.values(), json!([{"Ref_Key": "x"}]));
    }

    #[test]
    fn other_bodies_returned_unchanged() {
        let r = response(200, r#"{"foo":1}"#);
        assert_eq!(r.values(), json!({"foo": 1}));

        let r = response(200, "42");
        assert_eq!(r.values(), json!(42));
    }

    #[test]
    fn empty_and_invalid_bodies_degrade() {
        for body in ["", "<html>oops</html>", "{\"value\":"] {
            let r = response(200, body);
            assert!(r.body().is_none(), "{body:?}");
            assert_eq!(r.values(), Value::Null);
            assert!(r.error_code().is_none());
            assert!(r.error_message().is_none());
        }
    }

    #[test]
    fn body_is_decoded_once() {
        let r = response(200, r#"{"value":[]}"#);
        assert!(std::ptr::eq(r.body().unwrap(), r.body().unwrap()));
        assert_eq!(r.field("value"), Some(&json!([])));
    }

    #[test]
    fn error_envelope() {
        let r = response(
            400,
            r#"{"odata.error":{"code":"6","message":{"lang":"ru","value":"Неизвестный сегмент"}}}"#,
        );
        assert!(!r.is_success());
        assert_eq!(r.error_code().as_deref(), Some("6"));
        assert_eq!(r.error_message().as_deref(), Some("Неизвестный сегмент"));
    }

    #[test]
    fn numeric_error_code() {
        let r = response(500, r#"{"odata.error":{"code":-1,"message":{"value":"x"}}}"#);
        assert_eq!(r.error_code().as_deref(), Some("-1"));
    }

    #[test]
    fn no_error_envelope() {
        let r = response(200, r#"{"value":[]}"#);
        assert!(r.error_code().is_none());
        assert!(r.error_message().is_none());
    }

    #[test]
    fn last_created_id_from_location() {
        let r = with_location(
            "http://host/Catalog_X(guid'11111111-1111-1111-1111-111111111111')",
        );
        assert_eq!(
            r.last_created_id().as_deref(),
            Some("11111111-1111-1111-1111-111111111111")
        );
    }

    #[test]
    fn last_created_id_absent() {
        assert!(response(201, "").last_created_id().is_none());
        assert!(with_location("http://host/Catalog_X").last_created_id().is_none());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let r = ODataResponse::new(HttpResponse {
            status: 201,
            reason: "Created".to_string(),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("Location".to_string(), "http://host/Catalog_X".to_string()),
            ],
            body: Vec::new(),
        });
        let name = String::from("CONTENT-TYPE");
        assert_eq!(r.header(&name), Some("application/json"));
        assert_eq!(r.header("location"), Some("http://host/Catalog_X"));
        assert!(r.header("ETag").is_none());
    }

    #[test]
    fn status_reason_and_success() {
        let r = response(204, "");
        assert_eq!(r.status(), 204);
        assert_eq!(r.reason(), "OK");
        assert!(r.is_success());
        assert!(!response(302, "").is_success());
        assert!(!response(404, "").is_success());
    }
}
