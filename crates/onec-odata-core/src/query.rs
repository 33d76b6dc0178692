//! Accumulating OData query builder.
//!
//! `select`, `expand` and `filter` append; `order_by`, `top` and `skip`
//! replace; `metadata` is a one-way switch. Rendering does not consume or
//! alter the builder.

use crate::http::HttpMethod;
use std::fmt;

/// `$format` value sent on reads unless metadata was requested.
pub const NO_METADATA_FORMAT: &str = "application/json;odata=nometadata";

/// Sort direction for `$orderby`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl SortDirection {
    /// OData keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or more property names or predicates.
///
/// Implemented for a single string as well as arrays, vectors and slices of
/// strings, so both `select("Ref_Key")` and `select(["Ref_Key", "Code"])`
/// work.
pub trait IntoFields {
    /// Convert into owned items, preserving order.
    fn into_fields(self) -> Vec<String>;
}

impl IntoFields for &str {
    fn into_fields(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoFields for String {
    fn into_fields(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoFields for &String {
    fn into_fields(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: Into<String>, const N: usize> IntoFields for [S; N] {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>> IntoFields for Vec<S> {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: AsRef<str>> IntoFields for &[S] {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

/// Query directives for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    select: Vec<String>,
    expand: Vec<String>,
    filter: Vec<String>,
    order_by: Option<String>,
    top: Option<u32>,
    skip: Option<u32>,
    metadata: bool,
}

impl Query {
    /// Empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append properties to `$select`.
    pub fn select(&mut self, fields: impl IntoFields) -> &mut Self {
        self.select.extend(fields.into_fields());
        self
    }

    /// Append navigation properties to `$expand`.
    pub fn expand(&mut self, fields: impl IntoFields) -> &mut Self {
        self.expand.extend(fields.into_fields());
        self
    }

    /// Append predicates to `$filter`; they are joined with `and`.
    pub fn filter(&mut self, predicates: impl IntoFields) -> &mut Self {
        self.filter.extend(predicates.into_fields());
        self
    }

    /// Replace `$orderby`.
    pub fn order_by(&mut self, field: &str, direction: SortDirection) -> &mut Self {
        self.order_by = Some(format!("{field} {direction}"));
        self
    }

    /// Limit the number of returned entities.
    pub fn top(&mut self, quantity: u32) -> &mut Self {
        self.top = Some(quantity);
        self
    }

    /// Skip the first `quantity` entities.
    pub fn skip(&mut self, quantity: u32) -> &mut Self {
        self.skip = Some(quantity);
        self
    }

    /// Keep OData metadata in read responses.
    pub fn metadata(&mut self) -> &mut Self {
        self.metadata = true;
        self
    }

    /// Whether nothing has been configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render query parameters for a request with `method`.
    #[must_use]
    pub fn to_params(&self, method: HttpMethod) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if !self.select.is_empty() {
            params.push(("$select".to_string(), self.select.join(",")));
        }
        if !self.expand.is_empty() {
            params.push(("$expand".to_string(), self.expand.join(",")));
        }
        if !self.filter.is_empty() {
            params.push(("$filter".to_string(), self.filter.join(" and ")));
        }
        if let Some(order_by) = &self.order_by {
            params.push(("$orderby".to_string(), order_by.clone()));
        }
        if let Some(top) = self.top.filter(|n| *n != 0) {
            params.push(("$top".to_string(), top.to_string()));
        }
        if let Some(skip) = self.skip.filter(|n| *n != 0) {
            params.push(("$skip".to_string(), skip.to_string()));
        }
        if method == HttpMethod::Get && !self.metadata {
            params.push(("$format".to_string(), NO_METADATA_FORMAT.to_string()));
        }

        params
    }
}
