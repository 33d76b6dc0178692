//! # 1C OData Core
//!
//! Request shaping and response interpretation for the 1C:Enterprise
//! standard OData interface. Nothing in this crate touches the network.
//!
//! This crate provides:
//! - GUID validation for entity keys (`guid'…'` addressing)
//! - Resolution of localized metadata paths (`Справочник/Номенклатура`)
//!   into wire names (`Catalog_Номенклатура`)
//! - An accumulating query builder rendering `$select`, `$expand`,
//!   `$filter`, `$orderby`, `$top`, `$skip` and `$format`
//! - Plain-data HTTP request/response types and URL rendering
//! - Interpretation of response bodies: collections, singletons and
//!   `odata.error` envelopes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod entity;
pub mod guid;
pub mod http;
pub mod query;
pub mod response;

pub use entity::{resolve, Category, EntityName, EntityPathError};
pub use guid::GuidError;
pub use http::{Credentials, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use query::{IntoFields, Query, SortDirection};
pub use response::ODataResponse;
